//! # class-rewriter
//!
//! Build-time rewriting of compiled Java classes, loose or packed in
//! jar/war/ear/zip archives, mirrored from a source tree into a destination
//! tree.
//!
//! ## Architecture
//!
//! - **transform**: Transformer capability, registry and the built-in `asm` transformer
//! - **classfile**: Class-file header validation
//! - **classify**: Class / archive / other classification by file name
//! - **incremental**: Modification-time staleness check
//! - **rewrite**: Loose class-file rewriting with atomic replacement
//! - **archive**: Entry-by-entry archive rewriting
//! - **pipeline**: Rewrite pass orchestration and run summary
//! - **scan**: Source tree enumeration with include/exclude globs
//! - **error**: Configuration, I/O, archive and transform errors

pub mod archive;
pub mod classfile;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod incremental;
pub mod logging;
pub mod pipeline;
pub mod rewrite;
pub mod scan;
pub mod transform;

pub use error::{ArchiveError, ConfigError, RewriteError, TransformError};
pub use pipeline::{RewriteConfig, Rewriter, RunSummary, run};
pub use transform::{ClassTransformer, TransformerOptions, TransformerRegistry};
