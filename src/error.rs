//! Error taxonomy for a rewrite pass.
//!
//! Configuration problems are detected before any file is touched. I/O,
//! archive and transform failures abort the pass and always carry the
//! offending path.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::PassState;

/// Invalid roots, candidates or transformer selection.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {role} directory is specified")]
    MissingRoot { role: &'static str },

    #[error("{role} directory \"{}\" does not exist", .path.display())]
    RootNotFound { role: &'static str, path: PathBuf },

    #[error("{role} directory \"{}\" is not a directory", .path.display())]
    NotADirectory { role: &'static str, path: PathBuf },

    #[error("{role} directory \"{}\" is not readable: {source}", .path.display())]
    Unreadable {
        role: &'static str,
        path: PathBuf,
        source: io::Error,
    },

    #[error("unrecognized transformer: {0}")]
    UnknownTransformer(String),

    #[error("candidate path \"{}\" must be relative and stay inside the root", .path.display())]
    InvalidCandidate { path: PathBuf },
}

/// A class payload the transformer refused or could not process.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("class payload truncated: {len} bytes, header needs {needed}")]
    Truncated { len: usize, needed: usize },

    #[error("bad class file magic 0x{found:08X}")]
    BadMagic { found: u32 },

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("rewriting agent {program} failed: {message}")]
    Agent { program: String, message: String },
}

/// Failure while streaming one archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("zip structure error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("stream error: {0}")]
    Io(#[from] io::Error),

    #[error("entry {entry}: {source}")]
    Transform {
        entry: String,
        source: TransformError,
    },
}

/// Terminal failure of a rewrite pass.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to transform {}: {source}", .path.display())]
    Transform {
        path: PathBuf,
        source: TransformError,
    },

    #[error("failed to rewrite archive {}: {source}", .path.display())]
    Archive { path: PathBuf, source: ArchiveError },

    #[error("rewrite pass already ran (state: {0:?}); start a new pass")]
    PassAlreadyRun(PassState),
}

impl RewriteError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
