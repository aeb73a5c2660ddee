//! Rewrite pass orchestration.
//!
//! A [`Rewriter`] mirrors a list of root-relative paths from the source root
//! into the destination root. Paths are processed one at a time, in the order
//! given; the first failure aborts the pass.

use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::archive::{ArchiveSummary, rewrite_archive_file};
use crate::classify::EntryKind;
use crate::error::{ConfigError, RewriteError};
use crate::incremental::needs_rewrite;
use crate::rewrite::rewrite_class_file;
use crate::transform::{ASM, ClassTransformer, TransformerOptions, TransformerRegistry};

#[derive(Debug, Clone)]
pub struct RewriteConfig {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub matched_paths: Vec<PathBuf>,
    pub transformer_kind: String,
}

impl RewriteConfig {
    pub fn new(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            matched_paths: Vec::new(),
            transformer_kind: ASM.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    NotStarted,
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    UpToDate,
    Ignored,
    ClassRewritten,
    ArchiveRewritten(ArchiveSummary),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub source_root: String,
    pub destination_root: String,
    pub matched: usize,
    pub rewritten_classes: usize,
    pub rewritten_archives: usize,
    pub transformed_entries: usize,
    pub copied_entries: usize,
    pub skipped_up_to_date: usize,
    pub ignored: usize,
    pub duration_ms: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        self.matched += 1;
        match outcome {
            Outcome::UpToDate => self.skipped_up_to_date += 1,
            Outcome::Ignored => self.ignored += 1,
            Outcome::ClassRewritten => self.rewritten_classes += 1,
            Outcome::ArchiveRewritten(archive) => {
                self.rewritten_archives += 1;
                self.transformed_entries += archive.transformed;
                self.copied_entries += archive.copied;
            }
        }
    }
}

pub struct Rewriter {
    source_root: PathBuf,
    destination_root: PathBuf,
    transformer: Box<dyn ClassTransformer>,
    state: PassState,
}

impl Rewriter {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        transformer: Box<dyn ClassTransformer>,
    ) -> Result<Self, ConfigError> {
        let source_root = source_root.into();
        let destination_root = destination_root.into();
        check_dir(&source_root, "source", true)?;
        check_dir(&destination_root, "destination", false)?;

        Ok(Self {
            source_root,
            destination_root,
            transformer,
            state: PassState::NotStarted,
        })
    }

    pub fn from_config(
        config: &RewriteConfig,
        registry: &TransformerRegistry,
        options: &TransformerOptions,
    ) -> Result<Self, ConfigError> {
        let transformer = registry.select(&config.transformer_kind, options)?;
        Self::new(
            config.source_root.clone(),
            config.destination_root.clone(),
            transformer,
        )
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn run(&mut self, paths: &[PathBuf]) -> Result<RunSummary, RewriteError> {
        if self.state != PassState::NotStarted {
            return Err(RewriteError::PassAlreadyRun(self.state));
        }
        for path in paths {
            check_candidate(path)?;
        }

        self.state = PassState::Running;
        let start = Instant::now();
        let mut summary = RunSummary {
            source_root: self.source_root.to_string_lossy().to_string(),
            destination_root: self.destination_root.to_string_lossy().to_string(),
            ..RunSummary::default()
        };

        for relative in paths {
            match self.process(relative) {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    self.state = PassState::Aborted;
                    warn!(path = %relative.display(), error = %e, "rewrite pass aborted");
                    return Err(e);
                }
            }
        }

        self.state = PassState::Completed;
        summary.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            matched = summary.matched,
            classes = summary.rewritten_classes,
            archives = summary.rewritten_archives,
            skipped = summary.skipped_up_to_date,
            "rewrite pass completed"
        );
        Ok(summary)
    }

    fn process(&self, relative: &Path) -> Result<Outcome, RewriteError> {
        let source = self.source_root.join(relative);
        let destination = self.destination_root.join(relative);

        if let Some(parent) = destination.parent()
            && !parent.exists()
        {
            debug!(dir = %parent.display(), "creating dir");
            fs::create_dir_all(parent).map_err(|e| RewriteError::io(parent, e))?;
        }

        if !needs_rewrite(&source, &destination).map_err(|e| RewriteError::io(&source, e))? {
            debug!(
                source = %source.display(),
                destination = %destination.display(),
                "omitting, destination is up to date"
            );
            return Ok(Outcome::UpToDate);
        }

        match EntryKind::for_path(relative) {
            EntryKind::ClassFile => {
                info!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "rewriting class"
                );
                rewrite_class_file(&source, self.transformer.as_ref(), &destination)?;
                Ok(Outcome::ClassRewritten)
            }
            EntryKind::Archive => {
                info!(
                    source = %source.display(),
                    destination = %destination.display(),
                    "rewriting archive"
                );
                let archive =
                    rewrite_archive_file(&source, self.transformer.as_ref(), &destination)?;
                Ok(Outcome::ArchiveRewritten(archive))
            }
            EntryKind::Other => Ok(Outcome::Ignored),
        }
    }
}

/// Validates the configuration and runs one pass over `config.matched_paths`.
pub fn run(
    config: &RewriteConfig,
    registry: &TransformerRegistry,
    options: &TransformerOptions,
) -> Result<RunSummary, RewriteError> {
    let mut rewriter = Rewriter::from_config(config, registry, options)?;
    rewriter.run(&config.matched_paths)
}

fn check_dir(path: &Path, role: &'static str, listable: bool) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingRoot { role });
    }
    if !path.exists() {
        return Err(ConfigError::RootNotFound {
            role,
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            role,
            path: path.to_path_buf(),
        });
    }
    if listable {
        fs::read_dir(path).map_err(|source| ConfigError::Unreadable {
            role,
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn check_candidate(path: &Path) -> Result<(), ConfigError> {
    let escapes = path.as_os_str().is_empty()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ConfigError::InvalidCandidate {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
