//! Per-file orchestration: parse, detect, optionally fix, write.

use crate::config::Config;
use crate::detect::{Detector, Violation};
use crate::go::{collect_file_decls, GoParser, ParseError};
use crate::model::collect_type_groups;
use crate::reorder::{reorder_file, ReorderError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Orchestrates detection and fixing of method-ordering violations.
pub struct Fixer {
    config: Config,
}

/// The result of processing one file.
///
/// A file is either returned fully fixed or with its original content;
/// there is no partially rewritten state.
#[derive(Debug)]
pub struct FileOutcome {
    /// Path of the processed file (display label for in-memory sources).
    pub path: PathBuf,
    /// All violations found, sorted by source position.
    pub violations: Vec<Violation>,
    /// Whether a fix was computed.
    pub fixed: bool,
    /// The original content.
    pub original: String,
    /// The fixed content, present only when `fixed` is true.
    pub fixed_content: Option<String>,
}

impl FileOutcome {
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

#[derive(Error, Debug)]
pub enum FixError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("failed to fix {path}: {source}")]
    Reorder {
        path: PathBuf,
        #[source]
        source: ReorderError,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl Fixer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Process in-memory source. `path` is used only for labeling.
    pub fn process_source(&self, path: &Path, source: &str) -> Result<FileOutcome, FixError> {
        let mut parser = GoParser::new().map_err(|e| FixError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parsed = parser
            .parse_with_source(source)
            .map_err(|e| FixError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        if let Some(err) = parsed.first_error() {
            return Err(FixError::Parse {
                path: path.to_path_buf(),
                source: err,
            });
        }

        let groups = collect_type_groups(&collect_file_decls(&parsed));
        let violations = Detector::new(&self.config).detect(&groups);

        let mut outcome = FileOutcome {
            path: path.to_path_buf(),
            violations,
            fixed: false,
            original: source.to_string(),
            fixed_content: None,
        };

        if outcome.violations.is_empty() || !self.config.fix {
            return Ok(outcome);
        }

        // Only groups whose current order diverges take part; a detected
        // violation whose group is already moot changes nothing.
        let needing: Vec<_> = groups.values().filter(|g| g.needs_reordering()).collect();
        if needing.is_empty() {
            return Ok(outcome);
        }

        let fixed = reorder_file(source, needing).map_err(|e| FixError::Reorder {
            path: path.to_path_buf(),
            source: e,
        })?;
        outcome.fixed = true;
        outcome.fixed_content = Some(fixed);
        Ok(outcome)
    }

    /// Process a single file on disk.
    pub fn process_file(&self, path: &Path) -> Result<FileOutcome, FixError> {
        let source = fs::read_to_string(path).map_err(|e| FixError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.process_source(path, &source)
    }

    /// Process all `.go` files under a directory.
    ///
    /// Skips `vendor` and hidden directories. Failures are isolated per
    /// file: one errored file never stops the rest of the batch.
    pub fn process_directory(&self, dir: &Path) -> Vec<Result<FileOutcome, FixError>> {
        let mut results = Vec::new();

        // depth 0 is the root the caller asked for; skip rules apply below it.
        let walker = WalkDir::new(dir)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    results.push(Err(FixError::Walk(e)));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.path().extension().and_then(|s| s.to_str()) != Some("go") {
                continue;
            }
            results.push(self.process_file(entry.path()));
        }

        results
    }

    /// Write a fixed outcome back to its file atomically.
    ///
    /// No-op unless fixing produced new content and write mode is on.
    pub fn write_outcome(&self, outcome: &FileOutcome) -> Result<(), FixError> {
        if !self.config.write || !outcome.fixed {
            return Ok(());
        }
        let Some(content) = &outcome.fixed_content else {
            return Ok(());
        };
        atomic_write(&outcome.path, content.as_bytes()).map_err(|e| FixError::Io {
            path: outcome.path.clone(),
            source: e,
        })
    }
}

fn is_skipped_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name == "vendor" || name.starts_with('.'))
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full write succeeds or the original file is untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
