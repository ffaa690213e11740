//! The patch runner: folds ordered steps over each target file.
//!
//! Each file goes through load → step fold → persist-if-changed as an
//! independent unit; nothing is shared across files. Recoverable conditions
//! (missing file, already-applied step, unmatched anchor) become report data,
//! and only a genuine I/O fault aborts the run.

use std::path::{Path, PathBuf};

use crate::step::{PatchStep, StepApplication};
use crate::store::{self, StoreError};

/// A file path plus the ordered steps to fold over its contents.
///
/// Steps within one target are order-dependent: a later step may anchor on
/// text inserted by an earlier one.
#[derive(Debug, Clone)]
pub struct FileTarget<'a> {
    /// Path relative to the workspace root.
    pub path: &'a str,
    pub steps: Vec<PatchStep<'a>>,
}

/// Whether the runner persists changed buffers or only reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write each changed buffer back to disk.
    Apply,
    /// Run the identical fold in memory and never write. A `Persisted`
    /// status then reads as "apply would change this file".
    Check,
}

/// Per-step outcome, owned so reports outlive the plan they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Applied { matched_anchor: String },
    AlreadyApplied,
    AnchorNotFound { candidates: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step_id: String,
    pub outcome: StepOutcome,
}

/// Terminal state of one target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// The file was absent; none of its steps ran.
    Missing,
    /// At least one step changed the buffer and the file was (or, in check
    /// mode, would be) rewritten.
    Persisted,
    /// Every step was a no-op; the file on disk was not touched, keeping its
    /// modification time stable.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub steps: Vec<StepReport>,
}

impl FileReport {
    /// True when nothing went wrong: the file existed and every step either
    /// applied or had already been applied. This is the predicate the CLI
    /// maps to its exit code.
    pub fn is_clean(&self) -> bool {
        self.status != FileStatus::Missing
            && self
                .steps
                .iter()
                .all(|s| !matches!(s.outcome, StepOutcome::AnchorNotFound { .. }))
    }
}

/// Run every target in declared order, unconditionally continuing past
/// missing files and failed steps. Only a [`StoreError`] aborts the run.
pub fn run_plan(
    root: &Path,
    targets: &[FileTarget<'_>],
    mode: Mode,
) -> Result<Vec<FileReport>, StoreError> {
    targets
        .iter()
        .map(|target| run_target(root, target, mode))
        .collect()
}

/// Apply one target's steps to its file.
pub fn run_target(
    root: &Path,
    target: &FileTarget<'_>,
    mode: Mode,
) -> Result<FileReport, StoreError> {
    let path = root.join(target.path);

    let Some(mut buffer) = store::read(&path)? else {
        return Ok(FileReport {
            path,
            status: FileStatus::Missing,
            steps: Vec::new(),
        });
    };

    let mut changed = false;
    let mut steps = Vec::with_capacity(target.steps.len());

    for step in &target.steps {
        let outcome = match step.apply(&buffer) {
            StepApplication::Applied {
                buffer: next,
                matched_anchor,
            } => {
                buffer = next;
                changed = true;
                StepOutcome::Applied {
                    matched_anchor: matched_anchor.to_string(),
                }
            }
            StepApplication::AlreadyApplied => StepOutcome::AlreadyApplied,
            StepApplication::AnchorNotFound => StepOutcome::AnchorNotFound {
                candidates: step.anchors.iter().map(|a| a.to_string()).collect(),
            },
        };

        steps.push(StepReport {
            step_id: step.id.to_string(),
            outcome,
        });
    }

    let status = if changed {
        if mode == Mode::Apply {
            store::write(&path, &buffer)?;
        }
        FileStatus::Persisted
    } else {
        FileStatus::Unchanged
    };

    Ok(FileReport {
        path,
        status,
        steps,
    })
}
