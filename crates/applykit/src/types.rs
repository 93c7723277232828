//! Core types for declared mutations and their results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a mutation's input content comes from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A path relative to the extracted bundle directory.
    Cache(String),
    /// Literal bytes carried by the catalog itself.
    Literal(Vec<u8>),
}

impl Source {
    /// Literal content from a string.
    #[must_use]
    pub fn literal(content: impl Into<String>) -> Self {
        Self::Literal(content.into().into_bytes())
    }
}

/// How an existing target is preserved before being overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupStyle {
    /// Rename the target to a `-backup` sibling. The first backup wins;
    /// later runs leave it in place and overwrite the target directly.
    Rename,
    /// Pack the target directory into a timestamped tar.gz under a
    /// `-backup` sibling directory, then remove the original. Used for
    /// directories expected to accumulate user edits.
    Archive,
}

/// Idempotency probe evaluated before a mutation runs.
///
/// A satisfied probe means the mutation has already been applied and is
/// reported as skipped. This replaces any process-wide "already done"
/// flags; every mutation carries its own check.
#[derive(Debug, Clone)]
pub enum Precheck {
    /// Always run the mutation (it is idempotent by construction).
    None,
    /// Skip when the given path already exists.
    PathExists(PathBuf),
    /// Skip when the marker string is already present in the file.
    MarkerPresent {
        /// File to scan.
        file: PathBuf,
        /// Marker line to look for.
        marker: String,
    },
}

/// One declared, idempotent unit of filesystem/config change.
#[derive(Debug, Clone)]
pub struct Mutation {
    /// Stable idempotency key, unique within the catalog.
    pub id: String,
    /// What the mutation does.
    pub kind: MutationKind,
    /// Idempotency probe; `Precheck::None` for mutations that are
    /// naturally re-run-safe.
    pub precheck: Precheck,
}

/// The operation a mutation performs.
#[derive(Debug, Clone)]
pub enum MutationKind {
    /// Recursively copy a bundle directory over the target, backing up
    /// any existing target first.
    CopyTree {
        /// Bundle-relative source directory.
        source: Source,
        /// Destination directory.
        target: PathBuf,
        /// How a pre-existing target is preserved.
        backup: BackupStyle,
    },
    /// Write a single file, backing up any existing file first.
    WriteFile {
        /// File content.
        source: Source,
        /// Destination file.
        target: PathBuf,
        /// Set mode 755 after writing (installer scripts, fetch tools).
        executable: bool,
    },
    /// Append a marker-delimited snippet to a text file. Marker presence
    /// is the idempotency check; the second run is a no-op.
    AppendSnippet {
        /// File to append to (created if missing).
        target: PathBuf,
        /// Marker comment line identifying the snippet.
        marker: String,
        /// Snippet body placed after the marker.
        body: String,
    },
    /// Invoke an external tool (package manager, plasmoid installer).
    /// Success is its exit status; output is not parsed.
    RunInstaller {
        /// Program name or path.
        program: String,
        /// Fixed argument list. The placeholder `{asset}` is replaced
        /// with the staged file path when `stage` is set.
        args: Vec<String>,
        /// Optional asset staged to a local file before invocation.
        stage: Option<StagedAsset>,
    },
}

/// An asset written to the staging directory before an installer runs.
#[derive(Debug, Clone)]
pub struct StagedAsset {
    /// Content to stage.
    pub source: Source,
    /// File name inside the staging directory.
    pub file_name: String,
}

impl Mutation {
    /// A copy-tree mutation with rename-style backup.
    #[must_use]
    pub fn copy_tree(id: impl Into<String>, source: Source, target: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            kind: MutationKind::CopyTree {
                source,
                target: target.into(),
                backup: BackupStyle::Rename,
            },
            precheck: Precheck::None,
        }
    }

    /// A write-file mutation.
    #[must_use]
    pub fn write_file(id: impl Into<String>, source: Source, target: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            kind: MutationKind::WriteFile {
                source,
                target: target.into(),
                executable: false,
            },
            precheck: Precheck::None,
        }
    }

    /// An append-snippet mutation.
    #[must_use]
    pub fn append_snippet(
        id: impl Into<String>,
        target: impl Into<PathBuf>,
        marker: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MutationKind::AppendSnippet {
                target: target.into(),
                marker: marker.into(),
                body: body.into(),
            },
            precheck: Precheck::None,
        }
    }

    /// A run-installer mutation.
    #[must_use]
    pub fn run_installer(
        id: impl Into<String>,
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MutationKind::RunInstaller {
                program: program.into(),
                args: args.into_iter().map(Into::into).collect(),
                stage: None,
            },
            precheck: Precheck::None,
        }
    }

    /// Switch a copy-tree mutation to archive-style backup.
    #[must_use]
    pub fn archive_backup(mut self) -> Self {
        if let MutationKind::CopyTree { backup, .. } = &mut self.kind {
            *backup = BackupStyle::Archive;
        }
        self
    }

    /// Mark a write-file mutation's output executable.
    #[must_use]
    pub fn executable(mut self) -> Self {
        if let MutationKind::WriteFile { executable, .. } = &mut self.kind {
            *executable = true;
        }
        self
    }

    /// Stage an asset for a run-installer mutation.
    #[must_use]
    pub fn staging(mut self, source: Source, file_name: impl Into<String>) -> Self {
        if let MutationKind::RunInstaller { stage, .. } = &mut self.kind {
            *stage = Some(StagedAsset {
                source,
                file_name: file_name.into(),
            });
        }
        self
    }

    /// Attach an idempotency probe.
    #[must_use]
    pub fn precheck(mut self, precheck: Precheck) -> Self {
        self.precheck = precheck;
        self
    }
}

/// Outcome of one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationStatus {
    /// The mutation ran and reached its end state.
    Success,
    /// The mutation did not run (already applied, or an earlier step in
    /// its group failed).
    Skipped {
        /// Why it was skipped.
        reason: String,
    },
    /// The mutation ran and failed.
    Failed {
        /// Error detail.
        error: String,
    },
}

impl MutationStatus {
    /// Check if the status is not a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Per-mutation outcome record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResult {
    /// Group the mutation belongs to.
    pub group: String,
    /// Mutation id.
    pub id: String,
    /// What happened.
    pub status: MutationStatus,
    /// Human-readable detail ("copied 14 files", argv, ...).
    pub detail: String,
}

/// Aggregated outcome of a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-mutation results in execution order.
    pub results: Vec<MutationResult>,
}

impl RunReport {
    /// Record one result.
    pub fn push(&mut self, result: MutationResult) {
        self.results.push(result);
    }

    /// Number of successful mutations.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, MutationStatus::Success))
            .count()
    }

    /// Number of skipped mutations.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, MutationStatus::Skipped { .. }))
            .count()
    }

    /// Number of failed mutations.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, MutationStatus::Failed { .. }))
            .count()
    }

    /// Whether the run completed with no failures.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Results belonging to one group.
    pub fn for_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a MutationResult> {
        self.results.iter().filter(move |r| r.group == group)
    }
}
