//! # applykit
//!
//! Idempotent filesystem/config mutations with backup-before-overwrite
//! semantics.
//!
//! This crate covers the apply half of the install pipeline:
//! - A statically-declared [`Catalog`] of mutation [`Group`]s
//! - [`BackupManager`]: rename or archive existing targets before any
//!   destructive write
//! - [`Pipeline`]: strictly sequential execution with per-group failure
//!   isolation and an aggregated [`RunReport`]
//! - [`ToolRunner`]: the seam for external package-manager invocations
//!
//! ## Example
//!
//! ```no_run
//! use applykit::{
//!     Catalog, Context, Group, Mutation, Pipeline, Source, SystemRunner,
//! };
//! use std::path::Path;
//!
//! let catalog = Catalog::new(vec![Group::new(
//!     "kitty",
//!     "Kitty terminal",
//!     "Apply the themed kitty.conf",
//!     vec![Mutation::write_file(
//!         "kitty-conf",
//!         Source::Cache("Gnome/etc/skel/.config/kitty/kitty.conf".into()),
//!         "/home/user/.config/kitty/kitty.conf",
//!     )],
//! )]);
//!
//! let runner = SystemRunner;
//! let ctx = Context {
//!     bundle_dir: Path::new("/home/user/.cache/nyarchup/v3.2.0"),
//!     staging_dir: Path::new("/home/user/.cache/nyarchup"),
//!     runner: &runner,
//! };
//!
//! let report = Pipeline::run(&catalog, &["kitty".to_string()], &ctx);
//! println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//! ```
//!
//! Every mutation is re-run-safe: copies overwrite with the same source,
//! snippet appends check their marker first, installers are guarded by
//! explicit prechecks. Recovery from any failure is "rerun the tool".

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backup;
pub mod catalog;
pub mod error;
pub mod fs_util;
pub mod pipeline;
pub mod runner;
pub mod types;

pub use backup::{BackupManager, archive_backup_path, backup_path};
pub use catalog::{Catalog, Group};
pub use error::{Error, Result};
pub use pipeline::{Context, Pipeline};
pub use runner::{MockRunner, RunOutput, SystemRunner, ToolRunner};
pub use types::{
    BackupStyle, Mutation, MutationKind, MutationResult, MutationStatus, Precheck, RunReport,
    Source, StagedAsset,
};
