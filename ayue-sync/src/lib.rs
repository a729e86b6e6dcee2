//! # ayue-sync
//!
//! Build orchestration and directory reconciliation.
//!
//! Call [`build::run`] once per bundler build to regenerate the injected
//! templates and schema documents, [`mirror::sync_tree`] for a one-shot
//! reconcile of a destination tree, and [`mirror::apply_event`] for every
//! filesystem event afterwards.

pub mod build;
pub mod error;
pub mod mirror;
pub mod writer;

pub use build::{BuildFailure, BuildReport, BuildSummary};
pub use error::SyncError;
pub use mirror::{
    apply_event, hot_update, seed_events, sync_entrypoints, sync_tree, targets, CopyLedger,
    Layout, MirrorAction, MirrorTarget, PathFilter, SyncEntry, SyncReport, WatchEvent,
    WatchEventKind,
};
pub use writer::WriteResult;
