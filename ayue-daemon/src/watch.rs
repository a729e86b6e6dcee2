//! Filesystem subscription for the entry directory.
//!
//! A notify watcher runs on its own thread and pushes raw events into an
//! unbounded channel; [`EventStream::next`] turns them into
//! [`WatchEvent`]s one at a time. The subscription ends only through
//! [`EventStream::close`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use ayue_sync::WatchEvent;

use crate::error::{io_err, DaemonError};

pub struct EventStream {
    root: PathBuf,
    watcher: Option<RecommendedWatcher>,
    rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
    pending: VecDeque<WatchEvent>,
}

impl EventStream {
    /// Subscribe recursively to `root`. The path is canonicalized so event
    /// paths can be matched against it with `strip_prefix`.
    pub fn open(root: &Path) -> Result<Self, DaemonError> {
        let root = std::fs::canonicalize(root).map_err(|e| io_err(root, e))?;

        let (event_tx, rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        tracing::info!(path = %root.display(), "watching entry directory");

        Ok(Self {
            root,
            watcher: Some(watcher),
            rx,
            pending: VecDeque::new(),
        })
    }

    /// Canonical path of the watched directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Next event, or a watcher-internal error. `None` once the watcher is gone.
    ///
    /// Cancel-safe: translated events are buffered on `self`.
    pub async fn next(&mut self) -> Option<Result<WatchEvent, DaemonError>> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(Ok(event));
            }
            match self.rx.recv().await? {
                Ok(event) => self.pending.extend(translate(event)),
                Err(err) => return Some(Err(err.into())),
            }
        }
    }

    /// Stop the watcher and wait for its thread to finish.
    pub async fn close(mut self) -> Result<(), DaemonError> {
        if let Some(watcher) = self.watcher.take() {
            tokio::task::spawn_blocking(move || drop(watcher))
                .await
                .map_err(|err| DaemonError::Protocol(format!("watcher close join error: {err}")))?;
        }
        self.rx.close();
        tracing::info!(path = %self.root.display(), "watch subscription closed");
        Ok(())
    }
}

/// Map one notify event onto zero or more [`WatchEvent`]s.
///
/// Renames become a removal of the old path and an addition of the new one.
/// Where the backend cannot say which side of a rename a path is on, the
/// path's current existence decides.
pub fn translate(event: Event) -> Vec<WatchEvent> {
    let Event { kind, paths, .. } = event;
    match kind {
        EventKind::Create(_) => paths.into_iter().map(WatchEvent::added).collect(),
        EventKind::Remove(_) => paths.into_iter().map(WatchEvent::removed).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.into_iter().map(WatchEvent::removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.into_iter().map(WatchEvent::added).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut paths = paths.into_iter();
            let mut events = Vec::new();
            if let Some(from) = paths.next() {
                events.push(WatchEvent::removed(from));
            }
            events.extend(paths.map(WatchEvent::added));
            events
        }
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .into_iter()
            .map(|p| {
                if p.exists() {
                    WatchEvent::added(p)
                } else {
                    WatchEvent::removed(p)
                }
            })
            .collect(),
        EventKind::Modify(_) | EventKind::Any => paths
            .into_iter()
            .map(|p| {
                if p.exists() {
                    WatchEvent::changed(p)
                } else {
                    WatchEvent::removed(p)
                }
            })
            .collect(),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}
