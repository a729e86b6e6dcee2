//! Directory reconciliation.
//!
//! Two destination trees follow the entry directory:
//!
//! | Target        | Layout    | Accepts                                   |
//! |---------------|-----------|-------------------------------------------|
//! | entrypoints   | mirrored  | everything not matched by the exclude rule |
//! | sections      | flattened | the sections glob, no dot-prefixed parts   |
//!
//! [`sync_tree`] performs the one-shot reconcile (copy + orphan removal) of a
//! mirrored target; [`apply_event`] applies a single watcher event to any
//! target. Both are synchronous; the daemon drives them one at a time.

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use glob::Pattern;
use walkdir::WalkDir;

use ayue_core::{ExcludeRule, ThemePaths};

use crate::error::{io_err, SyncError};
use crate::writer::{copy_file, WriteResult};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// What happened to a watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Added,
    Changed,
    Removed,
}

/// One filesystem notification, path absolute under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn added(path: impl Into<PathBuf>) -> Self {
        Self { kind: WatchEventKind::Added, path: path.into() }
    }

    pub fn changed(path: impl Into<PathBuf>) -> Self {
        Self { kind: WatchEventKind::Changed, path: path.into() }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self { kind: WatchEventKind::Removed, path: path.into() }
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Where a relative source path lands in a destination tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `<root>/<relative path>`
    Mirror,
    /// `<root>/<file name>`; directories are not reproduced.
    Flatten,
}

/// Which relative source paths a target follows.
#[derive(Debug, Clone)]
pub enum PathFilter {
    Exclude(ExcludeRule),
    Glob { pattern: Pattern, skip_dotfiles: bool },
}

impl PathFilter {
    pub fn accepts(&self, relative: &Path) -> bool {
        match self {
            PathFilter::Exclude(rule) => !rule.is_excluded(relative),
            PathFilter::Glob { pattern, skip_dotfiles } => {
                if *skip_dotfiles && has_dot_component(relative) {
                    return false;
                }
                pattern.matches_path(relative)
            }
        }
    }
}

fn has_dot_component(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => part.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Source files a flattened target currently holds a copy of.
///
/// A flattened destination has no directory to delete when a whole source
/// directory goes away, so the copies made from under it are looked up here.
/// Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct CopyLedger(Arc<Mutex<BTreeMap<PathBuf, PathBuf>>>);

impl CopyLedger {
    fn record(&self, source: &Path, dest: &Path) {
        self.entries().insert(source.to_path_buf(), dest.to_path_buf());
    }

    fn forget(&self, source: &Path) {
        self.entries().remove(source);
    }

    /// Drop every source under `dir` and return the destinations no
    /// remaining source still maps to, sorted.
    fn forget_under(&self, dir: &Path) -> Vec<PathBuf> {
        let mut entries = self.entries();
        let gone: Vec<PathBuf> = entries
            .keys()
            .filter(|source| source.starts_with(dir))
            .cloned()
            .collect();
        let mut dests: Vec<PathBuf> = gone.iter().filter_map(|s| entries.remove(s)).collect();
        dests.retain(|dest| !entries.values().any(|live| live == dest));
        dests.sort();
        dests.dedup();
        dests
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, PathBuf>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One destination tree kept in step with the entry directory.
#[derive(Debug, Clone)]
pub struct MirrorTarget {
    pub label: &'static str,
    pub root: PathBuf,
    pub layout: Layout,
    pub filter: PathFilter,
    pub copies: CopyLedger,
}

impl MirrorTarget {
    /// Mirrored copy of the entry tree minus excluded files.
    pub fn entrypoints(paths: &ThemePaths) -> Self {
        Self {
            label: "entrypoints",
            root: paths.entrypoints_dir.clone(),
            layout: Layout::Mirror,
            filter: PathFilter::Exclude(paths.exclude.clone()),
            copies: CopyLedger::default(),
        }
    }

    /// Flat copy of every template matched by the sections glob.
    pub fn sections(paths: &ThemePaths) -> Result<Self, SyncError> {
        Ok(Self {
            label: "sections",
            root: paths.sections_dir.clone(),
            layout: Layout::Flatten,
            filter: PathFilter::Glob {
                pattern: Pattern::new(&paths.sections_pattern)?,
                skip_dotfiles: true,
            },
            copies: CopyLedger::default(),
        })
    }

    /// Destination for `relative`, or `None` when the target ignores it.
    pub fn destination(&self, relative: &Path) -> Option<PathBuf> {
        if relative.as_os_str().is_empty() || !self.filter.accepts(relative) {
            return None;
        }
        match self.layout {
            Layout::Mirror => Some(self.root.join(relative)),
            Layout::Flatten => relative.file_name().map(|name| self.root.join(name)),
        }
    }
}

/// Both live targets, entrypoints first.
pub fn targets(paths: &ThemePaths) -> Result<Vec<MirrorTarget>, SyncError> {
    Ok(vec![MirrorTarget::entrypoints(paths), MirrorTarget::sections(paths)?])
}

// ---------------------------------------------------------------------------
// Event application
// ---------------------------------------------------------------------------

/// Effect of one event on one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorAction {
    /// File copied (or found identical).
    Copied(WriteResult),
    /// Directory reproduced in a mirrored target.
    DirCreated { path: PathBuf },
    /// Destination removed.
    Removed { path: PathBuf },
    /// Removal requested but the destination did not exist.
    Absent { path: PathBuf },
    /// A directory event applied to each entry beneath it, in path order.
    Tree { source: PathBuf, actions: Vec<MirrorAction> },
    /// Path outside the source root, filtered out, or already gone again.
    Skipped,
}

/// Apply `event` (path under `source_root`) to `target`.
///
/// A directory that appears is walked and every entry the target follows is
/// applied; one that disappears takes the copies made from beneath it along.
/// `Removed` for a destination that does not exist is not an error.
pub fn apply_event(
    source_root: &Path,
    target: &MirrorTarget,
    event: &WatchEvent,
) -> Result<MirrorAction, SyncError> {
    let Ok(relative) = event.path.strip_prefix(source_root) else {
        return Ok(MirrorAction::Skipped);
    };
    if relative.as_os_str().is_empty() {
        return Ok(MirrorAction::Skipped);
    }

    if event.kind == WatchEventKind::Removed {
        return match target.destination(relative) {
            Some(dest) => {
                target.copies.forget(&event.path);
                remove_destination(&dest)
            }
            None if target.layout == Layout::Flatten => remove_flattened_under(target, &event.path),
            None => Ok(MirrorAction::Skipped),
        };
    }

    let meta = match std::fs::metadata(&event.path) {
        Ok(meta) => meta,
        // Deleted between the notification and now; the Removed event for
        // it is still queued.
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("vanished before copy: {}", event.path.display());
            return Ok(MirrorAction::Skipped);
        }
        Err(err) => return Err(io_err(&event.path, err)),
    };

    if meta.is_dir() {
        if event.kind == WatchEventKind::Added {
            return add_tree(source_root, target, &event.path);
        }
        return match (target.layout, target.destination(relative)) {
            (Layout::Mirror, Some(dest)) => {
                std::fs::create_dir_all(&dest).map_err(|e| io_err(&dest, e))?;
                Ok(MirrorAction::DirCreated { path: dest })
            }
            _ => Ok(MirrorAction::Skipped),
        };
    }

    let Some(dest) = target.destination(relative) else {
        return Ok(MirrorAction::Skipped);
    };
    copy_into(target, &event.path, &dest)
}

fn copy_into(target: &MirrorTarget, source: &Path, dest: &Path) -> Result<MirrorAction, SyncError> {
    let result = copy_file(source, dest)?;
    if target.layout == Layout::Flatten {
        target.copies.record(source, dest);
    }
    Ok(MirrorAction::Copied(result))
}

/// Apply everything under the newly added directory `dir`.
///
/// Failures on single entries are logged and do not stop the walk.
fn add_tree(source_root: &Path, target: &MirrorTarget, dir: &Path) -> Result<MirrorAction, SyncError> {
    let mut actions = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| match e.path().strip_prefix(source_root) {
            // Excluded directories are pruned from a mirrored walk only.
            Ok(rel) => target.layout == Layout::Flatten || !e.file_type().is_dir() || target.filter.accepts(rel),
            Err(_) => false,
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {err}", dir.display());
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };

        if entry.file_type().is_dir() {
            if target.layout == Layout::Mirror {
                let dest = target.root.join(relative);
                match std::fs::create_dir_all(&dest) {
                    Ok(()) => actions.push(MirrorAction::DirCreated { path: dest }),
                    Err(err) => tracing::warn!("cannot create {}: {err}", dest.display()),
                }
            }
            continue;
        }

        let Some(dest) = target.destination(relative) else {
            continue;
        };
        match copy_into(target, entry.path(), &dest) {
            Ok(action) => actions.push(action),
            Err(err) => tracing::warn!("copy failed for {}: {err}", entry.path().display()),
        }
    }

    if actions.is_empty() {
        return Ok(MirrorAction::Skipped);
    }
    Ok(MirrorAction::Tree {
        source: dir.to_path_buf(),
        actions,
    })
}

fn remove_flattened_under(target: &MirrorTarget, dir: &Path) -> Result<MirrorAction, SyncError> {
    let mut actions = Vec::new();
    for dest in target.copies.forget_under(dir) {
        actions.push(remove_destination(&dest)?);
    }
    if actions.is_empty() {
        return Ok(MirrorAction::Skipped);
    }
    Ok(MirrorAction::Tree {
        source: dir.to_path_buf(),
        actions,
    })
}

/// Re-copy `path` to `target` when it lies under `source_root`.
pub fn hot_update(
    source_root: &Path,
    target: &MirrorTarget,
    path: &Path,
) -> Result<MirrorAction, SyncError> {
    apply_event(source_root, target, &WatchEvent::changed(path))
}

fn remove_destination(dest: &Path) -> Result<MirrorAction, SyncError> {
    let meta = match std::fs::symlink_metadata(dest) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Ok(MirrorAction::Absent { path: dest.to_path_buf() });
        }
        Err(err) => return Err(io_err(dest, err)),
    };
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(dest)
    } else {
        std::fs::remove_file(dest)
    };
    match removed {
        Ok(()) => Ok(MirrorAction::Removed { path: dest.to_path_buf() }),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Ok(MirrorAction::Absent { path: dest.to_path_buf() })
        }
        Err(err) => Err(io_err(dest, err)),
    }
}

/// `Added` events for every file `target` follows, sorted by path.
///
/// Seeds a target that has no initial reconcile of its own.
pub fn seed_events(source_root: &Path, target: &MirrorTarget) -> Result<Vec<WatchEvent>, SyncError> {
    let mut events = Vec::new();
    for entry in WalkDir::new(source_root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        if target.destination(relative).is_some() {
            events.push(WatchEvent::added(entry.path()));
        }
    }
    events.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(events)
}

// ---------------------------------------------------------------------------
// Initial sync
// ---------------------------------------------------------------------------

/// One file handled by [`sync_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub source: PathBuf,
    pub result: WriteResult,
}

impl SyncEntry {
    pub fn dest(&self) -> &Path {
        self.result.path()
    }
}

/// Outcome of a reconcile pass. `entries` and `removed` are sorted by
/// destination path.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
    pub removed: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, SyncError)>,
}

impl SyncReport {
    pub fn written(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, WriteResult::Written { .. }))
            .count()
    }

    pub fn unchanged(&self) -> usize {
        self.entries.len() - self.written()
    }
}

/// Make `dest` an exact copy of `source` minus excluded files.
///
/// Every copied file is passed to `on_entry` as soon as it is handled;
/// destination entries without a non-excluded source counterpart are
/// deleted afterwards. Per-entry failures are collected in the report.
/// Only an unusable `dest` root aborts the pass.
pub fn sync_tree(
    source: &Path,
    dest: &Path,
    exclude: &ExcludeRule,
    mut on_entry: impl FnMut(&SyncEntry),
) -> Result<SyncReport, SyncError> {
    std::fs::create_dir_all(dest).map_err(|e| io_err(dest, e))?;

    let mut report = SyncReport::default();
    let mut expected: HashSet<PathBuf> = HashSet::new();

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !exclude.is_excluded(e.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| source.to_path_buf());
                tracing::warn!("skipping unreadable source entry {}: {err}", path.display());
                report.failures.push((path, err.into()));
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let relative = relative.to_path_buf();
        let target = dest.join(&relative);

        let is_dir = entry.file_type().is_dir();
        match clear_mismatched(&target, is_dir) {
            Ok(true) => {
                tracing::info!("replaced {}: source changed type", target.display());
                report.removed.push(target.clone());
            }
            Ok(false) => {}
            Err(err) => {
                report.failures.push((target.clone(), err));
                expected.insert(relative);
                continue;
            }
        }

        if is_dir {
            if let Err(err) = std::fs::create_dir_all(&target) {
                report.failures.push((target.clone(), io_err(&target, err)));
            }
            expected.insert(relative);
            continue;
        }

        expected.insert(relative);
        match copy_file(entry.path(), &target) {
            Ok(result) => {
                let synced = SyncEntry {
                    source: entry.path().to_path_buf(),
                    result,
                };
                on_entry(&synced);
                report.entries.push(synced);
            }
            Err(err) => {
                tracing::warn!("copy failed for {}: {err}", entry.path().display());
                report.failures.push((entry.path().to_path_buf(), err));
            }
        }
    }

    remove_orphans(dest, &expected, &mut report);

    report.entries.sort_by(|a, b| a.dest().cmp(b.dest()));
    report.removed.sort();
    Ok(report)
}

/// Remove `dest` when it exists as the other kind of entry than the source.
/// Returns whether something was removed.
fn clear_mismatched(dest: &Path, source_is_dir: bool) -> Result<bool, SyncError> {
    let meta = match std::fs::symlink_metadata(dest) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(io_err(dest, err)),
    };
    if meta.is_dir() == source_is_dir {
        return Ok(false);
    }
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(dest)
    } else {
        std::fs::remove_file(dest)
    };
    removed
        .map(|()| true)
        .map_err(|source| SyncError::OrphanDelete {
            path: dest.to_path_buf(),
            source,
        })
}

fn remove_orphans(dest: &Path, expected: &HashSet<PathBuf>, report: &mut SyncReport) {
    let walker = WalkDir::new(dest).min_depth(1).contents_first(true);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dest.to_path_buf());
                report.failures.push((path, err.into()));
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(dest) else {
            continue;
        };
        if expected.contains(relative) {
            continue;
        }

        let path = entry.path().to_path_buf();
        let removed = if entry.file_type().is_dir() {
            std::fs::remove_dir(&path)
        } else {
            std::fs::remove_file(&path)
        };
        match removed {
            Ok(()) => {
                tracing::info!("removed orphan: {}", path.display());
                report.removed.push(path);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                tracing::warn!("orphan not removable {}: {source}", path.display());
                report
                    .failures
                    .push((path.clone(), SyncError::OrphanDelete { path, source }));
            }
        }
    }
}

/// Initial reconcile of the entrypoint tree.
pub fn sync_entrypoints(
    paths: &ThemePaths,
    on_entry: impl FnMut(&SyncEntry),
) -> Result<SyncReport, SyncError> {
    let target = MirrorTarget::entrypoints(paths);
    sync_tree(&paths.entry_dir, &target.root, &paths.exclude, on_entry)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sections_target(root: &Path) -> MirrorTarget {
        MirrorTarget {
            label: "sections",
            root: root.to_path_buf(),
            layout: Layout::Flatten,
            filter: PathFilter::Glob {
                pattern: Pattern::new("**/*.liquid").unwrap(),
                skip_dotfiles: true,
            },
            copies: CopyLedger::default(),
        }
    }

    fn entry_target(root: &Path) -> MirrorTarget {
        MirrorTarget {
            label: "entrypoints",
            root: root.to_path_buf(),
            layout: Layout::Mirror,
            filter: PathFilter::Exclude(ExcludeRule::new([".liquid", ".DS_Store"])),
            copies: CopyLedger::default(),
        }
    }

    #[test]
    fn glob_filter_matches_root_and_nested_templates() {
        let target = sections_target(Path::new("/out"));
        assert_eq!(
            target.destination(Path::new("hero.liquid")),
            Some(PathBuf::from("/out/hero.liquid"))
        );
        assert_eq!(
            target.destination(Path::new("sections/deep/hero.liquid")),
            Some(PathBuf::from("/out/hero.liquid"))
        );
        assert_eq!(target.destination(Path::new("sections/hero.js")), None);
    }

    #[test]
    fn glob_filter_skips_dotfiles() {
        let target = sections_target(Path::new("/out"));
        assert_eq!(target.destination(Path::new(".hidden/hero.liquid")), None);
        assert_eq!(target.destination(Path::new("a/.hero.liquid")), None);
    }

    #[test]
    fn mirror_layout_keeps_relative_path() {
        let target = entry_target(Path::new("/out"));
        assert_eq!(
            target.destination(Path::new("a/b/c.js")),
            Some(PathBuf::from("/out/a/b/c.js"))
        );
        assert_eq!(target.destination(Path::new("a/b/c.liquid")), None);
        assert_eq!(target.destination(Path::new("")), None);
    }

    #[test]
    fn event_outside_source_root_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let target = entry_target(&tmp.path().join("out"));
        let action = apply_event(
            &tmp.path().join("src"),
            &target,
            &WatchEvent::added("/elsewhere/a.js"),
        )
        .unwrap();
        assert_eq!(action, MirrorAction::Skipped);
    }

    #[test]
    fn added_directory_is_created_only_in_mirror_targets() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();

        let mirror = entry_target(&tmp.path().join("entry"));
        let action = apply_event(&src, &mirror, &WatchEvent::added(src.join("sub"))).unwrap();
        assert_eq!(
            action,
            MirrorAction::Tree {
                source: src.join("sub"),
                actions: vec![MirrorAction::DirCreated { path: tmp.path().join("entry").join("sub") }],
            }
        );
        assert!(tmp.path().join("entry").join("sub").is_dir());

        let flat = sections_target(&tmp.path().join("flat"));
        let action = apply_event(&src, &flat, &WatchEvent::added(src.join("sub"))).unwrap();
        assert_eq!(action, MirrorAction::Skipped);
        assert!(!tmp.path().join("flat").exists());
    }

    #[test]
    fn ledger_keeps_destinations_still_fed_by_another_source() {
        let ledger = CopyLedger::default();
        ledger.record(Path::new("/s/a/hero.liquid"), Path::new("/out/hero.liquid"));
        ledger.record(Path::new("/s/b/hero.liquid"), Path::new("/out/hero.liquid"));
        ledger.record(Path::new("/s/a/card.liquid"), Path::new("/out/card.liquid"));

        assert_eq!(ledger.forget_under(Path::new("/s/a")), vec![PathBuf::from("/out/card.liquid")]);
        assert_eq!(ledger.forget_under(Path::new("/s/b")), vec![PathBuf::from("/out/hero.liquid")]);
        assert!(ledger.forget_under(Path::new("/s")).is_empty());
    }

    #[test]
    fn removed_directory_is_removed_recursively() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let out = tmp.path().join("entry");
        fs::create_dir_all(out.join("sub").join("deeper")).unwrap();
        fs::write(out.join("sub").join("deeper").join("x.js"), "x").unwrap();

        let mirror = entry_target(&out);
        let action = apply_event(&src, &mirror, &WatchEvent::removed(src.join("sub"))).unwrap();
        assert_eq!(action, MirrorAction::Removed { path: out.join("sub") });
        assert!(!out.join("sub").exists());
    }

    #[test]
    fn changed_for_vanished_source_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        let target = entry_target(&tmp.path().join("out"));
        let action = apply_event(&src, &target, &WatchEvent::changed(src.join("gone.js"))).unwrap();
        assert_eq!(action, MirrorAction::Skipped);
    }

    #[test]
    fn seed_events_lists_only_followed_files() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("b")).unwrap();
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join("b").join("two.liquid"), "2").unwrap();
        fs::write(src.join("one.liquid"), "1").unwrap();
        fs::write(src.join("one.js"), "j").unwrap();
        fs::write(src.join(".git").join("x.liquid"), "g").unwrap();

        let events = seed_events(&src, &sections_target(&tmp.path().join("out"))).unwrap();
        let paths: Vec<_> = events.iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths, vec![src.join("b").join("two.liquid"), src.join("one.liquid")]);
        assert!(events.iter().all(|e| e.kind == WatchEventKind::Added));
    }

    #[test]
    fn sync_reports_every_file_through_callback() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("z")).unwrap();
        fs::write(src.join("z").join("b.js"), "b").unwrap();
        fs::write(src.join("a.scss"), "a").unwrap();

        let mut seen = Vec::new();
        let report = sync_tree(
            &src,
            &tmp.path().join("out"),
            &ExcludeRule::new([".liquid"]),
            |e| seen.push(e.dest().to_path_buf()),
        )
        .unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(report.written(), 2);
        assert_eq!(report.unchanged(), 0);
    }
}
