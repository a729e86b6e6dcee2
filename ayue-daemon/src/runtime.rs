use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::Instant;

use ayue_core::ThemePaths;
use ayue_sync::{
    apply_event, build, seed_events, sync_entrypoints, targets, BuildSummary, Layout,
    MirrorAction, MirrorTarget, WatchEvent, WatchEventKind, WriteResult,
};

use crate::error::{io_err, DaemonError};
use crate::paths::{socket_path, state_dir};
use crate::protocol::{DaemonRequest, DaemonResponse};
use crate::watch::EventStream;

struct BuildJob {
    source: &'static str,
    respond_to: oneshot::Sender<BuildSummary>,
}

struct HotUpdateJob {
    path: PathBuf,
    respond_to: oneshot::Sender<Result<Value, String>>,
}

/// Counters reported by the `status` command.
#[derive(Debug, Default, Clone)]
struct DaemonStats {
    builds: u64,
    last_build_at_unix: u64,
    events_applied: u64,
}

type SharedStats = Arc<RwLock<DaemonStats>>;

/// Start the daemon on a single-threaded runtime and block until it exits.
pub fn start_blocking(paths: ThemePaths) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(paths))
}

/// Run the daemon: initial sync, then watcher, build queue, socket server and
/// signal handler until a shutdown is requested.
pub async fn run(paths: ThemePaths) -> Result<(), DaemonError> {
    let state = state_dir(&paths.root);
    fs::create_dir_all(&state).map_err(|e| io_err(&state, e))?;
    fs::create_dir_all(&paths.entry_dir).map_err(|e| io_err(&paths.entry_dir, e))?;

    initial_sync(&paths).await?;

    // Subscribe before seeding so nothing created in between is lost.
    let stream = EventStream::open(&paths.entry_dir)?;
    let source_root = stream.root().to_path_buf();
    let mirror_targets = targets(&paths)?;
    seed_sections(&source_root, &mirror_targets).await?;

    let stats: SharedStats = Arc::new(RwLock::new(DaemonStats::default()));
    let started_at_unix = unix_seconds_now();

    let (build_tx, build_rx) = mpsc::channel::<BuildJob>(16);
    let (hot_tx, hot_rx) = mpsc::channel::<HotUpdateJob>(64);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let stats = stats.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result =
                watcher_task(stream, mirror_targets, hot_rx, stats, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let builder_handle = {
        let shutdown = shutdown_tx.clone();
        let paths = paths.clone();
        let stats = stats.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = build_processor_task(paths, stats, build_rx, shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let paths = paths.clone();
        let stats = stats.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = socket_server_task(
                paths,
                stats,
                build_tx,
                hot_tx,
                shutdown.clone(),
                shutdown_rx,
                started_at_unix,
            )
            .await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (watcher_result, builder_result, socket_result, signal_result) =
        tokio::join!(watcher_handle, builder_handle, socket_handle, signal_handle);

    handle_join("watcher", watcher_result)?;
    handle_join("build_processor", builder_result)?;
    handle_join("socket_server", socket_result)?;
    handle_join("signal_handler", signal_result)?;
    tracing::info!("daemon stopped");
    Ok(())
}

async fn initial_sync(paths: &ThemePaths) -> Result<(), DaemonError> {
    let sync_paths = paths.clone();
    let report = tokio::task::spawn_blocking(move || {
        sync_entrypoints(&sync_paths, |entry| match &entry.result {
            WriteResult::Written { path } => {
                tracing::info!(path = %sync_paths.display_relative(path), "sync file");
            }
            WriteResult::Unchanged { path } => {
                tracing::debug!(path = %sync_paths.display_relative(path), "unchanged");
            }
        })
    })
    .await
    .map_err(|err| DaemonError::Protocol(format!("initial sync join error: {err}")))??;

    for removed in &report.removed {
        tracing::info!(path = %paths.display_relative(removed), "Unlink");
    }
    for (path, err) in &report.failures {
        tracing::error!(path = %path.display(), error = %err, "initial sync failure");
    }
    tracing::info!(
        written = report.written(),
        unchanged = report.unchanged(),
        removed = report.removed.len(),
        "initial entrypoint sync completed",
    );
    Ok(())
}

/// Copy every template already present into the flat targets.
async fn seed_sections(source_root: &Path, targets: &[MirrorTarget]) -> Result<(), DaemonError> {
    for target in targets.iter().filter(|t| t.layout == Layout::Flatten) {
        let root = source_root.to_path_buf();
        let target = target.clone();
        let seeded = tokio::task::spawn_blocking(move || -> Result<usize, DaemonError> {
            let events = seed_events(&root, &target)?;
            for event in &events {
                match apply_event(&root, &target, event) {
                    Ok(action) => log_action(target.label, event, &action),
                    Err(err) => tracing::error!(
                        path = %event.path.display(),
                        error = %err,
                        "seed copy failed",
                    ),
                }
            }
            Ok(events.len())
        })
        .await
        .map_err(|err| DaemonError::Protocol(format!("seed join error: {err}")))??;
        tracing::debug!(seeded, "sections seeded");
    }
    Ok(())
}

async fn watcher_task(
    mut stream: EventStream,
    targets: Vec<MirrorTarget>,
    mut hot_rx: mpsc::Receiver<HotUpdateJob>,
    stats: SharedStats,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let source_root = stream.root().to_path_buf();
    let targets = Arc::new(targets);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = stream.next() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                let applied = dispatch(source_root.clone(), targets.clone(), event).await?;
                if applied > 0 {
                    stats.write().await.events_applied += applied;
                }
            }
            Some(job) = hot_rx.recv() => {
                let outcome = hot_update(source_root.clone(), targets.clone(), job.path).await;
                let _ = job.respond_to.send(outcome);
            }
        }
    }

    stream.close().await
}

/// Apply one event to every target, off the runtime thread. Returns how many
/// targets it had an effect on.
async fn dispatch(
    source_root: PathBuf,
    targets: Arc<Vec<MirrorTarget>>,
    event: WatchEvent,
) -> Result<u64, DaemonError> {
    tokio::task::spawn_blocking(move || dispatch_blocking(&source_root, &targets, &event))
        .await
        .map_err(|err| DaemonError::Protocol(format!("dispatch join error: {err}")))
}

fn dispatch_blocking(source_root: &Path, targets: &[MirrorTarget], event: &WatchEvent) -> u64 {
    let mut applied = 0;
    for target in targets {
        match apply_event(source_root, target, event) {
            Ok(MirrorAction::Skipped) => {}
            Ok(action) => {
                log_action(target.label, event, &action);
                applied += 1;
            }
            Err(err) => {
                tracing::error!(
                    target_dir = target.label,
                    path = %event.path.display(),
                    error = %err,
                    "reconcile failed",
                );
            }
        }
    }
    applied
}

async fn hot_update(
    source_root: PathBuf,
    targets: Arc<Vec<MirrorTarget>>,
    path: PathBuf,
) -> Result<Value, String> {
    let joined = tokio::task::spawn_blocking(move || {
        let path = fs::canonicalize(&path).unwrap_or(path);
        let mut copied = Vec::new();
        for target in targets.iter().filter(|t| t.layout == Layout::Flatten) {
            let action = ayue_sync::hot_update(&source_root, target, &path)?;
            if let MirrorAction::Copied(result) = &action {
                tracing::info!(path = %result.path().display(), "HotUpdate");
                copied.push(result.path().display().to_string());
            }
        }
        Ok::<_, ayue_sync::SyncError>(json!({ "copied": copied }))
    })
    .await
    .map_err(|err| format!("hot update join error: {err}"))?;
    joined.map_err(|err| err.to_string())
}

fn log_action(label: &str, event: &WatchEvent, action: &MirrorAction) {
    match action {
        MirrorAction::Copied(WriteResult::Written { path }) => {
            let verb = match event.kind {
                WatchEventKind::Added => "add",
                _ => "change",
            };
            tracing::info!(target_dir = label, event = verb, path = %path.display(), "sync file");
        }
        MirrorAction::Copied(WriteResult::Unchanged { path }) => {
            tracing::debug!(target_dir = label, path = %path.display(), "unchanged");
        }
        MirrorAction::DirCreated { path } => {
            tracing::info!(target_dir = label, path = %path.display(), "sync dir");
        }
        MirrorAction::Removed { path } => {
            tracing::info!(target_dir = label, path = %path.display(), "Unlink");
        }
        MirrorAction::Absent { path } => {
            tracing::debug!(target_dir = label, path = %path.display(), "already absent");
        }
        MirrorAction::Tree { source, actions } => {
            tracing::debug!(target_dir = label, path = %source.display(), entries = actions.len(), "directory event");
            for action in actions {
                log_action(label, event, action);
            }
        }
        MirrorAction::Skipped => {}
    }
}

async fn build_processor_task(
    paths: ThemePaths,
    stats: SharedStats,
    mut build_rx: mpsc::Receiver<BuildJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            maybe_job = build_rx.recv() => {
                let Some(job) = maybe_job else { break };
                let started = Instant::now();

                let build_paths = paths.clone();
                let report = tokio::task::spawn_blocking(move || build::run(&build_paths))
                    .await
                    .map_err(|err| DaemonError::Protocol(format!("build task join error: {err}")))?;

                for doc in &report.docs {
                    tracing::info!(path = %paths.display_relative(doc), "Doc");
                }
                for output in &report.outputs {
                    tracing::info!(path = %paths.display_relative(output), "Build-Liquid");
                }
                for failure in &report.failures {
                    tracing::error!(path = %failure.path.display(), error = %failure.error, "build failure");
                }
                let duration_ms = started.elapsed().as_millis() as u64;
                tracing::info!(
                    source = job.source,
                    outputs = report.outputs.len(),
                    docs = report.docs.len(),
                    failures = report.failures.len(),
                    duration_ms,
                    "build pass completed",
                );

                {
                    let mut stats = stats.write().await;
                    stats.builds += 1;
                    stats.last_build_at_unix = unix_seconds_now();
                }
                let _ = job.respond_to.send(report.summary(&paths));
            }
        }
    }
    Ok(())
}

async fn socket_server_task(
    paths: ThemePaths,
    stats: SharedStats,
    build_tx: mpsc::Sender<BuildJob>,
    hot_tx: mpsc::Sender<HotUpdateJob>,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
    started_at_unix: u64,
) -> Result<(), DaemonError> {
    let socket = socket_path(&paths.root);
    prepare_socket_for_bind(&socket)?;

    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;
    tracing::info!(socket = %socket.display(), "daemon listening");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let client = Client {
                    paths: paths.clone(),
                    stats: stats.clone(),
                    build_tx: build_tx.clone(),
                    hot_tx: hot_tx.clone(),
                    shutdown_tx: shutdown_tx.clone(),
                    started_at_unix,
                };
                tokio::spawn(async move {
                    if let Err(err) = client.serve(stream).await {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

/// Everything a socket connection needs to answer requests.
struct Client {
    paths: ThemePaths,
    stats: SharedStats,
    build_tx: mpsc::Sender<BuildJob>,
    hot_tx: mpsc::Sender<HotUpdateJob>,
    shutdown_tx: broadcast::Sender<()>,
    started_at_unix: u64,
}

impl Client {
    async fn serve(self, stream: UnixStream) -> Result<(), DaemonError> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| io_err("daemon socket read", e))?
        {
            if line.trim().is_empty() {
                continue;
            }

            let request: DaemonRequest = match serde_json::from_str(&line) {
                Ok(request) => request,
                Err(err) => {
                    write_response(
                        &mut writer,
                        &DaemonResponse::error(format!("invalid request JSON: {err}")),
                    )
                    .await?;
                    continue;
                }
            };

            let stop = request.cmd == "stop";
            let response = self.handle(request).await;
            write_response(&mut writer, &response).await?;
            if stop {
                break;
            }
        }

        Ok(())
    }

    async fn handle(&self, request: DaemonRequest) -> DaemonResponse {
        match request.cmd.as_str() {
            "status" => {
                let stats = self.stats.read().await.clone();
                DaemonResponse::ok(status_payload(&self.paths, &stats, self.started_at_unix))
            }
            "build" => match enqueue_build(&self.build_tx, "socket").await {
                Ok(summary) => DaemonResponse::ok(json!(summary)),
                Err(err) => DaemonResponse::error(err.to_string()),
            },
            "hot_update" => {
                let Some(path) = request.path else {
                    return DaemonResponse::error("hot_update requires a path");
                };
                let path = if path.is_absolute() {
                    path
                } else {
                    self.paths.root.join(path)
                };
                match enqueue_hot_update(&self.hot_tx, path).await {
                    Ok(data) => DaemonResponse::ok(data),
                    Err(err) => DaemonResponse::error(err.to_string()),
                }
            }
            "stop" => {
                let _ = self.shutdown_tx.send(());
                DaemonResponse::ok(json!({ "stopping": true }))
            }
            other => DaemonResponse::error(format!("unknown command '{other}'")),
        }
    }
}

fn status_payload(paths: &ThemePaths, stats: &DaemonStats, started_at_unix: u64) -> Value {
    json!({
        "running": true,
        "pid": std::process::id(),
        "started_at_unix": started_at_unix,
        "builds": stats.builds,
        "last_build_at_unix": stats.last_build_at_unix,
        "events_applied": stats.events_applied,
        "root": paths.root.display().to_string(),
        "entry_dir": paths.entry_dir.display().to_string(),
        "socket": socket_path(&paths.root).display().to_string(),
    })
}

async fn enqueue_build(
    build_tx: &mpsc::Sender<BuildJob>,
    source: &'static str,
) -> Result<BuildSummary, DaemonError> {
    let (tx, rx) = oneshot::channel();
    build_tx
        .send(BuildJob {
            source,
            respond_to: tx,
        })
        .await
        .map_err(|_| DaemonError::ChannelClosed("build queue"))?;
    rx.await
        .map_err(|_| DaemonError::ChannelClosed("build response"))
}

async fn enqueue_hot_update(
    hot_tx: &mpsc::Sender<HotUpdateJob>,
    path: PathBuf,
) -> Result<Value, DaemonError> {
    let (tx, rx) = oneshot::channel();
    hot_tx
        .send(HotUpdateJob {
            path,
            respond_to: tx,
        })
        .await
        .map_err(|_| DaemonError::ChannelClosed("hot update queue"))?;
    let outcome = rx
        .await
        .map_err(|_| DaemonError::ChannelClosed("hot update response"))?;
    outcome.map_err(DaemonError::Protocol)
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(DaemonError::Protocol(format!(
                "daemon socket already in use: {}",
                socket.display()
            )));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale daemon socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &DaemonResponse,
) -> Result<(), DaemonError> {
    let payload = serde_json::to_string(response)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("daemon socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Install the global subscriber: `RUST_LOG` if set, `info` otherwise.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), DaemonError> {
    Ok(())
}
