//! Live command - rebuild on change and serve the output

use std::{
    fs,
    future::IntoFuture,
    path::{Path, PathBuf},
    sync::Arc,
};

use blogsmith_generator::Builder;
use color_eyre::eyre::{Result, WrapErr};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher, event::ModifyKind};
use tokio::{net::TcpListener, sync::mpsc};
use walkdir::WalkDir;

use super::{load_config, print_build_stats};
use crate::{
    rebuild::{QUIET_PERIOD, run_debounced},
    server::create_router,
};

/// Run the live command.
///
/// Builds once, then rebuilds whenever the source tree changes while an HTTP
/// server keeps serving the output directory.
pub async fn run(
    config_path: Option<&Path>,
    source: &Path,
    output: &Path,
    port: u16,
    drafts: bool,
) -> Result<()> {
    tracing::info!(?config_path, ?source, ?output, port, "Starting live mode");

    let config = load_config(config_path, source)?;
    let base_path = config.base_path.clone();

    fs::create_dir_all(output)
        .wrap_err_with(|| format!("Failed to create output directory {}", output.display()))?;

    let builder = Arc::new(Builder::new(config, source, output).include_drafts(drafts));

    // A broken document must not keep the server from starting.
    tracing::info!("Running initial build...");
    let initial = Arc::clone(&builder);
    match tokio::task::spawn_blocking(move || initial.build()).await {
        Ok(Ok(stats)) => print_build_stats(&stats),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "initial build failed");
            eprintln!("  ✗ Initial build failed: {e}");
        }
        Err(e) => tracing::error!(error = %e, "initial build panicked"),
    }

    let (tx, rx) = mpsc::channel::<()>(16);
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) if is_relevant(&event.kind) => {
                tracing::trace!(paths = ?event.paths, kind = ?event.kind, "source event");
                // A full channel already holds a pending change.
                let _ = tx.try_send(());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "watch error"),
        },
        notify::Config::default(),
    )
    .wrap_err("Failed to create file watcher")?;

    let dirs = watch_dirs(source, output)?;
    for dir in &dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .wrap_err_with(|| format!("Failed to watch {}", dir.display()))?;
    }
    tracing::debug!(count = dirs.len(), "watching source directories");

    let rebuild_builder = Arc::clone(&builder);
    tokio::spawn(async move {
        let rebuild = move || {
            let builder = Arc::clone(&rebuild_builder);
            async move {
                println!();
                println!("  File change detected, rebuilding...");
                match tokio::task::spawn_blocking(move || builder.build()).await {
                    Ok(Ok(stats)) => println!(
                        "  ✓ Rebuilt {} articles and {} pages in {}ms",
                        stats.articles, stats.pages, stats.duration_ms
                    ),
                    Ok(Err(e)) => {
                        tracing::error!("Rebuild failed: {e}");
                        eprintln!("  ✗ Rebuild failed: {e}");
                    }
                    Err(e) => tracing::error!(error = %e, "rebuild task panicked"),
                }
            }
        };
        run_debounced(rx, QUIET_PERIOD, rebuild).await;
    });

    let app = create_router(output, &base_path);
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Live server running at http://{addr}{base_path}/");
    println!("  Press Ctrl+C to stop");
    println!();

    // Keep watcher alive
    let _watcher = watcher;

    tokio::select! {
        res = axum::serve(listener, app).into_future() => res.wrap_err("Server error")?,
        () = shutdown_signal() => {
            println!();
            println!("  Stopping live server");
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Whether a watcher event should trigger a rebuild.
///
/// Reads and metadata-only changes (permissions, timestamps) are ignored.
#[must_use]
pub fn is_relevant(kind: &EventKind) -> bool {
    !matches!(
        kind,
        EventKind::Access(_) | EventKind::Modify(ModifyKind::Metadata(_))
    )
}

/// Every directory under `source`, skipping the output directory when it
/// lives inside the source tree.
pub fn watch_dirs(source: &Path, output: &Path) -> Result<Vec<PathBuf>> {
    let output = output.canonicalize().ok();
    let is_output = |path: &Path| output.is_some() && path.canonicalize().ok() == output;

    let mut dirs = Vec::new();
    for entry in WalkDir::new(source)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.file_type().is_dir() && is_output(entry.path())))
    {
        let entry = entry.wrap_err_with(|| format!("Failed to scan {}", source.display()))?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    Ok(dirs)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
