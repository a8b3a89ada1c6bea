// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod notify_desktop;
pub mod reload;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{load_for_app, ConfigFile};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, DEBOUNCE_WINDOW};
use crate::exec::{
    child_envs, platform_terminator, resolve_run_args, BuildDispatcher, BuildSettings, BuildSupervisor,
    CompileRequest, GoToolchain, ProcessManager, SupervisorDispatcher,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::notify_desktop::{DesktopNotifier, Notifier};
use crate::reload::{spawn_hub, start_reload_server, RELOAD_ADDR};
use crate::watch::{discover_watch_set, spawn_watcher, ChangeFilter, DiscoveryOptions, WatchSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and watch-set discovery
/// - (optional) reload hub and websocket server
/// - build supervisor and process manager
/// - file watcher and Ctrl-C handling
/// - the debounce runtime
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;
    let app_dir = resolve_app_dir(&cwd, args.app_path.as_deref())?;
    let app_name = app_name(&app_dir)?;
    let cfg = load_for_app(args.config.as_deref(), &app_dir)?;

    let filter = ChangeFilter::from_config(&cfg)?;
    let options = DiscoveryOptions {
        excluded: args.excluded.iter().map(|p| absolutize(&cwd, p)).collect(),
        watch_vendor: args.vendor || cfg.watch.watch_vendor,
        extra_roots: args.extra_dirs.iter().map(|p| absolutize(&cwd, p)).collect(),
        others: cfg.watch.others.iter().map(|p| absolutize(&app_dir, Path::new(p))).collect(),
    };
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let watch_set = discover_watch_set(fs.as_ref(), &app_dir, &filter, &options, &args.main_files);
    info!(app = %app_name, dir = ?app_dir, "using application");

    let settings = BuildSettings {
        binary_name: app_name,
        tags: args.tags.clone().or_else(|| non_empty(&cfg.build.tags)),
        ldflags: args.ldflags.clone().or_else(|| non_empty(&cfg.build.ldflags)),
        pre_install: cfg.build.pre_install,
    };
    let run_args = resolve_run_args(args.runargs.as_deref(), &cfg.run.args);
    let envs = child_envs(cfg.env_pairs(), args.runmode.as_deref());

    if args.dry_run {
        print_dry_run(&cfg, &watch_set, &settings, &run_args, &envs);
        return Ok(());
    }

    let hub = if cfg.reload.enabled {
        let (hub, _hub_task) = spawn_hub();
        start_reload_server(hub.clone(), RELOAD_ADDR).await;
        Some(hub)
    } else {
        None
    };

    let notifier: Arc<dyn Notifier> = Arc::new(DesktopNotifier::new(cfg.notify.enabled));
    let toolchain = GoToolchain::new(cfg.build.tool.clone(), cfg.build.doc_command.clone(), &app_dir);
    let process = ProcessManager::new(&app_dir, run_args, envs, platform_terminator());
    let supervisor = Arc::new(BuildSupervisor::new(
        Box::new(toolchain),
        Box::new(process),
        notifier,
        settings,
    ));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // Fatal on failure: nothing useful happens without the watch set.
    let _watcher_handle = spawn_watcher(&watch_set, Arc::clone(&fs), rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let core = CoreRuntime::new(
        filter,
        RuntimeOptions {
            debounce_window: DEBOUNCE_WINDOW,
            main_files: watch_set.main_files.clone(),
            generate_docs: args.gendoc,
        },
    );

    let mut dispatcher = SupervisorDispatcher::new(supervisor, hub.clone());
    dispatcher.dispatch(core.initial_job()).await?;

    let runtime = Runtime::new(core, rt_rx, dispatcher, hub);
    runtime.run().await?;
    Ok(())
}

/// Absolute, symlink-free application directory.
fn resolve_app_dir(cwd: &Path, app_path: Option<&Path>) -> Result<PathBuf> {
    let dir = match app_path {
        Some(p) => cwd.join(p),
        None => cwd.to_path_buf(),
    };
    std::fs::canonicalize(&dir).with_context(|| format!("application directory {dir:?} not found"))
}

/// The binary is named after the application directory.
fn app_name(app_dir: &Path) -> Result<String> {
    app_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("cannot derive an application name from {app_dir:?}"))
}

fn absolutize(base: &Path, p: &Path) -> PathBuf {
    let joined = base.join(p);
    std::fs::canonicalize(&joined)
        .or_else(|_| std::path::absolute(&joined))
        .unwrap_or(joined)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Simple dry-run output: watch set, build command and run arguments.
fn print_dry_run(
    cfg: &ConfigFile,
    watch_set: &WatchSet,
    settings: &BuildSettings,
    run_args: &[String],
    envs: &[(String, String)],
) {
    let compile = CompileRequest {
        output: settings.output_name(),
        tags: settings.tags.clone(),
        ldflags: settings.ldflags.clone(),
        files: watch_set.main_files.clone(),
    };

    println!("hotrun dry-run");
    println!("  binary = {}", settings.output_name());
    println!("  build  = {} {}", cfg.build.tool, compile.args().join(" "));
    println!("  pre_install = {}", settings.pre_install);
    println!("  run args = {run_args:?}");
    if !envs.is_empty() {
        println!("  envs = {envs:?}");
    }
    println!("  live reload = {}", cfg.reload.enabled);
    println!();

    println!("watched directories ({}):", watch_set.dirs.len());
    for dir in &watch_set.dirs {
        println!("  - {}", dir.display());
    }

    debug!("dry-run complete (no execution)");
}
