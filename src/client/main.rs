/**
 * StudyMate Connection Monitor - Entry Point
 *
 * Watches the StudyMate backend, logs every status change, and pushes
 * locally cached task changes whenever the server comes back.
 *
 * Usage:
 *   studymate-monitor            watch until Ctrl-C
 *   studymate-monitor status     print the persisted status and exit
 *   studymate-monitor demo-on    enable demo mode and exit
 *   studymate-monitor demo-off   disable demo mode and exit
 */

use std::sync::Arc;
use studymate::client::{
    Config, ConnectionMonitor, FileBackend, HttpHealthProbe, HttpTaskRemote, LocalFallbackStore,
    Reconciler,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .init();

    let config = Config::from_env()?;
    let backend = FileBackend::open(config.storage_dir())?;
    tracing::debug!("Local storage at {}", backend.root().display());
    let store = LocalFallbackStore::with_prefix(Arc::new(backend), config.storage_prefix());

    let monitor_config = config.monitor_config();
    let probe = HttpHealthProbe::new(config.health_url(), monitor_config.probe_timeout)?;
    let max_retries = monitor_config.max_retries;
    let monitor = ConnectionMonitor::new(monitor_config, Arc::new(probe), store.clone());

    match std::env::args().nth(1).as_deref() {
        Some("status") => {
            match store.server_status() {
                Some(saved) => println!("{}", serde_json::to_string_pretty(&saved)?),
                None => println!("No status recorded yet"),
            }
            println!("Demo mode: {}", store.is_demo_mode());
            println!("Unsynced tasks: {}", store.list_unsynced().len());
            return Ok(());
        }
        Some("demo-on") => {
            monitor.enable_demo_mode();
            return Ok(());
        }
        Some("demo-off") => {
            monitor.disable_demo_mode();
            return Ok(());
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: studymate-monitor [status|demo-on|demo-off]");
            std::process::exit(2);
        }
        None => {}
    }

    tracing::info!("Monitoring {}", config.health_url());

    let banner_store = store.clone();
    monitor.subscribe(move |status| {
        let line = status
            .snapshot(max_retries, banner_store.is_demo_mode())
            .describe();
        if status.is_checking {
            tracing::debug!("{}", line);
        } else {
            tracing::info!("{}", line);
        }
    });

    // Push local changes on every offline -> online transition
    let reconciler = Reconciler::new(Arc::new(HttpTaskRemote::new(config.clone())));
    let sync_monitor = monitor.clone();
    let mut status_rx = monitor.watch();
    let sync_task = tokio::spawn(async move {
        let mut was_online = status_rx.borrow().is_online;
        while status_rx.changed().await.is_ok() {
            let is_online = status_rx.borrow_and_update().is_online;
            if is_online && !was_online {
                let snapshot = sync_monitor.status();
                match reconciler.push_unsynced(sync_monitor.store(), &snapshot).await {
                    Ok(report) if report.pushed + report.failed > 0 => {
                        tracing::info!("Synced {} tasks ({} failed)", report.pushed, report.failed);
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Sync skipped: {}", e),
                }
            }
            was_online = is_online;
        }
    });

    monitor.initialize();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    monitor.cleanup();
    sync_task.abort();

    Ok(())
}
