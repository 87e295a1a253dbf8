//! Engine binary for the idle village.
//!
//! This is the main entry point that wires together the session runner,
//! save storage, and the Observer API. It loads configuration, rehydrates
//! the saved game, and runs the session until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `village-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the save store and load the clock and saved game
//! 4. Rebuild the session, catching the clock up to now
//! 5. Start the persister and the Observer API
//! 6. Run the session loop until `Ctrl-C`
//! 7. Flush pending saves and stop the observer

mod error;
mod observer_callback;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use village_core::config::{GameConfig, LoggingConfig};
use village_core::runner::{
    CallbackChain, RunnerTiming, SessionControl, SystemClock, WallClock, run_session,
    session_channel,
};
use village_core::session::Session;
use village_observer::{AppState, ServerConfig, spawn_observer};
use village_store::{StateStore, spawn_persister};

use crate::error::EngineError;
use crate::observer_callback::ObserverCallback;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "village-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the session cannot be
/// built, or the observer port cannot be bound.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = GameConfig::load_or_default(Path::new(CONFIG_PATH))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        phase_duration_secs = config.clock.phase_duration_secs,
        production_interval_ms = config.session.production_interval_ms,
        backend = ?config.storage.backend,
        "village-engine starting"
    );

    // 3. Open the save store. Storage is best-effort; an unreachable
    //    backend means this run is not saved.
    let store = match StateStore::open(&config.storage).await {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "Save store unavailable, progress will not be saved");
            StateStore::memory()
        }
    };
    let saved_clock = store.load_clock().await;
    let saved_game = store.load_saved_game().await;
    info!(
        has_clock = saved_clock.is_some(),
        has_save = saved_game.is_some(),
        "Saved state loaded"
    );

    // 4. Rebuild the session.
    let wall = SystemClock;
    let session = Session::restore(&config, saved_game, saved_clock, wall.now())?;
    info!(
        level = session.village().level(),
        workers = session.roster().total(),
        phase = ?session.clock().phase(),
        "Session ready"
    );

    // 5. Start the persister and the Observer API.
    let (handle, requests) = session_channel(config.session.request_buffer);
    let app_state = Arc::new(AppState::new(handle));
    let (persist_callback, persister) =
        spawn_persister(store, config.storage.write_buffer);

    let (observer_stop, observer_stopped) = tokio::sync::oneshot::channel::<()>();
    let observer = if config.observer.enabled {
        let server_config = ServerConfig::from(&config.observer);
        let shutdown = async move {
            let _ = observer_stopped.await;
        };
        Some(spawn_observer(&server_config, Arc::clone(&app_state), shutdown).await?)
    } else {
        info!("Observer API disabled");
        None
    };

    // 6. Run the session until Ctrl-C.
    let control = Arc::new(SessionControl::new());
    let ctrl_c_control = Arc::clone(&control);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping session");
                ctrl_c_control.request_stop();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    let mut callbacks = CallbackChain::new()
        .with(persist_callback)
        .with(ObserverCallback::new(Arc::clone(&app_state)));
    let summary = run_session(
        session,
        requests,
        &control,
        &wall,
        RunnerTiming::from_config(&config),
        &mut callbacks,
    )
    .await;

    // 7. Flush pending saves and stop the observer.
    drop(callbacks);
    match persister.await {
        Ok(stats) => info!(
            jobs_written = stats.jobs_written,
            write_failures = stats.write_failures,
            "Saves flushed"
        ),
        Err(e) => warn!(error = %e, "Persister task failed"),
    }

    let _ = observer_stop.send(());
    if let Some(observer) = observer
        && let Err(e) = observer.await
    {
        warn!(error = %e, "Observer task failed");
    }

    info!(
        end_reason = ?summary.end_reason,
        production_ticks = summary.production_ticks,
        commands_applied = summary.commands_applied,
        level = summary.session.village().level(),
        "village-engine shutdown complete"
    );

    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
