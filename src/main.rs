//! Entry point for the **snapgrd** daemon.
//!
//! Runs the Unix-socket command listener on a background thread and
//! processes commands on the main thread.  Placement events are written to
//! stdout as one JSON object per line, for the shell to apply.

use snapgrd::announce::LogAnnouncer;
use snapgrd::command::Command;
use snapgrd::config::Config;
use snapgrd::ipc::listener::UnixSocketListener;
use snapgrd::persistence::FileStore;
use snapgrd::service::{PlacementEvent, PlacementService};
use snapgrd::traits::{Announcer, CommandSource, KeyValueStore};
use log::{error, info};
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/snapgrd.sock", runtime)
}

fn home() -> String {
    std::env::var("HOME").unwrap_or_else(|_| "/tmp".into())
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/snapgrd`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| format!("{}/.config", home()));
    PathBuf::from(base).join("snapgrd")
}

/// Resolve the default settings directory (`$XDG_STATE_HOME/snapgrd`).
fn state_dir() -> PathBuf {
    let base =
        std::env::var("XDG_STATE_HOME").unwrap_or_else(|_| format!("{}/.local/state", home()));
    PathBuf::from(base).join("snapgrd")
}

/// Try to load the config from `$XDG_CONFIG_HOME/snapgrd/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main 

fn main() {
    env_logger::init();

    let config = load_config();
    let store = FileStore::new(config.store_dir.clone().unwrap_or_else(state_dir));
    info!("settings stored in {}", store.dir().display());

    let mut service = PlacementService::new(
        store,
        LogAnnouncer,
        &config.viewport,
        config.margin,
    );

    let (event_tx, event_rx) = mpsc::channel::<PlacementEvent>();
    service.set_event_sink(event_tx);
    std::thread::spawn(move || write_events(event_rx));

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_sources(cmd_tx);

    run_event_loop(service, cmd_rx);
}

//  Event loop 

/// Process commands until every source has gone away.
///
/// While a debounced snap is pending the loop wakes at its deadline even if
/// no further command arrives.
fn run_event_loop<S: KeyValueStore, A: Announcer>(
    mut service: PlacementService<S, A>,
    cmd_rx: mpsc::Receiver<Command>,
) {
    info!("snapgrd running");
    loop {
        let received = match service.next_deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match cmd_rx.recv_timeout(timeout) {
                    Ok(cmd) => Some(cmd),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            },
        };
        if let Some(cmd) = received {
            if let Err(e) = service.handle(cmd) {
                error!("command error: {}", e);
            }
        }
        service.tick(Instant::now());
    }
    info!("all command sources closed, exiting");
}

//  Helpers 

fn spawn_command_sources(tx: mpsc::Sender<Command>) {
    let path = default_socket_path();
    std::thread::spawn(move || {
        let mut source = UnixSocketListener::new(&path);
        if let Err(e) = source.run(tx) {
            error!("socket listener error: {}", e);
        }
    });
}

/// Write each event to stdout as a JSON line.
fn write_events(rx: mpsc::Receiver<PlacementEvent>) {
    let stdout = std::io::stdout();
    for event in rx {
        match serde_json::to_string(&event) {
            Ok(json) => {
                let mut out = stdout.lock();
                if writeln!(out, "{}", json).and_then(|_| out.flush()).is_err() {
                    error!("stdout closed, dropping events");
                    return;
                }
            }
            Err(e) => error!("failed to encode event: {}", e),
        }
    }
}
