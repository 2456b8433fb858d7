//! Echo client for a WebSocket endpoint
//!
//! Usage: `session_echo [ws-url]` (or set `SESSION_URL`). Session options are
//! read from `SESSION_CONFIG_PATH` (default `config/session.yaml`); a missing
//! file falls back to the built-in defaults.

use anyhow::{Context, Result};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info, warn};
use wsession_app::bin_common::{
    init_tracing, load_config_from_env, parse_args, print_banner, print_shutdown, session_url,
    wait_for_shutdown, ConfigType, SESSION_URL_VAR,
};
use wsession_app::wsession::{Session, SessionConfig, SessionEvent, WsTransport};

const NAME: &str = "Session Echo";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = parse_args();
    let url = session_url(&args).with_context(|| {
        format!("no endpoint given: pass a ws:// URL or set {}", SESSION_URL_VAR)
    })?;

    let config_path = load_config_from_env(ConfigType::Session);
    let config = match SessionConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!(
                "Could not load {} ({}), using defaults",
                config_path.display(),
                e
            );
            SessionConfig::default()
        }
    };
    info!(
        "reconnect={} interval={}ms max_retries={}",
        config.reconnect, config.reconnect_interval_ms, config.max_retries
    );

    let transport = WsTransport::new(url.as_str())?;
    let session = Session::<serde_json::Value>::builder()
        .transport(transport)
        .config(config.clone())
        .on_open(|| info!("Connected"))
        .on_close(|| info!("Disconnected"))
        .on_error(|err| error!("{}", err))
        .build()?;

    print_banner(NAME, &url);

    if !config.auto_connect {
        session.connect();
    }

    let events = session.events();
    let printer = tokio::task::spawn_blocking(move || {
        // Ends once the session's driver has exited
        while let Ok(event) = events.recv() {
            match event {
                SessionEvent::Status(status) => info!("Status: {}", status),
                SessionEvent::RetryScheduled { attempt, delay } => {
                    info!("Retry {} scheduled in {:?}", attempt, delay)
                }
                SessionEvent::Message(message) => println!("{}", message),
                SessionEvent::Error(_) => {}
            }
        }
    });

    // Greet once per successful open
    let mut was_connected = false;
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result?;
                break;
            }
            _ = ticker.tick() => {
                let connected = session.is_connected();
                if connected && !was_connected {
                    session.send(json!({ "text": "hello from session_echo" }));
                }
                was_connected = connected;
            }
        }
    }

    let received = session.message_count();
    session.shutdown().await?;
    if let Err(e) = printer.await {
        warn!("Event printer ended abnormally: {}", e);
    }

    print_shutdown(NAME, Some(&format!("Received {} messages", received)));
    Ok(())
}
