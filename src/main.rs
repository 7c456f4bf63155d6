//! TaskHive Agent — headless realtime sync client.
//!
//! Main entry point that wires the sync engine to the WebSocket transport,
//! forwards incoming messages to local notifications, and maps process
//! signals to app lifecycle transitions.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use taskhive_core::config::AppConfig;
use taskhive_core::error::AppError;
use taskhive_prefs::PreferenceStore;
use taskhive_push::{
    LocalNotification, LocalNotifier, StaticTokenProvider, TracingNotificationSink,
};
use taskhive_realtime::{
    AppLifecycleState, ClientEvent, SessionCredentials, SyncEngine, WsConnector,
};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Agent error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TASKHIVE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main agent run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    info!("Starting TaskHive agent v{}", env!("CARGO_PKG_VERSION"));

    // Theme preference, read once at startup.
    let prefs = PreferenceStore::new(&config.prefs);
    let theme = prefs.load().await?.map(|p| p.theme).unwrap_or_default();
    info!(theme = theme.as_str(), "Preferences loaded");

    // Engine wiring: WebSocket transport + config-backed token provider.
    let connector = Arc::new(WsConnector::new(&config.realtime));
    let token_provider = Arc::new(StaticTokenProvider::from_config(&config.push));
    let engine = SyncEngine::new(config.realtime.clone(), connector, token_provider);

    let notifier = LocalNotifier::new(Arc::new(TracingNotificationSink));

    match session_credentials(&config) {
        Some(credentials) => {
            info!(user_id = %credentials.user_id, "Logging in");
            engine.login(credentials).await;
        }
        None => warn!("No credentials configured; agent stays offline"),
    }

    let mut events = engine.subscribe();
    let mut lifecycle = lifecycle_signals()?;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received, starting graceful shutdown...");
                break;
            }
            Some(state) = lifecycle.recv() => {
                engine.app_state_changed(state).await;
            }
            event = events.recv() => match event {
                Ok(event) => handle_event(&notifier, event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event stream lagged, some events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    engine.shutdown().await;
    info!("TaskHive agent shut down gracefully");
    Ok(())
}

/// Build session credentials from the agent configuration.
///
/// The device identifier defaults to a generated one when not configured.
fn session_credentials(config: &AppConfig) -> Option<SessionCredentials> {
    let token = config.agent.auth_token.clone()?;
    let user_id = config.agent.user_id.clone()?;
    let device_id = config
        .agent
        .device_id
        .clone()
        .unwrap_or_else(|| format!("agent-{}", &uuid::Uuid::new_v4().to_string()[..8]));

    Some(SessionCredentials::new(token, user_id, device_id))
}

/// React to domain events: messages become local notifications, the rest
/// is logged.
fn handle_event(notifier: &LocalNotifier, event: ClientEvent) {
    match event {
        ClientEvent::Connected => info!("Connected to realtime service"),
        ClientEvent::Disconnected { reason } => {
            info!(
                reason = reason.as_deref().unwrap_or("none"),
                "Disconnected from realtime service"
            );
        }
        ClientEvent::ConnectFailed { error } => {
            debug!(error = %error, "Connect attempt failed");
        }
        ClientEvent::PresenceChanged { user, status } => {
            debug!(user_id = %user, status = status.as_str(), "Presence update");
        }
        ClientEvent::PushRegistered { user } => {
            info!(user_id = %user, "Push token registered");
        }
        ClientEvent::MessageReceived {
            from,
            message,
            title,
            data,
        } => {
            let title = title.unwrap_or_else(|| format!("Message from {}", from));
            let mut notification = LocalNotification::new(title).with_body(message);
            if let Some(data) = data {
                notification = notification.with_data(data);
            }
            notifier.notify(notification);
        }
    }
}

/// Map SIGUSR1/SIGUSR2 to background/foreground lifecycle transitions.
fn lifecycle_signals() -> Result<mpsc::Receiver<AppLifecycleState>, AppError> {
    let (tx, rx) = mpsc::channel(8);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut background = signal(SignalKind::user_defined1())
            .map_err(|e| AppError::internal(format!("Failed to install SIGUSR1 handler: {e}")))?;
        let mut foreground = signal(SignalKind::user_defined2())
            .map_err(|e| AppError::internal(format!("Failed to install SIGUSR2 handler: {e}")))?;

        tokio::spawn(async move {
            loop {
                let state = tokio::select! {
                    _ = background.recv() => AppLifecycleState::Background,
                    _ = foreground.recv() => AppLifecycleState::Active,
                };
                info!(state = state.as_str(), "Lifecycle signal received");
                if tx.send(state).await.is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        // No lifecycle signals on this platform; hold the channel open.
        let _tx = tx;
        std::future::pending::<()>().await;
    });

    Ok(rx)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
