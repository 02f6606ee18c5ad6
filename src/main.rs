use std::sync::Arc;

use quote_relay::api::{AppState, relay_routes};
use quote_relay::config::ServiceConfig;
use quote_relay::mail::{MailTransport, SmtpRelay};
use quote_relay::quote::{Composer, MessageIdentity};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install rustls crypto provider")?;

    // A missing .env is fine; real deployments set the variables directly.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Refusing to start without a complete configuration");
    })?;

    let transport: Arc<dyn MailTransport> = Arc::new(SmtpRelay::new(&config.smtp)?);
    let state = AppState {
        composer: Arc::new(Composer::new(MessageIdentity::from_config(&config))),
        transport,
    };
    let app = relay_routes(state, &config.allowed_origins);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        recipient = %config.recipient,
        origins = %config.allowed_origins.join(", "),
        "Quote relay configured"
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "Listening for quote requests on POST /send-email");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Quote relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
