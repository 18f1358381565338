use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use clap::Parser;
use currency_bot::config::{Cli, Settings};
use currency_bot::error::BotError;
use currency_bot::server::{build_router, serve, AppState};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), BotError> {
    // logger
    let subscriber = FmtSubscriber::builder().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    let settings = match Settings::load(&cli) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return Err(e);
        }
    };
    let port = settings.port.ok_or(BotError::MissingPort)?;
    let addr: SocketAddr = format!("{}:{}", settings.host, port)
        .parse()
        .map_err(|e| BotError::InvalidSetting(format!("listen address: {e}")))?;

    let state = Arc::new(AppState::from_settings(&settings)?);
    let app = build_router(state);
    let listener = TcpListener::bind(addr)?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received; shutting down…");
        }
        signal.cancel();
    });

    serve(listener, app, shutdown).await
}
