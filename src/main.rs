use chargeback_webhook_api::config::Config;
use chargeback_webhook_api::http_server::{self, AppState};
use chargeback_webhook_api::logging::init_logging;
use clap::Parser;

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_logging(config.log_format, config.log_level);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), String> {
    let (local, serve) = http_server::bind(&config.host, config.port, AppState::new())
        .await
        .map_err(|e| {
            format!(
                "failed to bind HTTP server on {}:{}: {e}",
                config.host, config.port
            )
        })?;
    tracing::info!(url = %format!("http://{local}"), "server is running");

    serve.await.map_err(|e| format!("HTTP server error: {e}"))
}
