use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use market_research_agent::llm::{LlmClient, anthropic::AnthropicProvider};
use market_research_agent::{AppState, Config, routes, telemetry::init_telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        port = config.port,
        environment = %config.environment,
        model = %config.research_model,
        "Starting market-research-agent"
    );

    let api_key = config.anthropic_api_key.as_deref().unwrap_or_else(|| {
        tracing::warn!("ANTHROPIC_API_KEY is not set, research requests will be rejected upstream");
        ""
    });
    let provider = AnthropicProvider::with_base_url(api_key, &config.anthropic_base_url);
    let server_address = provider.server_address();

    let state = AppState {
        config: config.clone(),
        llm_client: Arc::new(LlmClient::new(Arc::new(provider), server_address)),
    };

    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    telemetry_guard.shutdown();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
