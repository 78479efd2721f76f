use satbot_service::config::SatbotConfig;
use satbot_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = SatbotConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "satbot-service",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    match &config.env_file {
        Some(path) => tracing::info!(path = %path.display(), "Environment variables loaded from file"),
        None => tracing::warn!("No env file found, using process environment only"),
    }
    for error in &config.env_file_skipped {
        tracing::warn!(error = %error, "Skipped malformed line in env file");
    }

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
