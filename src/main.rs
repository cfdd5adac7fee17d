use axum::serve;
use semantic_model_viewer::build_app;
use semantic_model_viewer::config::AppConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to keep HTTP client internals quiet
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .init();

    log::info!("Semantic Model Viewer");

    // Load configuration
    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}, tree cache ttl={}s",
        config.server.host,
        config.server.port,
        config.cache_ttl().as_secs()
    );
    if config.github_token().is_none() {
        log::warn!("No GitHub token configured, tree listing is subject to anonymous rate limits");
    }

    let app = build_app(&config)?;

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Viewer running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
