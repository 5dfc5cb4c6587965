use tracing_subscriber::EnvFilter;
use tunefinder_api::{
    api::{create_router, AppState},
    config::Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tunefinder_api=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        llm_api_url = %config.llm_api_url,
        llm_model = %config.llm_model,
        enrich_track_details = config.enrich_track_details,
        "Configuration loaded"
    );

    // Initialize application state
    let state = AppState::from_config(&config);

    // Create the router with all routes
    let app = create_router(state);

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
