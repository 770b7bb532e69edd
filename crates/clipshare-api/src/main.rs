use clipshare_api::setup;
use clipshare_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    clipshare_api::init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Initialize the application (record store, storage, services, routes)
    let (state, router) = setup::initialize_app(config.clone()).await?;

    // In-process sweep ticker, only when configured
    let sweeper = setup::sweeper::spawn_sweeper(&config, state.clone());

    setup::server::start_server(&config, router).await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}
