use tracing::info;
use voice_agent::startup;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting voice agent");

    // Load configuration
    let config = startup::load_config()?;

    // Serve requests until shutdown
    startup::start_server(config).await
}
