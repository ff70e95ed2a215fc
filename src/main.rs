use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use travel_service::{Application, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,travel_service=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
