use clap::Parser;
use plantid_bot::{BotArgs, BotError, PlantIdBot, StoreError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine, the environment may already be set.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BotArgs::parse().into_config()?;
    info!("Starting plant identification bot for {}", config.community);

    let bot = PlantIdBot::from_config(config).map_err(|e| {
        error!("Startup failed: {}", e);
        if matches!(e, BotError::Store(StoreError::Corrupt { .. })) {
            error!("  Repair or remove the processed-post file before restarting");
        }
        e
    })?;

    bot.run().await?;
    Ok(())
}
