//! Baleka scheduled jobs
//!
//! Activates every pending event whose start date has arrived, then exits.
//! Intended to be run periodically by an external scheduler.

use anyhow::Context;
use tracing::{error, info};

use baleka::{
    config::Settings,
    database::{connection::{create_pool, run_migrations}, DatabaseService, PgStore},
    utils::{helpers::now, logging},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load settings")?;
    settings.validate()?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", baleka::info());

    info!("Connecting to database...");
    let pool = create_pool(&settings.database).await?;
    run_migrations(&pool).await?;

    let mut database = DatabaseService::new(PgStore::new(pool))
        .with_min_password_length(settings.athletes.min_password_length);

    match database.events.process_events(now()).await {
        Ok(activated) => {
            info!(activated = activated, "Event processing finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, severity = ?e.severity(), "Event processing failed");
            Err(e.into())
        }
    }
}
