use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, health_check, init_pool};
use occupancy::{
    config::{AppConfig, StoreBackend},
    display::DisplayZone,
    ledger::OccupancyLedger,
    routes, seed,
    state::AppState,
    store::{MemoryOccupancyStore, OccupancyStore, PgOccupancyStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting occupancy service");

    let config = AppConfig::load()?;
    let display_zone = config.display_zone()?;

    match config.store {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            let store = PgOccupancyStore::new(pool, config.lock_timeout());
            store.migrate().await?;
            serve(store, &config, display_zone).await
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, occupancy is lost on restart");
            let store = MemoryOccupancyStore::new(config.lock_timeout());
            serve(store, &config, display_zone).await
        }
    }
}

async fn serve<S>(store: S, config: &AppConfig, display_zone: DisplayZone) -> Result<()>
where
    S: OccupancyStore + Clone + 'static,
{
    let ledger = OccupancyLedger::new(store);

    if config.seed_on_start {
        ledger.seed(&seed::known_buildings()).await?;
    }

    info!("Rendering timestamps at UTC offset {}", display_zone);
    let app = routes::create_router(AppState::new(ledger, display_zone));

    let listener = TcpListener::bind(config.bind_address.as_str()).await?;
    info!("Occupancy service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
