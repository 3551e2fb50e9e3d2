use std::sync::Arc;

use tokio::io::{self, BufReader};
use tracing::{info, warn};
use trips::commands::{self, Console};
use trips::config::AppConfig;
use trips::error::AppError;
use trips::services::{city_codes::CityCodeTable, fares::FareClient, storage::StorageService};
use trips::state::Session;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    if config.fare_api_token.trim().is_empty() {
        warn!("FARE_API_TOKEN is not set, ticket prices will not be available");
    }

    let cities = CityCodeTable::load_or_bundled(config.city_codes_file.as_deref()).await;
    let fares = FareClient::from_config(&config, cities)?;
    let storage = StorageService::new(config.trips_file.clone());
    info!(trips_file = %config.trips_file.display(), "session started");

    let mut session = Session::new(storage, Arc::new(fares));
    let mut console = Console::new(BufReader::new(io::stdin()), io::stdout());
    commands::run(&mut session, &mut console).await
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn,trips=info".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
