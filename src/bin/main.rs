use finsight::{
    api::start_server,
    launcher::Launcher,
    store::SqliteStore,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let dataset_path = std::env::var("FINSIGHT_DATASET")
        .unwrap_or_else(|_| "data/synthetic_transactions.csv".to_string());
    let db_path =
        std::env::var("FINSIGHT_DB").unwrap_or_else(|_| "data/finsight.db".to_string());
    let dataset_rows: usize = std::env::var("FINSIGHT_DATASET_ROWS")
        .unwrap_or_else(|_| "1000".to_string())
        .parse()?;

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8000".to_string())
        .parse()?;

    info!("🚀 Finsight demo launcher");
    info!("📍 Port: {}", api_port);

    // Unseeded -> Seeded: dataset file + store, both idempotent
    let mut launcher = Launcher::new(dataset_path, db_path).with_dataset_rows(dataset_rows);
    let pool = launcher.ensure_seeded().await?;

    let store = Arc::new(SqliteStore::new(pool));

    // Seeded -> ApiUp. UiUp is the external dashboard's transition.
    launcher.mark_api_up();
    info!("✅ Store ready (stage: {})", launcher.stage());
    info!("📡 Starting API server...");

    start_server(store, api_port).await?;

    Ok(())
}
