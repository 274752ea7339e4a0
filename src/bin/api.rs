use finsight::{
    api::start_server,
    store::{bootstrap, SqliteStore},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

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

    let db_path =
        std::env::var("FINSIGHT_DB").unwrap_or_else(|_| "data/finsight.db".to_string());

    let api_port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("API_PORT"))
        .unwrap_or_else(|_| "8000".to_string())
        .parse()?;

    info!("🚀 Finsight API server");
    info!("📍 Port: {}", api_port);

    let pool = bootstrap::connect(Path::new(&db_path)).await?;
    bootstrap::ensure_schema(&pool).await?;
    if !bootstrap::is_seeded(&pool).await? {
        warn!(
            "Transaction store at {} is empty; run the `finsight` launcher to seed it",
            db_path
        );
    }

    let store = Arc::new(SqliteStore::new(pool));

    info!("✅ Store connected");
    info!("📡 Starting API server...");

    start_server(store, api_port).await?;

    Ok(())
}
