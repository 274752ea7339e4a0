//! Store bootstrap
//!
//! Creates the transaction table and bulk-loads it from the delimited dataset
//! file. Schema mismatches fail loudly here, before the engine is exposed.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

use crate::error::FinsightError;
use crate::models::Transaction;
use crate::Result;

/// Exact column set of the transaction table, in file order.
pub const EXPECTED_COLUMNS: [&str; 9] = [
    "id",
    "date",
    "description",
    "amount",
    "currency",
    "merchant",
    "category",
    "city",
    "country",
];

const CREATE_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS transactions (\
      id TEXT PRIMARY KEY,\
      date TEXT NOT NULL,\
      description TEXT NOT NULL,\
      amount REAL NOT NULL,\
      currency TEXT NOT NULL,\
      merchant TEXT NOT NULL,\
      category TEXT NOT NULL,\
      city TEXT NOT NULL,\
      country TEXT NOT NULL\
    )";

/// Open (creating if missing) the SQLite database at `path`.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_TABLE).execute(pool).await?;
    Ok(())
}

pub async fn is_seeded(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

/// Load the dataset file into the transaction table.
///
/// The header row must match [`EXPECTED_COLUMNS`] exactly; anything else is
/// a schema mismatch and fails with `InvalidArgument` before a single row is
/// written.
pub async fn seed_from_csv(pool: &SqlitePool, path: &Path) -> Result<u64> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        FinsightError::InvalidArgument(format!(
            "cannot open dataset file {}: {}",
            path.display(),
            e
        ))
    })?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers != EXPECTED_COLUMNS {
        return Err(FinsightError::InvalidArgument(format!(
            "dataset schema mismatch: expected columns {:?}, found {:?}",
            EXPECTED_COLUMNS, headers
        )));
    }

    let mut rows = Vec::new();
    for record in reader.deserialize::<Transaction>() {
        rows.push(record?);
    }

    ensure_schema(pool).await?;
    insert_transactions(pool, &rows).await?;

    Ok(rows.len() as u64)
}

/// Seed only when the table is empty; re-running is a no-op.
pub async fn seed_if_empty(pool: &SqlitePool, path: &Path) -> Result<u64> {
    ensure_schema(pool).await?;
    if is_seeded(pool).await? {
        return Ok(0);
    }
    seed_from_csv(pool, path).await
}

/// Transactional bulk insert with bound parameters.
pub async fn insert_transactions(pool: &SqlitePool, rows: &[Transaction]) -> Result<()> {
    let mut tx = pool.begin().await?;

    for row in rows {
        sqlx::query(
            "INSERT INTO transactions \
               (id, date, description, amount, currency, merchant, category, city, country) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&row.id)
        .bind(row.date)
        .bind(&row.description)
        .bind(row.amount)
        .bind(&row.currency)
        .bind(&row.merchant)
        .bind(row.category.as_str())
        .bind(&row.city)
        .bind(&row.country)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
