//! Transaction store adapter
//!
//! Read-only accessors over the fixed-schema transaction table. Filter values
//! are untrusted input and only ever reach SQLite as bound parameters. Row
//! order is insertion order (rowid), so repeated identical reads return the
//! same prefix — the top-category tie-break depends on that.

pub mod bootstrap;

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::FinsightError;
use crate::filter::{validate_limit, QuerySpec};
use crate::models::{Category, Transaction};
use crate::Result;

/// Budget for a single store read. A slow store surfaces as `Unavailable`
/// rather than hanging the request.
pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str =
    "SELECT id, date, description, amount, currency, merchant, category, city, country \
     FROM transactions";

/// Read-only access to the transaction table. The engine never writes
/// through this trait, so concurrent readers cannot conflict.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// At most `limit` rows in stable store order.
    async fn fetch(&self, limit: u32) -> Result<Vec<Transaction>>;

    /// Rows matching the spec's predicates, in stable store order.
    async fn fetch_filtered(&self, spec: &QuerySpec) -> Result<Vec<Transaction>>;
}

// =============================
// SQLite store
// =============================

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn run_read<'q>(
        &self,
        query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> Result<Vec<Transaction>> {
        let rows = tokio::time::timeout(READ_TIMEOUT, query.fetch_all(&self.pool))
            .await
            .map_err(|_| {
                FinsightError::Unavailable(format!(
                    "store read exceeded {}s budget",
                    READ_TIMEOUT.as_secs()
                ))
            })?
            .map_err(map_read_error)?;

        rows.iter().map(row_to_transaction).collect()
    }
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn fetch(&self, limit: u32) -> Result<Vec<Transaction>> {
        validate_limit(limit)?;

        let sql = format!("{} ORDER BY rowid LIMIT ?1", SELECT_COLUMNS);
        let query = sqlx::query(&sql).bind(limit as i64);
        self.run_read(query).await
    }

    async fn fetch_filtered(&self, spec: &QuerySpec) -> Result<Vec<Transaction>> {
        validate_limit(spec.limit())?;

        // Absent predicates bind as NULL and impose no constraint. instr()
        // gives substring-contains semantics without LIKE wildcard handling.
        let sql = format!(
            "{} \
             WHERE (?1 IS NULL OR instr(lower(category), lower(?1)) > 0) \
             AND (?2 IS NULL OR instr(lower(merchant), lower(?2)) > 0) \
             ORDER BY rowid LIMIT ?3",
            SELECT_COLUMNS
        );
        let query = sqlx::query(&sql)
            .bind(spec.category())
            .bind(spec.merchant())
            .bind(spec.limit() as i64);
        self.run_read(query).await
    }
}

fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
    let category: String = row.try_get("category")?;

    Ok(Transaction {
        id: row.try_get("id")?,
        date: row.try_get("date")?,
        description: row.try_get("description")?,
        amount: row.try_get("amount")?,
        currency: row.try_get("currency")?,
        merchant: row.try_get("merchant")?,
        category: Category::parse(&category),
        city: row.try_get("city")?,
        country: row.try_get("country")?,
    })
}

/// Pool-level failures are outages; everything else is an engine defect.
fn map_read_error(error: sqlx::Error) -> FinsightError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            FinsightError::Unavailable(error.to_string())
        }
        other => FinsightError::Database(other),
    }
}

// =============================
// In-memory store
// =============================

/// In-memory store with the same contract, for tests and local development.
pub struct MemoryStore {
    rows: Arc<RwLock<Vec<Transaction>>>,
}

impl MemoryStore {
    pub fn new(rows: Vec<Transaction>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn fetch(&self, limit: u32) -> Result<Vec<Transaction>> {
        validate_limit(limit)?;

        let rows = self.rows.read().await;
        Ok(rows.iter().take(limit as usize).cloned().collect())
    }

    async fn fetch_filtered(&self, spec: &QuerySpec) -> Result<Vec<Transaction>> {
        validate_limit(spec.limit())?;

        let matches = |haystack: &str, needle: Option<&str>| match needle {
            Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
            None => true,
        };

        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|tx| matches(tx.category.as_str(), spec.category()))
            .filter(|tx| matches(&tx.merchant, spec.merchant()))
            .take(spec.limit() as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    fn sample_rows() -> Vec<Transaction> {
        let tx = |i: u32, amount: f64, merchant: &str, category: Category| Transaction {
            id: format!("tx-{:04}", i),
            date: NaiveDate::from_ymd_opt(2025, 1, 1 + (i % 27) as u32).unwrap(),
            description: format!("{} purchase", merchant),
            amount,
            currency: "GBP".into(),
            merchant: merchant.into(),
            category,
            city: "London".into(),
            country: "United Kingdom".into(),
        };

        vec![
            tx(0, -12.50, "McDonald's", Category::Food),
            tx(1, -80.00, "Tesco", Category::Groceries),
            tx(2, 2100.00, "Salary ACME Ltd", Category::Income),
            tx(3, -9.99, "Netflix", Category::Entertainment),
            tx(4, -45.00, "Uber", Category::Transport),
            tx(5, -23.10, "Tesco", Category::Groceries),
        ]
    }

    async fn sqlite_store_with(rows: &[Transaction]) -> SqliteStore {
        // Single connection: every handle must see the same in-memory db.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        bootstrap::ensure_schema(&pool).await.unwrap();
        bootstrap::insert_transactions(&pool, rows).await.unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn test_fetch_respects_limit() {
        let store = sqlite_store_with(&sample_rows()).await;
        assert_eq!(store.fetch(3).await.unwrap().len(), 3);
        assert_eq!(store.fetch(100).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_fetch_rejects_out_of_range_limits() {
        let store = sqlite_store_with(&sample_rows()).await;
        assert!(matches!(
            store.fetch(0).await.unwrap_err(),
            FinsightError::InvalidArgument(_)
        ));
        assert!(matches!(
            store.fetch(crate::filter::MAX_SAMPLE_ROWS + 1).await.unwrap_err(),
            FinsightError::InvalidArgument(_)
        ));
    }

    #[tokio::test]
    async fn test_fetch_is_prefix_monotone() {
        let store = sqlite_store_with(&sample_rows()).await;
        let short = store.fetch(2).await.unwrap();
        let long = store.fetch(5).await.unwrap();
        assert_eq!(short[..], long[..2]);
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_substring() {
        let store = sqlite_store_with(&sample_rows()).await;

        let spec = QuerySpec::build(Some("groceries"), None, 50).unwrap();
        let lower = store.fetch_filtered(&spec).await.unwrap();
        assert_eq!(lower.len(), 2);

        let spec = QuerySpec::build(Some("GROC"), None, 50).unwrap();
        let upper = store.fetch_filtered(&spec).await.unwrap();
        assert_eq!(lower, upper);

        let spec = QuerySpec::build(None, Some("tesco"), 50).unwrap();
        let by_merchant = store.fetch_filtered(&spec).await.unwrap();
        assert_eq!(by_merchant.len(), 2);
    }

    #[tokio::test]
    async fn test_absent_filters_impose_no_constraint() {
        let store = sqlite_store_with(&sample_rows()).await;
        let spec = QuerySpec::build(None, None, 50).unwrap();
        assert_eq!(store.fetch_filtered(&spec).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_injection_shaped_filter_matches_nothing() {
        let store = sqlite_store_with(&sample_rows()).await;

        let spec =
            QuerySpec::build(Some("' OR '1'='1"), None, 50).unwrap();
        assert!(store.fetch_filtered(&spec).await.unwrap().is_empty());

        let spec =
            QuerySpec::build(None, Some("%'; DROP TABLE transactions; --"), 50).unwrap();
        assert!(store.fetch_filtered(&spec).await.unwrap().is_empty());

        // Table survived the attempt.
        assert_eq!(store.fetch(100).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_memory_store_matches_sqlite_semantics() {
        let rows = sample_rows();
        let sqlite = sqlite_store_with(&rows).await;
        let memory = MemoryStore::new(rows);

        let spec = QuerySpec::build(Some("Groceries"), Some("TESCO"), 10).unwrap();
        assert_eq!(
            sqlite.fetch_filtered(&spec).await.unwrap(),
            memory.fetch_filtered(&spec).await.unwrap()
        );
        assert_eq!(
            sqlite.fetch(4).await.unwrap(),
            memory.fetch(4).await.unwrap()
        );
    }
}
