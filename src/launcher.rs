//! Startup launcher
//!
//! Explicit startup state machine for the demo stack:
//! Unseeded → Seeded → ApiUp → UiUp. Every transition is idempotent, so
//! re-running the launcher against an already-prepared environment is a
//! sequence of no-ops rather than a duplicate seeding pass.

use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::info;

use crate::dataset;
use crate::store::bootstrap;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LaunchStage {
    /// No dataset file and/or an empty transaction table.
    Unseeded,
    /// Dataset generated and loaded into the store.
    Seeded,
    /// API server bound and serving.
    ApiUp,
    /// External dashboard attached. Observable, driven from outside.
    UiUp,
}

impl LaunchStage {
    pub fn next(self) -> Option<LaunchStage> {
        match self {
            LaunchStage::Unseeded => Some(LaunchStage::Seeded),
            LaunchStage::Seeded => Some(LaunchStage::ApiUp),
            LaunchStage::ApiUp => Some(LaunchStage::UiUp),
            LaunchStage::UiUp => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LaunchStage::Unseeded => "unseeded",
            LaunchStage::Seeded => "seeded",
            LaunchStage::ApiUp => "api_up",
            LaunchStage::UiUp => "ui_up",
        }
    }
}

impl std::fmt::Display for LaunchStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Launcher {
    dataset_path: PathBuf,
    db_path: PathBuf,
    dataset_rows: usize,
    seed: u64,
    stage: LaunchStage,
}

impl Launcher {
    pub fn new(dataset_path: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            db_path: db_path.into(),
            dataset_rows: dataset::DEFAULT_ROWS,
            seed: dataset::DEFAULT_SEED,
            stage: LaunchStage::Unseeded,
        }
    }

    pub fn with_dataset_rows(mut self, rows: usize) -> Self {
        self.dataset_rows = rows;
        self
    }

    pub fn stage(&self) -> LaunchStage {
        self.stage
    }

    /// Drive Unseeded → Seeded: generate the dataset file if missing, open
    /// the store, load it if empty. Safe to call again at any later stage.
    pub async fn ensure_seeded(&mut self) -> Result<SqlitePool> {
        if self.dataset_path.exists() {
            info!("Dataset already exists: {}", self.dataset_path.display());
        } else {
            let written =
                dataset::generate_to_csv(&self.dataset_path, self.dataset_rows, self.seed)?;
            info!(
                "Generated {} synthetic transactions -> {}",
                written,
                self.dataset_path.display()
            );
        }

        let pool = bootstrap::connect(&self.db_path).await?;
        let loaded = bootstrap::seed_if_empty(&pool, &self.dataset_path).await?;
        if loaded > 0 {
            info!("Seeded transaction store with {} rows", loaded);
        } else {
            info!("Transaction store already seeded");
        }

        self.advance(LaunchStage::Seeded);
        Ok(pool)
    }

    /// Seeded → ApiUp, recorded when the server socket is bound.
    pub fn mark_api_up(&mut self) {
        self.advance(LaunchStage::ApiUp);
    }

    /// ApiUp → UiUp, recorded when the external dashboard attaches.
    pub fn mark_ui_up(&mut self) {
        self.advance(LaunchStage::UiUp);
    }

    /// Monotonic, idempotent transition. Moving to the current or an earlier
    /// stage is a no-op.
    fn advance(&mut self, to: LaunchStage) {
        if self.stage >= to {
            return;
        }
        info!("Launch stage: {} -> {}", self.stage, to);
        self.stage = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert!(LaunchStage::Unseeded < LaunchStage::Seeded);
        assert!(LaunchStage::Seeded < LaunchStage::ApiUp);
        assert!(LaunchStage::ApiUp < LaunchStage::UiUp);
    }

    #[test]
    fn test_stage_chain() {
        let mut stage = LaunchStage::Unseeded;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            stage = next;
            seen.push(stage);
        }
        assert_eq!(
            seen,
            [
                LaunchStage::Unseeded,
                LaunchStage::Seeded,
                LaunchStage::ApiUp,
                LaunchStage::UiUp
            ]
        );
    }

    #[test]
    fn test_transitions_are_monotonic() {
        let mut launcher = Launcher::new("data/tx.csv", "data/tx.db");
        launcher.mark_api_up();
        assert_eq!(launcher.stage(), LaunchStage::ApiUp);

        // Re-marking or marking an earlier stage changes nothing.
        launcher.mark_api_up();
        launcher.advance(LaunchStage::Seeded);
        assert_eq!(launcher.stage(), LaunchStage::ApiUp);

        launcher.mark_ui_up();
        assert_eq!(launcher.stage(), LaunchStage::UiUp);
    }

    #[tokio::test]
    async fn test_ensure_seeded_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("transactions.csv");
        let db_path = dir.path().join("finsight.db");

        let mut launcher = Launcher::new(&csv_path, &db_path).with_dataset_rows(25);

        let pool = launcher.ensure_seeded().await.unwrap();
        assert_eq!(launcher.stage(), LaunchStage::Seeded);
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 25);
        pool.close().await;

        // Second run: dataset and store both exist, nothing is re-seeded.
        let pool = launcher.ensure_seeded().await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 25);
    }
}
