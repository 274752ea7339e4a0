//! Finsight — Transaction Query & Insights Engine
//!
//! Exposes a financial-transactions dataset through bounded queries,
//! filtered queries, and summary statistics, and feeds the results into
//! prompts for an external text-generation provider:
//! - Store adapter over a fixed-schema SQLite table (read-only, bound params)
//! - Filter engine turning untrusted predicates into safe query specs
//! - Insights aggregator (totals, averages, top category, narrative summary)
//! - Prompt composer for the AI report / AI question endpoints
//!
//! REQUEST FLOW:
//! STORE READ → FILTER → AGGREGATE → COMPOSE PROMPT → PROVIDER (external)

pub mod api;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod insights;
pub mod launcher;
pub mod models;
pub mod openai;
pub mod prompt;
pub mod store;

pub use error::Result;

// Re-export common types
pub use filter::QuerySpec;
pub use models::{Category, InsightsSummary, Transaction};
