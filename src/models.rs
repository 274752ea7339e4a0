//! Core data models for the transaction insights engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//
// ================= Category =================
//

/// Fixed spending category vocabulary.
///
/// Unknown labels coming out of the store parse to `Other` rather than
/// failing the row; the bootstrap validates the schema loudly up front.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Groceries,
    Transport,
    Shopping,
    Entertainment,
    Utilities,
    Health,
    Travel,
    Income,
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Groceries,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::Utilities,
        Category::Health,
        Category::Travel,
        Category::Income,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Groceries => "Groceries",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Health => "Health",
            Category::Travel => "Travel",
            Category::Income => "Income",
            Category::Other => "Other",
        }
    }

    /// Total, case-insensitive parse. Anything outside the vocabulary is `Other`.
    pub fn parse(label: &str) -> Category {
        match label.trim().to_lowercase().as_str() {
            "food" => Category::Food,
            "groceries" => Category::Groceries,
            "transport" => Category::Transport,
            "shopping" => Category::Shopping,
            "entertainment" => Category::Entertainment,
            "utilities" => Category::Utilities,
            "health" => Category::Health,
            "travel" => Category::Travel,
            "income" => Category::Income,
            _ => Category::Other,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Transaction =================
//

/// One row of the transaction store.
///
/// Negative `amount` = expense, positive = income. Field order is the wire
/// order: serde serializes in declaration order, which keeps JSON payloads
/// reproducible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    /// Not normalized across rows; aggregation treats amounts as currency-agnostic.
    pub currency: String,
    pub merchant: String,
    pub category: Category,
    pub city: String,
    pub country: String,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }
}

//
// ================= InsightsSummary =================
//

/// Aggregate statistics over a bounded transaction sample.
///
/// Ephemeral value object: recomputed on every request, never persisted.
/// Monetary fields are rounded to two decimals; `total_spent` retains its sign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightsSummary {
    pub total_transactions: usize,
    pub total_income: f64,
    pub total_spent: f64,
    pub average_expense: f64,
    pub top_category: Category,
    pub summary: String,
}
