//! Insights aggregator
//!
//! Pure summary statistics over a bounded transaction sample. Every request
//! recomputes from a fresh sample; nothing here is cached or shared.

use std::collections::HashMap;

use crate::error::FinsightError;
use crate::models::{Category, InsightsSummary, Transaction};
use crate::Result;

/// Compute summary statistics and the narrative summary for `sample`.
///
/// Zero-amount rows count toward `total_transactions` and the category
/// ranking, but belong to neither the income nor the expense partition.
///
/// Fails with `EmptySample` on an empty sample and `NoExpenses` when the
/// expense partition is empty (an undefined mean is an error here, never a
/// silent NaN).
pub fn compute(sample: &[Transaction]) -> Result<InsightsSummary> {
    if sample.is_empty() {
        return Err(FinsightError::EmptySample);
    }

    let total_income: f64 = sample
        .iter()
        .filter(|tx| tx.is_income())
        .map(|tx| tx.amount)
        .sum();

    let expenses: Vec<f64> = sample
        .iter()
        .filter(|tx| tx.is_expense())
        .map(|tx| tx.amount)
        .collect();

    if expenses.is_empty() {
        return Err(FinsightError::NoExpenses);
    }

    let total_spent: f64 = expenses.iter().sum();
    let average_expense = total_spent / expenses.len() as f64;

    let top_category = top_category(sample);

    let total_income = round2(total_income);
    let total_spent = round2(total_spent);
    let average_expense = round2(average_expense);

    let summary = format!(
        "Your top spending category is {}. \
         You spent an average of {:.2} € per transaction. \
         Total spent: {:.2} €, total income: {:.2} €.",
        top_category,
        average_expense.abs(),
        total_spent.abs(),
        total_income,
    );

    Ok(InsightsSummary {
        total_transactions: sample.len(),
        total_income,
        total_spent,
        average_expense,
        top_category,
        summary,
    })
}

/// Category with the highest occurrence count; ties break toward the
/// category whose first occurrence appears earliest in sample order, which
/// is stable because store reads are.
fn top_category(sample: &[Transaction]) -> Category {
    let mut counts: HashMap<Category, (usize, usize)> = HashMap::new();

    for (index, tx) in sample.iter().enumerate() {
        let entry = counts.entry(tx.category).or_insert((0, index));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .min_by_key(|(_, (count, first_seen))| (std::cmp::Reverse(*count), *first_seen))
        .map(|(category, _)| category)
        .unwrap_or(Category::Other)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
