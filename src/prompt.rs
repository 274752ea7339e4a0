//! Prompt composer
//!
//! Shapes aggregated insights and a transaction sample into the two
//! fixed-purpose prompt payloads sent to the external text-generation
//! provider. Pure text assembly: composing never calls the provider, and
//! identical inputs produce byte-identical payloads.

use crate::error::FinsightError;
use crate::models::{InsightsSummary, Transaction};
use crate::Result;

/// Context rows embedded in a report prompt. Deliberate payload-size cap:
/// the provider is billed per token and the stats already summarize the rest.
pub const REPORT_CONTEXT_ROWS: usize = 10;

/// Context rows embedded in a question prompt.
pub const QUESTION_CONTEXT_ROWS: usize = 30;

/// Assembled prompt text for one provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPayload {
    pub text: String,
}

/// Build the financial-report prompt from computed insights plus a bounded
/// transaction sample for grounding.
pub fn compose_report_prompt(
    summary: &InsightsSummary,
    sample_for_context: &[Transaction],
    max_sample_size: usize,
) -> Result<PromptPayload> {
    let stats = serde_json::to_string(summary)?;
    let rows = serialize_context(sample_for_context, max_sample_size)?;

    let text = format!(
        "Write a clear, concise financial report based on these stats and transactions.\n\
         Stats: {}\n\
         Transactions (sample): {}\n\
         The report should sound like a financial summary, around 150 words.",
        stats, rows
    );

    Ok(PromptPayload { text })
}

/// Build the free-form question prompt over a bounded transaction sample.
///
/// Fails with `InvalidArgument` when `question` is empty or whitespace-only;
/// the question text appears in the payload exactly once.
pub fn compose_question_prompt(
    question: &str,
    sample_for_context: &[Transaction],
    max_sample_size: usize,
) -> Result<PromptPayload> {
    let question = question.trim();
    if question.is_empty() {
        return Err(FinsightError::InvalidArgument(
            "question must not be empty".to_string(),
        ));
    }

    let rows = serialize_context(sample_for_context, max_sample_size)?;

    let text = format!(
        "Based on this transaction dataset: {},\n\
         answer the following question briefly and accurately:\n{}",
        rows, question
    );

    Ok(PromptPayload { text })
}

/// Serialize at most `max_sample_size` rows, in sample order. Struct fields
/// serialize in declaration order, so the output is reproducible.
fn serialize_context(sample: &[Transaction], max_sample_size: usize) -> Result<String> {
    let bounded = &sample[..sample.len().min(max_sample_size)];
    Ok(serde_json::to_string(bounded)?)
}
