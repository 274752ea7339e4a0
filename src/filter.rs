//! Filter engine
//!
//! Translates optional, untrusted filter input into a validated `QuerySpec`
//! the store adapter can execute with bound parameters. Never produces a raw
//! query string.

use crate::error::FinsightError;
use crate::Result;

/// Hard ceiling on rows any single store read may return. The insights
/// window is the largest sample the engine ever asks for.
pub const MAX_SAMPLE_ROWS: u32 = 1_000;

/// Opaque description of a bounded, optionally-filtered retrieval.
///
/// Both this layer and the store adapter validate the limit; the filter
/// values here are predicates, not query fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    category: Option<String>,
    merchant: Option<String>,
    limit: u32,
}

impl QuerySpec {
    /// Build a validated spec from untrusted input.
    ///
    /// Empty or whitespace-only filter strings normalize to absent: an empty
    /// substring pattern matches every row, so explicit-empty and omitted
    /// must mean the same thing.
    pub fn build(
        category: Option<&str>,
        merchant: Option<&str>,
        limit: u32,
    ) -> Result<Self> {
        validate_limit(limit)?;

        Ok(Self {
            category: normalize(category),
            merchant: normalize(merchant),
            limit,
        })
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref()
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Limit clamp shared with the store adapter (both layers validate).
pub fn validate_limit(limit: u32) -> Result<()> {
    if limit == 0 || limit > MAX_SAMPLE_ROWS {
        return Err(FinsightError::InvalidArgument(format!(
            "limit must be between 1 and {}, got {}",
            MAX_SAMPLE_ROWS, limit
        )));
    }
    Ok(())
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
