//! Approximate dataset sizing.
//!
//! The cheap path asks the store's planner for a row estimate instead of
//! executing a count. Plan output is free text and engine-specific, so the
//! parse lives behind [`ApproximateCount`] as one concrete, replaceable
//! strategy; an unparseable plan yields `None`, never an error.

use crate::error::Result;
use snapsync_store::{Table, Transaction};

/// Below this estimated row count the exact count is taken instead: it is
/// cheap at that scale and more accurate.
pub const APPROXIMATE_COUNT_THRESHOLD: u64 = 1_000_000;

/// Strategy for obtaining an approximate row count for a prefix scan
/// without executing it.
pub trait ApproximateCount: Send + Sync {
    fn approximate_count(
        &self,
        txn: &Transaction<'_>,
        index: &Table,
        prefix: &[u8],
    ) -> Result<Option<u64>>;
}

/// Parses the row estimate out of the store's plan description line.
pub struct PlanRowEstimate;

impl ApproximateCount for PlanRowEstimate {
    fn approximate_count(
        &self,
        txn: &Transaction<'_>,
        index: &Table,
        prefix: &[u8],
    ) -> Result<Option<u64>> {
        let plan = txn.explain_prefix_scan(index, prefix)?;
        Ok(parse_rows(&plan))
    }
}

/// Extract `rows=N` from a plan line; `None` when the text does not carry a
/// parseable estimate.
fn parse_rows(plan: &str) -> Option<u64> {
    let start = plan.find("rows=")? + "rows=".len();
    let digits: String = plan[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
