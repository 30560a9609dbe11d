//! Plan-description rendering
//!
//! The store never executes an estimate query; it renders the plan it would
//! use, with the row estimate taken from maintained statistics. The format
//! is free text and engine-specific, which is exactly why consumers must
//! treat parsing it as an isolated strategy.

/// One-line plan description for a prefix scan.
pub(crate) fn render_prefix_scan(table_name: &str, rows: u64) -> String {
    // Cost figures are synthetic: a fixed startup cost plus a per-row term,
    // in the shape operators expect from an EXPLAIN line.
    let total_cost = 0.42 + rows as f64 * 0.03;
    format!("Index Only Scan using {table_name}  (cost=0.42..{total_cost:.2} rows={rows} width=8)")
}
