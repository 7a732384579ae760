use asntrace_lookup::{enrich_table, Enricher, OwnerLookup};
use asntrace_model::{AsInfo, HopTable, PathEntry, ReportRow, TraceReport};
use asntrace_path::build_as_path;
use chrono::{SecondsFormat, Utc};
use std::net::IpAddr;

/// Resolved rows and the AS path derived from them.
pub struct TraceOutcome {
    pub rows: Vec<ReportRow>,
    pub path: Vec<PathEntry>,
}

pub fn resolve_trace<L: OwnerLookup + ?Sized>(
    table: &HopTable,
    enricher: &Enricher<'_, L>,
    target: IpAddr,
) -> TraceOutcome {
    let rows = enrich_table(table, enricher, target);
    let path = build_as_path(&rows);
    TraceOutcome { rows, path }
}

pub fn build_report(
    target: &str,
    address: IpAddr,
    target_owner: AsInfo,
    outcome: Option<TraceOutcome>,
) -> TraceReport {
    let (path, hops) = match outcome {
        Some(outcome) => (outcome.path, outcome.rows),
        None => (Vec::new(), Vec::new()),
    };
    TraceReport {
        version: 1,
        target: target.to_string(),
        address: address.to_string(),
        target_owner,
        timestamp_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        path,
        hops,
    }
}
