//! Shared data structures for asntrace.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// 1-based position of a hop along the path.
pub type HopIndex = u32;

/// Address family restriction for the trace.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AddressFamily {
    #[default]
    Any,
    V4,
    V6,
}

impl AddressFamily {
    pub fn matches(self, address: &IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4 => address.is_ipv4(),
            AddressFamily::V6 => address.is_ipv6(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HopRecord {
    pub index: HopIndex,
    pub address: String,
    pub hostname: Option<String>,
    pub latency_sum_us: u64,
    pub rounds: u32,
}

impl HopRecord {
    pub fn new(index: HopIndex, address: impl Into<String>, rounds: u32) -> Self {
        Self {
            index,
            address: address.into(),
            hostname: None,
            latency_sum_us: 0,
            rounds,
        }
    }

    /// Average latency in milliseconds.
    ///
    /// The sum is always divided by the configured round count, even when
    /// fewer replies arrived for this hop.
    pub fn avg_latency_ms(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        self.latency_sum_us as f64 / f64::from(self.rounds) / 1000.0
    }

    /// `hostname (address)` when a reverse lookup succeeded, else the address.
    pub fn display_name(&self) -> String {
        match &self.hostname {
            Some(hostname) => format!("{hostname} ({})", self.address),
            None => self.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsOwner {
    pub asn: u32,
    pub name: String,
    pub route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AsInfo {
    Resolved(AsOwner),
    Private,
    NoData,
}

/// Compact AS identity used by the path summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathEntry {
    pub asn: u32,
    pub label: String,
}

impl PathEntry {
    /// Builds an entry from an owner, keeping the first comma-delimited token
    /// of the AS name ("GOOGLE, US" becomes "GOOGLE").
    pub fn from_owner(owner: &AsOwner) -> Self {
        let label = owner
            .name
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        Self {
            asn: owner.asn,
            label,
        }
    }
}

impl fmt::Display for PathEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AS{} [{}]", self.asn, self.label)
    }
}

/// One displayed row of the hop table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HopSlot<'a> {
    Reply(&'a HopRecord),
    NoReply(HopIndex),
}

impl HopSlot<'_> {
    pub fn index(&self) -> HopIndex {
        match self {
            HopSlot::Reply(record) => record.index,
            HopSlot::NoReply(index) => *index,
        }
    }
}

/// Finalized per-trace hop records keyed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HopTable {
    records: BTreeMap<HopIndex, HopRecord>,
    max_index: HopIndex,
}

impl HopTable {
    pub fn new(records: BTreeMap<HopIndex, HopRecord>) -> Self {
        let max_index = records.keys().next_back().copied().unwrap_or(0);
        Self { records, max_index }
    }

    pub fn max_index(&self) -> HopIndex {
        self.max_index
    }

    pub fn get(&self, index: HopIndex) -> Option<&HopRecord> {
        self.records.get(&index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Walks `1..=max_index`, synthesizing `NoReply` slots for gaps. The walk
    /// ends right after the first reply whose parsed address equals
    /// `terminal_address`, whatever textual form the probe printed.
    pub fn walk(&self, terminal_address: Option<IpAddr>) -> Vec<HopSlot<'_>> {
        let mut slots = Vec::with_capacity(self.max_index as usize);
        for index in 1..=self.max_index {
            match self.records.get(&index) {
                Some(record) => {
                    slots.push(HopSlot::Reply(record));
                    let reached = terminal_address.is_some_and(|terminal| {
                        record.address.parse::<IpAddr>().ok() == Some(terminal)
                    });
                    if reached {
                        break;
                    }
                }
                None => slots.push(HopSlot::NoReply(index)),
            }
        }
        slots
    }
}

/// A hop row after ownership resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRow {
    Reply { record: HopRecord, owner: AsInfo },
    NoReply { index: HopIndex },
}

impl ReportRow {
    pub fn index(&self) -> HopIndex {
        match self {
            ReportRow::Reply { record, .. } => record.index,
            ReportRow::NoReply { index } => *index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceReport {
    pub version: u32,
    pub target: String,
    pub address: String,
    pub target_owner: AsInfo,
    pub timestamp_utc: String,
    pub path: Vec<PathEntry>,
    pub hops: Vec<ReportRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: HopIndex, address: &str) -> HopRecord {
        HopRecord::new(index, address, 3)
    }

    fn table(records: Vec<HopRecord>) -> HopTable {
        HopTable::new(records.into_iter().map(|r| (r.index, r)).collect())
    }

    #[test]
    fn average_uses_fixed_round_count() {
        let mut hop = record(1, "10.0.0.1");
        hop.latency_sum_us = 10_000 + 20_000 + 30_000;
        assert!((hop.avg_latency_ms() - 20.0).abs() < 1e-9);

        let mut short = record(2, "10.0.0.2");
        short.latency_sum_us = 30_000;
        assert!((short.avg_latency_ms() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn family_filters_addresses() {
        let v4: IpAddr = "192.0.2.1".parse().unwrap();
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(AddressFamily::Any.matches(&v4) && AddressFamily::Any.matches(&v6));
        assert!(AddressFamily::V4.matches(&v4) && !AddressFamily::V4.matches(&v6));
        assert!(AddressFamily::V6.matches(&v6) && !AddressFamily::V6.matches(&v4));
    }

    #[test]
    fn zero_rounds_average_is_zero() {
        let mut hop = HopRecord::new(1, "10.0.0.1", 0);
        hop.latency_sum_us = 500;
        assert_eq!(hop.avg_latency_ms(), 0.0);
    }

    #[test]
    fn display_name_prefers_hostname() {
        let mut hop = record(1, "8.8.8.8");
        assert_eq!(hop.display_name(), "8.8.8.8");
        hop.hostname = Some("dns.google".to_string());
        assert_eq!(hop.display_name(), "dns.google (8.8.8.8)");
    }

    #[test]
    fn walk_fills_gaps_in_order() {
        let table = table(vec![record(1, "a"), record(3, "c"), record(5, "e")]);
        let indices: Vec<HopIndex> = table.walk(None).iter().map(HopSlot::index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(matches!(table.walk(None)[1], HopSlot::NoReply(2)));
        assert!(matches!(table.walk(None)[3], HopSlot::NoReply(4)));
    }

    #[test]
    fn walk_stops_at_terminal_address() {
        let table = table(vec![
            record(1, "10.0.0.1"),
            record(2, "192.0.2.9"),
            record(3, "192.0.2.9"),
            record(4, "198.51.100.1"),
        ]);
        let slots = table.walk("192.0.2.9".parse().ok());
        assert_eq!(slots.len(), 2);
        assert_eq!(slots.last().map(HopSlot::index), Some(2));
    }

    #[test]
    fn walk_matches_terminal_across_ipv6_spellings() {
        let table = table(vec![
            record(1, "fe80::1"),
            record(2, "2001:db8:0:0:0:0:0:1"),
            record(3, "2001:db8::99"),
        ]);
        let slots = table.walk("2001:DB8::1".parse().ok());
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn empty_table_walks_nothing() {
        let table = HopTable::default();
        assert_eq!(table.max_index(), 0);
        assert!(table.walk("192.0.2.9".parse().ok()).is_empty());
    }

    #[test]
    fn path_entry_keeps_first_name_token() {
        let owner = AsOwner {
            asn: 15169,
            name: "GOOGLE, US".to_string(),
            route: "8.8.8.0/24".to_string(),
        };
        let entry = PathEntry::from_owner(&owner);
        assert_eq!(entry.label, "GOOGLE");
        assert_eq!(entry.to_string(), "AS15169 [GOOGLE]");
    }

    #[test]
    fn report_json_is_tagged() {
        let row = ReportRow::Reply {
            record: record(1, "192.168.1.1"),
            owner: AsInfo::Private,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["kind"], "reply");
        assert_eq!(json["owner"]["status"], "private");

        let gap = serde_json::to_value(ReportRow::NoReply { index: 2 }).unwrap();
        assert_eq!(gap["kind"], "no_reply");
        assert_eq!(gap["index"], 2);
    }
}
