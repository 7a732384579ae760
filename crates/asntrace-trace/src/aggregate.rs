use crate::parser::ProbeEvent;
use asntrace_lookup::HostnameLookup;
use asntrace_model::{HopIndex, HopRecord, HopTable};
use std::collections::BTreeMap;
use std::net::IpAddr;
use tracing::debug;

/// Builds per-hop records from probe events while the stream is live.
///
/// Events are handled one at a time; a reverse lookup blocks the next read.
/// Lookups go through a single-slot cache holding the most recently seen
/// address, so a run of identical host events costs one lookup.
pub struct HopAggregator<'a, H: ?Sized> {
    rounds: u32,
    hostnames: &'a H,
    records: BTreeMap<HopIndex, HopRecord>,
    early_latency: BTreeMap<HopIndex, u64>,
    last_seen: Option<(String, Option<String>)>,
}

impl<'a, H: HostnameLookup + ?Sized> HopAggregator<'a, H> {
    pub fn new(rounds: u32, hostnames: &'a H) -> Self {
        Self {
            rounds,
            hostnames,
            records: BTreeMap::new(),
            early_latency: BTreeMap::new(),
            last_seen: None,
        }
    }

    pub fn push(&mut self, event: ProbeEvent) {
        match event {
            ProbeEvent::Host { hop, address } => self.on_host(hop, address),
            ProbeEvent::Latency { hop, micros } => self.on_latency(hop, micros),
        }
    }

    fn on_host(&mut self, hop: HopIndex, address: String) {
        if let Some(record) = self.records.get(&hop) {
            if record.address == address {
                return;
            }
        }

        let hostname = self.hostname_for(&address);
        match self.records.get_mut(&hop) {
            Some(record) => {
                debug!(hop, old = %record.address, new = %address, "hop address changed");
                record.address = address;
                record.hostname = hostname;
            }
            None => {
                let mut record = HopRecord::new(hop, address, self.rounds);
                record.hostname = hostname;
                record.latency_sum_us = self.early_latency.remove(&hop).unwrap_or(0);
                self.records.insert(hop, record);
            }
        }
    }

    fn on_latency(&mut self, hop: HopIndex, micros: u64) {
        let sum = match self.records.get_mut(&hop) {
            Some(record) => &mut record.latency_sum_us,
            None => self.early_latency.entry(hop).or_insert(0),
        };
        *sum = sum.saturating_add(micros);
    }

    fn hostname_for(&mut self, address: &str) -> Option<String> {
        if let Some((last, hostname)) = &self.last_seen {
            if last == address {
                return hostname.clone();
            }
        }
        let hostname = address
            .parse::<IpAddr>()
            .ok()
            .and_then(|ip| self.hostnames.lookup_hostname(ip));
        self.last_seen = Some((address.to_string(), hostname.clone()));
        hostname
    }

    /// Ends the stream; the returned table is immutable.
    pub fn finish(self) -> HopTable {
        if !self.early_latency.is_empty() {
            debug!(
                hops = ?self.early_latency.keys().collect::<Vec<_>>(),
                "dropping latency samples for hops without an address"
            );
        }
        HopTable::new(self.records)
    }
}

/// Drains `events` into a finalized table.
pub fn aggregate<I, H>(events: I, rounds: u32, hostnames: &H) -> HopTable
where
    I: IntoIterator<Item = ProbeEvent>,
    H: HostnameLookup + ?Sized,
{
    let mut aggregator = HopAggregator::new(rounds, hostnames);
    for event in events {
        aggregator.push(event);
    }
    aggregator.finish()
}
