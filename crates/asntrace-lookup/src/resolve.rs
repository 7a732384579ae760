use asntrace_model::{AsInfo, HopSlot, HopTable, ReportRow};
use std::net::IpAddr;
use tracing::debug;

use crate::{is_private, OwnerLookup};

/// Classifies hop addresses, short-circuiting private ranges and the trace
/// target before falling back to an owner lookup.
pub struct Enricher<'a, L: ?Sized> {
    owners: &'a L,
    target: Option<(IpAddr, AsInfo)>,
}

impl<'a, L: OwnerLookup + ?Sized> Enricher<'a, L> {
    pub fn new(owners: &'a L) -> Self {
        Self {
            owners,
            target: None,
        }
    }

    /// Registers the already resolved target so hops reaching it reuse the
    /// result instead of issuing another lookup.
    pub fn with_target(mut self, address: IpAddr, info: AsInfo) -> Self {
        self.target = Some((address, info));
        self
    }

    pub fn classify(&self, address: IpAddr) -> AsInfo {
        if is_private(address) {
            return AsInfo::Private;
        }
        if let Some((target, info)) = &self.target {
            if *target == address {
                return info.clone();
            }
        }
        match self.owners.lookup_owner(address) {
            Ok(Some(owner)) => AsInfo::Resolved(owner),
            Ok(None) => AsInfo::NoData,
            Err(err) => {
                debug!(%address, %err, "owner lookup failed");
                AsInfo::NoData
            }
        }
    }

    /// Same as [`Enricher::classify`] for addresses as printed by the probe.
    pub fn classify_str(&self, address: &str) -> AsInfo {
        match address.parse::<IpAddr>() {
            Ok(address) => self.classify(address),
            Err(_) => AsInfo::NoData,
        }
    }
}

/// Resolves every displayed hop in ascending order, stopping at the target.
pub fn enrich_table<L: OwnerLookup + ?Sized>(
    table: &HopTable,
    enricher: &Enricher<'_, L>,
    target: IpAddr,
) -> Vec<ReportRow> {
    table
        .walk(Some(target))
        .into_iter()
        .map(|slot| match slot {
            HopSlot::Reply(record) => ReportRow::Reply {
                record: record.clone(),
                owner: enricher.classify_str(&record.address),
            },
            HopSlot::NoReply(index) => ReportRow::NoReply { index },
        })
        .collect()
}
