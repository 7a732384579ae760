use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::Resolver;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use tracing::debug;

use crate::{sanitize_display, LookupError, OwnerLookup};
use asntrace_model::AsOwner;

/// Marker the Cymru service uses for fields it has no data for.
const NOT_AVAILABLE: &str = "NA";

/// AS ownership via the Team Cymru IP-to-ASN DNS service.
pub struct CymruLookup {
    resolver: Arc<Resolver>,
}

impl CymruLookup {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    /// First TXT record for `name`, joined and unquoted. A name without
    /// records is `Ok(None)`.
    fn txt(&self, name: &str) -> Result<Option<String>, LookupError> {
        match self.resolver.txt_lookup(name) {
            Ok(records) => Ok(records.iter().next().map(|txt| {
                let joined: String = txt
                    .txt_data()
                    .iter()
                    .filter_map(|bytes| std::str::from_utf8(bytes).ok())
                    .collect();
                joined.trim_matches('"').to_string()
            })),
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

impl OwnerLookup for CymruLookup {
    fn lookup_owner(&self, address: IpAddr) -> Result<Option<AsOwner>, LookupError> {
        let Some(origin) = self.txt(&origin_query(address))? else {
            return Ok(None);
        };
        let Some((asn, route)) = parse_origin(&origin) else {
            debug!(%address, record = %origin, "origin record without usable ASN");
            return Ok(None);
        };

        let name = match self.txt(&format!("AS{asn}.asn.cymru.com")) {
            Ok(record) => record.as_deref().and_then(parse_as_name),
            Err(err) => {
                debug!(asn, %err, "AS name lookup failed");
                None
            }
        };

        Ok(Some(AsOwner {
            asn,
            name: name.unwrap_or_else(|| format!("AS{asn}")),
            route,
        }))
    }
}

/// Query name for the origin record of `address`.
pub fn origin_query(address: IpAddr) -> String {
    match address {
        IpAddr::V4(v4) => ipv4_origin_query(v4),
        IpAddr::V6(v6) => ipv6_origin_query(v6),
    }
}

/// 8.8.4.4 -> "4.4.8.8.origin.asn.cymru.com"
fn ipv4_origin_query(address: Ipv4Addr) -> String {
    let [a, b, c, d] = address.octets();
    format!("{d}.{c}.{b}.{a}.origin.asn.cymru.com")
}

/// Reversed nibbles of the fully expanded address under origin6.
fn ipv6_origin_query(address: Ipv6Addr) -> String {
    let mut nibbles: Vec<String> = address
        .octets()
        .iter()
        .flat_map(|byte| [byte >> 4, byte & 0xf])
        .map(|nibble| format!("{nibble:x}"))
        .collect();
    nibbles.reverse();
    format!("{}.origin6.asn.cymru.com", nibbles.join("."))
}

/// Parses "ASN | IP | prefix | CC | registry | allocated".
///
/// Multi-origin prefixes list several ASNs in the first field; the first one
/// wins.
pub fn parse_origin(record: &str) -> Option<(u32, String)> {
    let parts: Vec<&str> = record.split('|').map(str::trim).collect();
    let asn = parts
        .first()?
        .split_whitespace()
        .next()?
        .trim_start_matches("AS")
        .parse::<u32>()
        .ok()?;
    let route = parts
        .get(2)
        .copied()
        .filter(|route| !route.is_empty() && *route != NOT_AVAILABLE)
        .map(|route| sanitize_display(route))
        .unwrap_or_default();
    Some((asn, route))
}

/// Parses "ASN | CC | registry | allocated | AS name".
pub fn parse_as_name(record: &str) -> Option<String> {
    let name = record.split('|').map(str::trim).nth(4)?;
    if name.is_empty() || name == NOT_AVAILABLE {
        return None;
    }
    Some(sanitize_display(name))
}
