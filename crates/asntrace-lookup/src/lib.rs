//! Ownership and hostname lookups for trace hops.

pub mod cymru;
pub mod error;
pub mod host;
pub mod private;
pub mod rdns;
pub mod resolve;

use asntrace_model::AsOwner;
use std::net::IpAddr;
use std::time::Duration;

pub use cymru::CymruLookup;
pub use error::LookupError;
pub use host::{build_resolver, resolve_host};
pub use private::is_private;
pub use rdns::{DnsHostnames, NoHostnames};
pub use resolve::{enrich_table, Enricher};

/// Maps an address to the autonomous system announcing it.
pub trait OwnerLookup {
    /// `Ok(None)` means the service answered but has no data for the address.
    fn lookup_owner(&self, address: IpAddr) -> Result<Option<AsOwner>, LookupError>;
}

/// Reverse (PTR) hostname lookup.
pub trait HostnameLookup {
    fn lookup_hostname(&self, address: IpAddr) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub timeout: Duration,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2000),
        }
    }
}

/// Strips control characters from network-supplied text before display.
pub(crate) fn sanitize_display(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}
