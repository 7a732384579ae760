use hickory_resolver::Resolver;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

use crate::{sanitize_display, HostnameLookup};

/// PTR lookups through the shared resolver.
pub struct DnsHostnames {
    resolver: Arc<Resolver>,
}

impl DnsHostnames {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }
}

impl HostnameLookup for DnsHostnames {
    fn lookup_hostname(&self, address: IpAddr) -> Option<String> {
        match self.resolver.reverse_lookup(address) {
            Ok(lookup) => lookup.iter().next().map(|name| {
                let name = name.to_string();
                sanitize_display(name.trim_end_matches('.'))
            }),
            Err(err) => {
                debug!(%address, %err, "reverse lookup failed");
                None
            }
        }
    }
}

/// Used when reverse lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostnames;

impl HostnameLookup for NoHostnames {
    fn lookup_hostname(&self, _address: IpAddr) -> Option<String> {
        None
    }
}
