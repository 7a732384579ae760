use asntrace_model::AddressFamily;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::Resolver;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::{LookupError, LookupSettings};

/// Builds the blocking resolver shared by all lookups. Every query is bounded
/// by `settings.timeout` with a single attempt.
pub fn build_resolver(settings: &LookupSettings) -> Result<Resolver, LookupError> {
    let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
        Ok(conf) => conf,
        Err(err) => {
            warn!(%err, "system DNS config unavailable, using Google DNS");
            (ResolverConfig::google(), ResolverOpts::default())
        }
    };
    opts.timeout = settings.timeout;
    opts.attempts = 1;
    Resolver::new(config, opts).map_err(LookupError::Init)
}

/// Resolves the user-supplied target to a single address. Literal addresses
/// are used as given; names take the first address of the requested family.
pub fn resolve_host(
    resolver: &Resolver,
    host: &str,
    family: AddressFamily,
) -> Result<IpAddr, LookupError> {
    let no_address = || LookupError::NoAddress {
        host: host.to_string(),
        family: family_label(family),
    };

    if let Ok(address) = host.parse::<IpAddr>() {
        return if family.matches(&address) {
            Ok(address)
        } else {
            Err(no_address())
        };
    }

    let addresses = resolver.lookup_ip(host)?;
    let address = addresses
        .iter()
        .find(|address| family.matches(address))
        .ok_or_else(no_address)?;
    debug!(host, %address, "resolved target");
    Ok(address)
}

fn family_label(family: AddressFamily) -> &'static str {
    match family {
        AddressFamily::Any => "IP",
        AddressFamily::V4 => "IPv4",
        AddressFamily::V6 => "IPv6",
    }
}
