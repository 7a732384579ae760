use asntrace_model::HopIndex;

/// One decoded line of `mtr --raw` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    Host { hop: HopIndex, address: String },
    Latency { hop: HopIndex, micros: u64 },
}

impl ProbeEvent {
    pub fn hop(&self) -> HopIndex {
        match self {
            ProbeEvent::Host { hop, .. } | ProbeEvent::Latency { hop, .. } => *hop,
        }
    }
}

/// Decodes `h <pos> <address>` and `p <pos> <usec> ...` lines.
///
/// mtr numbers positions from 0; the returned hop index is 1-based. Any other
/// line type, or a line with a malformed field, yields `None`.
pub fn parse_event_line(line: &str) -> Option<ProbeEvent> {
    let mut tokens = line.split_whitespace();
    let kind = tokens.next()?;
    let hop = parse_position(tokens.next()?)?;
    let value = tokens.next()?;

    match kind {
        "h" => Some(ProbeEvent::Host {
            hop,
            address: value.to_string(),
        }),
        "p" => value
            .parse::<u64>()
            .ok()
            .map(|micros| ProbeEvent::Latency { hop, micros }),
        _ => None,
    }
}

fn parse_position(token: &str) -> Option<HopIndex> {
    token.parse::<HopIndex>().ok()?.checked_add(1)
}
