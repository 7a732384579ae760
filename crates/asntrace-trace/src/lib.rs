//! Probe collection and per-hop aggregation.

pub mod aggregate;
pub mod error;
pub mod parser;
pub mod runner;
pub mod stream;

pub use aggregate::{aggregate, HopAggregator};
pub use error::TraceError;
pub use parser::{parse_event_line, ProbeEvent};
pub use runner::{probe_args, probe_command, ProbeSettings};
pub use stream::{spawn_probe_stream, EventReader, ProbeHandle, ProbeStream};
