use asntrace_lookup::{HostnameLookup, NoHostnames};
use asntrace_model::HopSlot;
use asntrace_trace::{aggregate, EventReader, HopAggregator, ProbeEvent};
use std::cell::RefCell;
use std::net::IpAddr;

#[derive(Default)]
struct CountingHostnames {
    calls: RefCell<Vec<IpAddr>>,
}

impl HostnameLookup for CountingHostnames {
    fn lookup_hostname(&self, address: IpAddr) -> Option<String> {
        self.calls.borrow_mut().push(address);
        match address.to_string().as_str() {
            "8.8.8.8" => Some("dns.google".to_string()),
            "198.51.100.20" => Some("edge.example.net".to_string()),
            _ => None,
        }
    }
}

fn host(hop: u32, address: &str) -> ProbeEvent {
    ProbeEvent::Host {
        hop,
        address: address.to_string(),
    }
}

fn latency(hop: u32, micros: u64) -> ProbeEvent {
    ProbeEvent::Latency { hop, micros }
}

#[test]
fn fixture_aggregates_sums_and_gaps() {
    let text = include_str!("fixtures/mtr_raw_1.txt");
    let hostnames = CountingHostnames::default();
    let table = aggregate(EventReader::new(text.as_bytes()), 3, &hostnames);

    assert_eq!(table.max_index(), 4);
    assert_eq!(table.len(), 3);
    assert!(table.get(3).is_none());

    let first = table.get(1).unwrap();
    assert_eq!(first.latency_sum_us, 1210 + 1380 + 1290);
    assert_eq!(first.rounds, 3);

    let second = table.get(2).unwrap();
    assert_eq!(second.latency_sum_us, 8420 + 8110);

    let last = table.get(4).unwrap();
    assert_eq!(last.hostname.as_deref(), Some("dns.google"));
    assert_eq!(format!("{:.1}", last.avg_latency_ms()), "14.2");

    let slots = table.walk("8.8.8.8".parse().ok());
    assert!(matches!(slots[2], HopSlot::NoReply(3)));
}

#[test]
fn average_divides_by_round_count() {
    let events = vec![
        host(1, "203.0.113.5"),
        latency(1, 10_000),
        latency(1, 20_000),
        latency(1, 30_000),
    ];
    let table = aggregate(events, 3, &NoHostnames);
    let hop = table.get(1).unwrap();
    assert_eq!(format!("{:.1}", hop.avg_latency_ms()), "20.0");
}

#[test]
fn repeated_address_uses_single_slot_cache() {
    let text = include_str!("fixtures/mtr_raw_ecmp.txt");
    let hostnames = CountingHostnames::default();
    let table = aggregate(EventReader::new(text.as_bytes()), 3, &hostnames);

    let calls: Vec<String> = hostnames
        .calls
        .borrow()
        .iter()
        .map(IpAddr::to_string)
        .collect();
    assert_eq!(
        calls,
        vec!["10.0.0.1", "203.0.113.1", "203.0.113.9", "198.51.100.20"]
    );

    assert_eq!(table.get(2).unwrap().address, "203.0.113.9");
    assert_eq!(table.get(2).unwrap().latency_sum_us, 11_000);
    assert_eq!(
        table.get(4).unwrap().hostname.as_deref(),
        Some("edge.example.net")
    );
}

#[test]
fn latency_before_host_is_kept() {
    let hostnames = CountingHostnames::default();
    let mut aggregator = HopAggregator::new(3, &hostnames);
    aggregator.push(latency(2, 4_000));
    aggregator.push(host(1, "192.168.1.1"));
    aggregator.push(host(2, "10.1.1.1"));
    aggregator.push(latency(2, 2_000));
    aggregator.push(latency(5, 9_000));
    let table = aggregator.finish();

    assert_eq!(table.get(2).unwrap().latency_sum_us, 6_000);
    assert_eq!(table.max_index(), 2);
}

#[test]
fn unparseable_address_skips_lookup() {
    let hostnames = CountingHostnames::default();
    let table = aggregate(vec![host(1, "???")], 3, &hostnames);
    assert!(hostnames.calls.borrow().is_empty());
    assert_eq!(table.get(1).unwrap().address, "???");
}

#[test]
fn empty_stream_yields_empty_table() {
    let table = aggregate(Vec::new(), 3, &NoHostnames);
    assert!(table.is_empty());
    assert!(table.walk(None).is_empty());
}
