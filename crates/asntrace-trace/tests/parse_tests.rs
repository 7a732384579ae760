use asntrace_trace::{EventReader, ProbeEvent};

#[test]
fn parse_mtr_raw_with_missing_hop() {
    let text = include_str!("fixtures/mtr_raw_1.txt");
    let events: Vec<ProbeEvent> = EventReader::new(text.as_bytes()).collect();

    let hosts: Vec<(u32, &str)> = events
        .iter()
        .filter_map(|event| match event {
            ProbeEvent::Host { hop, address } => Some((*hop, address.as_str())),
            ProbeEvent::Latency { .. } => None,
        })
        .collect();
    assert_eq!(
        hosts,
        vec![(1, "192.168.1.1"), (2, "100.64.0.1"), (4, "8.8.8.8")]
    );

    let samples = events
        .iter()
        .filter(|event| matches!(event, ProbeEvent::Latency { .. }))
        .count();
    assert_eq!(samples, 8);
    assert!(events.iter().all(|event| event.hop() != 3));
}

#[test]
fn parse_keeps_repeated_host_lines() {
    let text = include_str!("fixtures/mtr_raw_ecmp.txt");
    let events: Vec<ProbeEvent> = EventReader::new(text.as_bytes()).collect();

    assert_eq!(events.len(), 10);
    assert_eq!(
        events[4],
        ProbeEvent::Host {
            hop: 2,
            address: "203.0.113.9".to_string()
        }
    );
}
