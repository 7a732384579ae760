use crate::style::{paint, RenderOptions, Tone};
use asntrace_model::{AsInfo, PathEntry, ReportRow};

/// Fixed last element of the AS path line.
pub const DESTINATION_MARKER: &str = "◆ destination";

const PATH_SEPARATOR: &str = " ➜ ";
const NO_REPLY: &str = "*";

/// Transient status shown while the probe runs.
pub fn collecting_line(target: &str, address: &str) -> String {
    format!("Tracing path to {target} ({address}), collecting hop data...")
}

/// One-line summary of the target's ownership.
pub fn target_line(target: &str, address: &str, owner: &AsInfo, opts: &RenderOptions) -> String {
    let host = if target == address {
        address.to_string()
    } else {
        format!("{target} ({address})")
    };
    let status = match owner {
        AsInfo::Resolved(owner) if owner.route.is_empty() => {
            paint(&format!("[AS{}] {}", owner.asn, owner.name), Tone::Good, opts)
        }
        AsInfo::Resolved(owner) => paint(
            &format!("[AS{}] {} | route {}", owner.asn, owner.name, owner.route),
            Tone::Good,
            opts,
        ),
        other => as_status(other, opts),
    };
    format!("{}{PATH_SEPARATOR}{status}", paint(&host, Tone::Accent, opts))
}

/// `AS path: AS1 [A] ➜ AS2 [B] ➜ ◆ destination`
pub fn path_line(path: &[PathEntry], opts: &RenderOptions) -> String {
    let mut parts: Vec<String> = path
        .iter()
        .map(|entry| paint(&entry.to_string(), Tone::Good, opts))
        .collect();
    parts.push(paint(DESTINATION_MARKER, Tone::Accent, opts));
    format!("AS path: {}", parts.join(PATH_SEPARATOR))
}

/// Hop table with one row per slot, in the order given.
pub fn hop_table(rows: &[ReportRow], opts: &RenderOptions) -> String {
    let cells: Vec<(String, String)> = rows
        .iter()
        .map(|row| match row {
            ReportRow::Reply { record, .. } => (
                record.display_name(),
                format!("{:.1} ms", record.avg_latency_ms()),
            ),
            ReportRow::NoReply { .. } => (NO_REPLY.to_string(), NO_REPLY.to_string()),
        })
        .collect();

    let address_width = cells
        .iter()
        .map(|(address, _)| address.chars().count())
        .chain(std::iter::once("Address".len()))
        .max()
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(paint(
        &format!(
            "{:>3}  {:<address_width$}  {:>10}  AS",
            "Hop", "Address", "Latency"
        ),
        Tone::Dim,
        opts,
    ));

    for (row, (address, latency)) in rows.iter().zip(cells) {
        let address = format!("{address:<address_width$}");
        let latency = format!("{latency:>10}");
        let line = match row {
            ReportRow::Reply { owner, .. } => format!(
                "{:>3}  {}  {}  {}",
                row.index(),
                paint(&address, Tone::Plain, opts),
                latency,
                as_status(owner, opts)
            ),
            ReportRow::NoReply { .. } => format!(
                "{:>3}  {}  {}  {}",
                row.index(),
                paint(&address, Tone::Dim, opts),
                paint(&latency, Tone::Dim, opts),
                paint("(no reply)", Tone::Dim, opts)
            ),
        };
        lines.push(line);
    }
    lines.join("\n")
}

/// AS path line followed by the hop table.
pub fn render_report(path: &[PathEntry], rows: &[ReportRow], opts: &RenderOptions) -> String {
    format!("{}\n\n{}", path_line(path, opts), hop_table(rows, opts))
}

fn as_status(owner: &AsInfo, opts: &RenderOptions) -> String {
    match owner {
        AsInfo::Resolved(owner) => {
            paint(&format!("[AS{}] {}", owner.asn, owner.name), Tone::Good, opts)
        }
        AsInfo::Private => paint("(private network)", Tone::Dim, opts),
        AsInfo::NoData => paint("(no data)", Tone::Warn, opts),
    }
}
