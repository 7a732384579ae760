use anyhow::{Context, Result};
use asntrace_lookup::{
    build_resolver, resolve_host, CymruLookup, DnsHostnames, Enricher, HostnameLookup,
    LookupSettings, NoHostnames,
};
use asntrace_model::{AddressFamily, TraceReport};
use asntrace_render::{
    collecting_line, paint, render_report, target_line, RenderOptions, Tone,
};
use asntrace_trace::{spawn_probe_stream, HopAggregator, ProbeHandle, ProbeSettings};
use clap::Parser;
use crossterm::{cursor, execute, terminal};
use std::io::{self, IsTerminal, Write};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod report;

use report::{build_report, resolve_trace};

#[derive(Parser)]
#[command(
    name = "asntrace",
    version,
    about = "Trace the AS path to a host. Only trace networks you own or have permission to test."
)]
struct Cli {
    /// Hostname or IP address to look up and trace
    target: String,

    /// Only show the target's ownership, skip the path trace
    #[arg(long)]
    no_trace: bool,

    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    rounds: u32,

    #[arg(long, default_value_t = 30)]
    max_hops: u32,

    /// Path or name of the mtr binary
    #[arg(long, default_value = "mtr")]
    mtr_bin: String,

    #[arg(long, default_value_t = 2000)]
    lookup_timeout_ms: u64,

    /// Skip reverse DNS for hop addresses
    #[arg(long)]
    no_rdns: bool,

    /// Print a JSON report instead of the table
    #[arg(long)]
    json: bool,

    #[arg(long)]
    no_color: bool,

    #[arg(short = '4', conflicts_with = "ipv6")]
    ipv4: bool,

    #[arg(short = '6')]
    ipv6: bool,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn family(&self) -> AddressFamily {
        if self.ipv4 {
            AddressFamily::V4
        } else if self.ipv6 {
            AddressFamily::V6
        } else {
            AddressFamily::Any
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn print_error(message: &str) {
    let opts = RenderOptions {
        color: io::stderr().is_terminal(),
    };
    eprintln!("{}", paint(&format!("error: {message}"), Tone::Bad, &opts));
}

fn run(cli: &Cli) -> Result<()> {
    let probe = ProbeHandle::default();
    install_interrupt_handler(probe.clone())?;

    let interactive = io::stdout().is_terminal();
    let opts = RenderOptions {
        color: interactive && !cli.no_color && !cli.json,
    };

    let lookup_settings = LookupSettings {
        timeout: Duration::from_millis(cli.lookup_timeout_ms),
    };
    let resolver = Arc::new(build_resolver(&lookup_settings)?);
    let address = resolve_host(&resolver, &cli.target, cli.family())
        .with_context(|| format!("failed to resolve target {}", cli.target))?;

    let owners = CymruLookup::new(Arc::clone(&resolver));
    let target_owner = Enricher::new(&owners).classify(address);
    tracing::debug!(%address, owner = ?target_owner, "target resolved");

    if !cli.json {
        let line = target_line(&cli.target, &address.to_string(), &target_owner, &opts);
        write_line(&mut io::stdout().lock(), &line)?;
    }

    if cli.no_trace {
        if cli.json {
            let report = build_report(&cli.target, address, target_owner, None);
            write_json(&mut io::stdout().lock(), &report)?;
        }
        return Ok(());
    }

    let settings = ProbeSettings {
        binary: cli.mtr_bin.clone(),
        rounds: cli.rounds,
        max_hops: cli.max_hops,
        family: match address {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        },
    };
    let mut stream = spawn_probe_stream(&address.to_string(), &settings, &probe)?;

    let show_indicator = interactive && !cli.json;
    if show_indicator {
        let mut out = io::stdout().lock();
        write!(out, "{}", collecting_line(&cli.target, &address.to_string()))?;
        out.flush()?;
    }

    let hostnames: Box<dyn HostnameLookup> = if cli.no_rdns {
        Box::new(NoHostnames)
    } else {
        Box::new(DnsHostnames::new(Arc::clone(&resolver)))
    };
    let mut aggregator = HopAggregator::new(settings.rounds, hostnames.as_ref());
    for event in stream.by_ref() {
        aggregator.push(event);
    }
    let table = aggregator.finish();
    let finished = stream.finish();

    if show_indicator {
        clear_indicator()?;
    }
    finished?;

    let enricher = Enricher::new(&owners).with_target(address, target_owner.clone());
    let outcome = resolve_trace(&table, &enricher, address);

    if cli.json {
        let report = build_report(&cli.target, address, target_owner, Some(outcome));
        write_json(&mut io::stdout().lock(), &report)?;
    } else {
        let text = render_report(&outcome.path, &outcome.rows, &opts);
        write_line(&mut io::stdout().lock(), &text)?;
    }
    Ok(())
}

/// Ctrl-C kills the probe, if one is running, and ends the process with a
/// failure status.
fn install_interrupt_handler(handle: ProbeHandle) -> Result<()> {
    ctrlc::set_handler(move || {
        handle.kill();
        let _ = writeln!(io::stdout());
        print_error("interrupted");
        std::process::exit(1);
    })
    .context("failed to install interrupt handler")
}

fn clear_indicator() -> Result<()> {
    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::MoveToColumn(0),
        terminal::Clear(terminal::ClearType::CurrentLine)
    )?;
    Ok(())
}

/// Writes go through `Result` so a closed pipe ends the run with an error
/// instead of a panic.
fn write_line<W: Write>(out: &mut W, text: &str) -> Result<()> {
    writeln!(out, "{text}").context("failed to write output")
}

fn write_json<W: Write>(out: &mut W, report: &TraceReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    write_line(out, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asntrace_model::AsInfo;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_pipe_is_an_error_not_a_panic() {
        let report = build_report("dns.google", "8.8.8.8".parse().unwrap(), AsInfo::NoData, None);
        assert!(write_json(&mut ClosedPipe, &report).is_err());
        assert!(write_line(&mut ClosedPipe, "AS path: ◆ destination").is_err());
    }

    #[test]
    fn json_output_ends_with_newline() {
        let report = build_report("dns.google", "8.8.8.8".parse().unwrap(), AsInfo::NoData, None);
        let mut out = Vec::new();
        write_json(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\"status\": \"no_data\""));
    }
}
