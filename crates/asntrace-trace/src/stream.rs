use crate::error::TraceError;
use crate::parser::{parse_event_line, ProbeEvent};
use crate::runner::{probe_command, ProbeSettings};
use std::io::{BufRead, BufReader, Lines, Read};
use std::process::{Child, ChildStdout};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Decodes probe events from any line source. Ends at EOF or on the first
/// read error.
pub struct EventReader<R> {
    lines: Lines<R>,
    events_read: usize,
    failed: bool,
    done: bool,
}

impl<R: BufRead> EventReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            events_read: 0,
            failed: false,
            done: false,
        }
    }

    pub fn events_read(&self) -> usize {
        self.events_read
    }

    /// Whether the reader stopped on a read error rather than at EOF.
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = ProbeEvent;

    fn next(&mut self) -> Option<ProbeEvent> {
        while !self.done {
            match self.lines.next() {
                None => self.done = true,
                Some(Err(err)) => {
                    warn!(%err, "probe output read failed, keeping hops collected so far");
                    self.failed = true;
                    self.done = true;
                }
                Some(Ok(line)) => {
                    if let Some(event) = parse_event_line(&line) {
                        self.events_read += 1;
                        return Some(event);
                    }
                }
            }
        }
        None
    }
}

/// Shared slot for the running probe process so it can be killed from an
/// interrupt handler. The handle can exist before the process does.
#[derive(Clone, Default)]
pub struct ProbeHandle {
    child: Arc<Mutex<Option<Child>>>,
}

impl ProbeHandle {
    pub fn kill(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(child) = slot.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    fn attach(&self, child: Child) {
        if let Ok(mut slot) = self.child.lock() {
            *slot = Some(child);
        }
    }

    fn take(&self) -> Option<Child> {
        self.child.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Live event stream of a launched probe process.
pub struct ProbeStream {
    events: EventReader<BufReader<ChildStdout>>,
    handle: ProbeHandle,
    stderr: Option<JoinHandle<String>>,
}

/// Launches the probe for `target`, parks the process in `handle` and
/// returns its event stream.
pub fn spawn_probe_stream(
    target: &str,
    settings: &ProbeSettings,
    handle: &ProbeHandle,
) -> Result<ProbeStream, TraceError> {
    let mut child = probe_command(target, settings)
        .spawn()
        .map_err(|source| TraceError::Spawn {
            binary: settings.binary.clone(),
            source,
        })?;
    debug!(binary = %settings.binary, pid = child.id(), probe_target = target, "probe started");

    let stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(TraceError::MissingPipe("stdout"));
        }
    };

    let stderr = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf.split_whitespace().collect::<Vec<_>>().join(" ")
        })
    });

    handle.attach(child);
    Ok(ProbeStream {
        events: EventReader::new(BufReader::new(stdout)),
        handle: handle.clone(),
        stderr,
    })
}

impl ProbeStream {
    /// Reaps the process once the stream is drained. A failure exit is fatal
    /// only when no event was ever read.
    pub fn finish(self) -> Result<(), TraceError> {
        let ProbeStream {
            events,
            handle,
            stderr,
        } = self;
        let events_read = events.events_read();
        let read_failed = events.failed();
        // Closing stdout unblocks a child still writing to it.
        drop(events);

        let Some(mut child) = handle.take() else {
            return Ok(());
        };
        if read_failed {
            let _ = child.kill();
        }
        let stderr = stderr
            .and_then(|thread| thread.join().ok())
            .unwrap_or_default();
        let status = child.wait().map_err(TraceError::Wait)?;
        debug!(%status, events = events_read, "probe finished");

        if status.success() {
            return Ok(());
        }
        if events_read == 0 {
            return Err(TraceError::Exited { status, stderr });
        }
        warn!(%status, %stderr, "probe exited with failure, reporting partial trace");
        Ok(())
    }
}

impl Iterator for ProbeStream {
    type Item = ProbeEvent;

    fn next(&mut self) -> Option<ProbeEvent> {
        self.events.next()
    }
}
