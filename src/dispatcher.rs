//! Bounded dispatcher: one probe task per proxy line, at most N in flight

use crate::proxy::parser::ProxyParser;
use crate::proxy::prober::Probe;
use crate::sink::ResultSink;
use log::{debug, error, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Lifecycle of one dispatch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Running,
    Draining,
    Done,
}

/// What happened to a single proxy line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Succeeded,
    Failed,
    Rejected,
}

/// Tally of one dispatch cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Lines that got a task
    pub launched: usize,
    /// Probes that received an HTTP response
    pub succeeded: usize,
    /// Probes that failed at setup, request, timeout or body stage
    pub failed: usize,
    /// Lines that did not parse
    pub rejected: usize,
    /// Tasks that panicked
    pub aborted: usize,
    /// Error that stopped reading the proxy list early
    pub read_error: Option<String>,
}

impl DispatchSummary {
    fn tally(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Succeeded => self.succeeded += 1,
            Disposition::Failed => self.failed += 1,
            Disposition::Rejected => self.rejected += 1,
        }
    }

    /// Number of tasks that ran to completion
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed + self.rejected
    }
}

/// Reads proxy lines and runs one probe per line behind an admission gate
pub struct Dispatcher {
    prober: Arc<dyn Probe>,
    sink: Arc<ResultSink>,
    max_concurrency: usize,
    phase: Mutex<DispatchPhase>,
}

impl Dispatcher {
    /// Create a dispatcher; a limit of 0 is raised to 1
    pub fn new(prober: Arc<dyn Probe>, sink: Arc<ResultSink>, max_concurrency: usize) -> Self {
        Self {
            prober,
            sink,
            max_concurrency: max_concurrency.max(1),
            phase: Mutex::new(DispatchPhase::Idle),
        }
    }

    pub fn phase(&self) -> DispatchPhase {
        *self.phase.lock()
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    fn enter(&self, phase: DispatchPhase) {
        debug!("dispatcher entering {:?}", phase);
        *self.phase.lock() = phase;
    }

    /// Dispatch every line of `reader` and wait until all probes finish.
    ///
    /// Reading blocks while all permits are held, so at most
    /// `max_concurrency` probes are ever in flight.
    pub async fn run<R>(&self, reader: R) -> DispatchSummary
    where
        R: AsyncBufRead + Unpin,
    {
        self.enter(DispatchPhase::Running);

        let gate = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut summary = DispatchSummary::default();
        let mut segments = reader.split(b'\n');

        loop {
            let line = match segments.next_segment().await {
                Ok(Some(bytes)) => decode_line(bytes),
                Ok(None) => break,
                Err(e) => {
                    summary.read_error = Some(e.to_string());
                    break;
                }
            };

            // The gate is never closed, so acquiring only waits for a free slot
            let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                break;
            };

            let prober = Arc::clone(&self.prober);
            let sink = Arc::clone(&self.sink);
            tasks.spawn(async move {
                let disposition = handle_line(&line, prober.as_ref(), &sink).await;
                drop(permit);
                disposition
            });
            summary.launched += 1;
        }

        self.enter(DispatchPhase::Draining);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(disposition) => summary.tally(disposition),
                Err(e) => {
                    error!("probe task aborted: {}", e);
                    summary.aborted += 1;
                }
            }
        }

        if let Some(e) = &summary.read_error {
            self.sink.report(&format!("failed to read proxy list: {}", e));
        }

        info!(
            "dispatched {} proxies: {} succeeded, {} failed, {} rejected",
            summary.launched, summary.succeeded, summary.failed, summary.rejected
        );
        self.enter(DispatchPhase::Done);
        summary
    }
}

/// Strip a trailing `\r` and decode lossily, so a line that is not UTF-8
/// is rejected by the parser instead of ending the read loop
fn decode_line(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    match String::from_utf8(bytes) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

async fn handle_line(line: &str, prober: &dyn Probe, sink: &ResultSink) -> Disposition {
    let spec = match ProxyParser::parse_line(line) {
        Ok(spec) => spec,
        Err(e) => {
            debug!("rejected proxy line {:?}: {}", line, e);
            sink.reject(line, &e);
            return Disposition::Rejected;
        }
    };

    let outcome = prober.probe(&spec).await;
    let disposition = if outcome.is_success() {
        Disposition::Succeeded
    } else {
        Disposition::Failed
    };
    sink.record(outcome);
    disposition
}
