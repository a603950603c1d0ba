//! Result sink: the single serialization point for probe results
//!
//! Every task reports through one `ResultSink`. The console and the
//! append-only output file sit behind one lock, so the lines for one
//! outcome are written before any other outcome's lines start.

use crate::error::ParseError;
use crate::proxy::models::ProbeOutcome;
use log::warn;
use parking_lot::Mutex;
use std::io::{self, Write};

struct Streams {
    console: Box<dyn Write + Send>,
    output: Box<dyn Write + Send>,
}

impl Streams {
    fn console_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.console, "{}", line).and_then(|_| self.console.flush()) {
            warn!("failed to write to console: {}", e);
        }
    }

    fn output_line(&mut self, line: &str) -> io::Result<()> {
        self.output.write_all(format!("{}\n", line).as_bytes())?;
        self.output.flush()
    }
}

/// Shared sink for probe results
pub struct ResultSink {
    streams: Mutex<Streams>,
    echo_body: bool,
}

impl ResultSink {
    pub fn new<C, O>(console: C, output: O, echo_body: bool) -> Self
    where
        C: Write + Send + 'static,
        O: Write + Send + 'static,
    {
        Self {
            streams: Mutex::new(Streams {
                console: Box::new(console),
                output: Box::new(output),
            }),
            echo_body,
        }
    }

    /// Record one probe outcome.
    ///
    /// Successful outcomes go to the console and the output file; failures
    /// are only shown on the console.
    pub fn record(&self, outcome: ProbeOutcome) {
        let line = format_outcome(&outcome, self.echo_body);
        let mut streams = self.streams.lock();

        streams.console_line(&line);
        if outcome.is_success() {
            if let Err(e) = streams.output_line(&line) {
                warn!("failed to append result for {}: {}", outcome.source, e);
                streams.console_line(&format!("failed to write to output file: {}", e));
            }
        }
    }

    /// Report a proxy line that could not be parsed
    pub fn reject(&self, line: &str, error: &ParseError) {
        self.report(&format!("'{}': {}", line, error));
    }

    /// Print a console-only notice
    pub fn report(&self, message: &str) {
        self.streams.lock().console_line(message);
    }
}

/// Format an outcome as a single result line (without trailing newline)
pub fn format_outcome(outcome: &ProbeOutcome, echo_body: bool) -> String {
    let Some(status_code) = outcome.status_code() else {
        let cause = outcome.error_message().unwrap_or_default();
        return format!("'{}': {}", outcome.source, cause);
    };

    let mut line = format!("'{}': status_code: {}", outcome.source, status_code);
    if echo_body {
        let body = outcome.body().unwrap_or_default();
        line.push_str(" response_body: ");
        line.push_str(&String::from_utf8_lossy(body));
    }
    line
}
