//! # Operator Console
//!
//! Line-oriented stand-in for the camera and result screen. Every line that
//! is not a command is treated as one decoded code, byte for byte. `scan`
//! forces the rest of the line to be read as a code.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use scan_gate::{
    Admission, DecodeEvent, DisplayedResult, HistoryReader, HistoryView, ScanOutcome,
    ScanRecord, ScanSessionController, ScanStore,
};
use scan_telemetry::{
    encode_metrics, log_scan_event, metric_inc, time_histogram, DECISION_DURATION,
    GRANTED_IDENTIFIERS, HISTORY_QUERIES, SCAN_EVENTS, SCAN_OUTCOMES,
};

const HELP: &str =
    "commands: <code> | scan <code> | again | history [n] | metrics | help | quit";

/// One console input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A decoded code.
    Scan(String),
    /// Dismiss the shown result.
    Again,
    /// List recent records; `None` uses the configured limit.
    History(Option<usize>),
    /// Dump Prometheus metrics.
    Metrics,
    /// Print usage.
    Help,
    /// Leave the console.
    Quit,
    /// Blank line.
    Empty,
    /// Recognized command with bad arguments.
    Invalid(String),
}

impl Command {
    /// Parse one line.
    ///
    /// Codes are taken verbatim, surrounding whitespace included. A code that
    /// reads like a command is entered as `scan <code>`.
    pub fn parse(line: &str) -> Self {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(code) = line.strip_prefix("scan ") {
            return Command::Scan(code.to_string());
        }

        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Command::Empty;
        };
        let rest: Vec<&str> = words.collect();

        match (head, rest.as_slice()) {
            ("again" | "dismiss", []) => Command::Again,
            ("metrics", []) => Command::Metrics,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            ("history", []) => Command::History(None),
            ("history", [n]) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Command::History(Some(n)),
                _ => Command::Invalid(format!(
                    "history count must be a positive number, got {:?}",
                    n
                )),
            },
            _ => Command::Scan(line.to_string()),
        }
    }
}

/// Console bound to one scan session.
pub struct ScanConsole {
    controller: ScanSessionController,
    history: HistoryReader<dyn ScanStore>,
    history_limit: usize,
}

impl ScanConsole {
    /// Console over a session and a history reader sharing its store.
    pub fn new(
        controller: ScanSessionController,
        history: HistoryReader<dyn ScanStore>,
        history_limit: usize,
    ) -> Self {
        Self {
            controller,
            history,
            history_limit,
        }
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        write_line(&mut output, HELP).await?;

        while let Some(line) = lines.next_line().await.context("failed to read input")? {
            let command = Command::parse(&line);
            debug!("[scan-gate] Console command {:?}", command);

            let reply = match command {
                Command::Quit => break,
                Command::Empty => continue,
                Command::Scan(code) => self.scan(code).await,
                Command::Again => {
                    if self.controller.dismiss() {
                        "ready to scan".to_string()
                    } else {
                        "nothing to dismiss".to_string()
                    }
                }
                Command::History(n) => self.history(n.unwrap_or(self.history_limit)).await,
                Command::Metrics => encode_metrics().context("failed to encode metrics")?,
                Command::Help => HELP.to_string(),
                Command::Invalid(reason) => reason,
            };
            write_line(&mut output, &reply).await?;
        }

        info!(
            session = %self.controller.session_id(),
            "[scan-gate] Console closed"
        );
        Ok(())
    }

    async fn scan(&self, code: String) -> String {
        let admission = self.controller.submit(DecodeEvent::now(code));
        metric_inc!(SCAN_EVENTS, &[admission.label()]);

        match admission {
            Admission::Accepted { .. } => {
                let timer = time_histogram!(DECISION_DURATION);
                let result = self.controller.wait_for_result().await;
                timer.observe();

                match result {
                    Some(result) => {
                        metric_inc!(SCAN_OUTCOMES, &[result.outcome.label()]);
                        if result.outcome == ScanOutcome::Granted {
                            GRANTED_IDENTIFIERS.inc();
                        }
                        log_scan_event!(
                            info,
                            display_identifier(&result),
                            result.outcome,
                            "[scan-gate] Result shown"
                        );
                        render_result(&result)
                    }
                    None => "session closed".to_string(),
                }
            }
            Admission::Debounced { remaining } => {
                format!("ignored: scanned too soon ({}ms)", remaining.as_millis())
            }
            Admission::Busy { phase } => {
                format!("ignored: session is {}, type 'again' first", phase)
            }
        }
    }

    async fn history(&self, max_count: usize) -> String {
        HISTORY_QUERIES.inc();
        match self.history.load(max_count).await {
            HistoryView::Loaded(records) => records
                .iter()
                .map(render_record)
                .collect::<Vec<_>>()
                .join("\n"),
            HistoryView::Empty => "no scans yet".to_string(),
            HistoryView::Failed { message } => message.to_string(),
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(format!("{}\n", text).as_bytes())
        .await
        .context("failed to write output")?;
    output.flush().await.context("failed to flush output")
}

fn display_identifier(result: &DisplayedResult) -> &str {
    result.identifier.as_ref().map_or("-", |id| id.as_str())
}

fn local_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// One result screen as text.
pub fn render_result(result: &DisplayedResult) -> String {
    let when = result.timestamp.map_or_else(|| "-".to_string(), local_time);
    format!(
        "[{}] {}  {}  {}",
        result.outcome.label().to_uppercase(),
        display_identifier(result),
        when,
        result.message
    )
}

/// One history row as text.
pub fn render_record(record: &ScanRecord) -> String {
    format!(
        "{}  {:<20} {:<17} {}",
        record.record_id,
        record.identifier.as_str(),
        ScanOutcome::from(record.outcome).label(),
        local_time(record.timestamp)
    )
}
