//! Poll loop: fetch, filter, process, advance watermark, wait, repeat.
//!
//! Fixed-delay scheduling: the wait for the next cycle starts only after the
//! current cycle has fully completed, so at most one cycle is ever in flight
//! and the watermark has a single writer. Cancellation is only observed
//! while idle; a cycle that has started always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::WatchConfig;
use crate::error::SourceError;
use crate::pipeline::{
    FilterCriteria, LogProcessor, Processor, Watermark, select_and_advance, window_cutoff,
};
use crate::source::{HttpMessageSource, MessageRecord, MessageSource};

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next tick.
    Idle,
    /// Fetch, filter and processing in flight.
    Polling,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Records returned by the source.
    pub fetched: usize,
    /// Records that passed the filter, in the order they were processed.
    pub qualifying: Vec<MessageRecord>,
    /// Records the processor accepted.
    pub delivered: usize,
    /// Records the processor rejected.
    pub failed: usize,
    /// Watermark after this cycle.
    pub watermark: i64,
}

/// Drives a `MessageSource` into a `Processor` on a fixed delay.
pub struct PollLoop {
    source: Arc<dyn MessageSource>,
    processor: Arc<dyn Processor>,
    clock: Arc<dyn Clock>,
    criteria: FilterCriteria,
    window_minutes: u32,
    window_secs: i64,
    poll_interval: Duration,
    fetch_timeout: Duration,
    watermark: Watermark,
    state: PollState,
    cycles: u64,
}

impl PollLoop {
    /// Create a loop on the system clock.
    pub fn new(
        config: &WatchConfig,
        source: Arc<dyn MessageSource>,
        processor: Arc<dyn Processor>,
    ) -> Self {
        Self::with_clock(config, source, processor, Arc::new(SystemClock))
    }

    /// HTTP source into the log processor, the default wiring.
    pub fn from_config(config: &WatchConfig) -> crate::error::Result<Self> {
        let source = Arc::new(HttpMessageSource::new(config)?);
        Ok(Self::new(config, source, Arc::new(LogProcessor::new())))
    }

    /// Create a loop on an explicit clock. The watermark starts one window
    /// before the clock's current time.
    pub fn with_clock(
        config: &WatchConfig,
        source: Arc<dyn MessageSource>,
        processor: Arc<dyn Processor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window_secs = config.window_secs();
        let watermark = Watermark::one_window_before(clock.now_unix(), window_secs);
        Self {
            source,
            processor,
            clock,
            criteria: FilterCriteria::new(&config.conversation_id, &config.message_kind),
            window_minutes: config.window_minutes,
            window_secs,
            poll_interval: config.poll_interval,
            fetch_timeout: config.fetch_timeout,
            watermark,
            state: PollState::Idle,
            cycles: 0,
        }
    }

    /// Override the starting watermark.
    pub fn with_watermark(mut self, watermark: Watermark) -> Self {
        self.watermark = watermark;
        self
    }

    pub fn watermark(&self) -> i64 {
        self.watermark.get()
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run exactly one cycle: Idle → Polling → Idle.
    ///
    /// A source failure leaves the watermark untouched. Processor failures
    /// are logged per record and counted in the report.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, SourceError> {
        self.state = PollState::Polling;
        self.cycles += 1;
        let result = self.poll_once().await;
        self.state = PollState::Idle;
        result
    }

    async fn poll_once(&mut self) -> Result<CycleReport, SourceError> {
        let fetch = self.source.fetch(self.window_minutes);
        let records = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(SourceError::Timeout {
                    timeout: self.fetch_timeout,
                });
            }
        };
        let fetched = records.len();

        // Window is relative to now, not to when the request went out.
        let cutoff = window_cutoff(self.clock.now_unix(), self.window_secs);
        let selection = select_and_advance(records, self.watermark.get(), cutoff, &self.criteria);

        let mut delivered = 0;
        let mut failed = 0;
        for record in &selection.qualifying {
            match self.processor.consume(record).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    failed += 1;
                    warn!(
                        message_id = %record.message_id,
                        processor = self.processor.name(),
                        error = %e,
                        "Failed to process message"
                    );
                }
            }
        }

        let previous = self.watermark.get();
        if self.watermark.advance(selection.watermark) {
            debug!(from = previous, to = self.watermark.get(), "Watermark advanced");
        }

        Ok(CycleReport {
            fetched,
            qualifying: selection.qualifying,
            delivered,
            failed,
            watermark: self.watermark.get(),
        })
    }

    /// Poll until `cancel` fires. Returns the final watermark.
    ///
    /// The first cycle runs immediately. No error ends the loop.
    pub async fn run(mut self, cancel: CancellationToken) -> i64 {
        info!(
            source = self.source.name(),
            processor = self.processor.name(),
            interval_secs = self.poll_interval.as_secs_f64(),
            window_minutes = self.window_minutes,
            conversation = %self.criteria.conversation_id,
            kind = %self.criteria.kind,
            "Poller started"
        );

        while !cancel.is_cancelled() {
            match self.run_cycle().await {
                Ok(report) if report.qualifying.is_empty() => {
                    debug!(
                        cycle = self.cycles,
                        fetched = report.fetched,
                        "No new messages"
                    );
                }
                Ok(report) => {
                    info!(
                        cycle = self.cycles,
                        fetched = report.fetched,
                        delivered = report.delivered,
                        failed = report.failed,
                        watermark = report.watermark,
                        "Processed new messages"
                    );
                }
                Err(e) => {
                    let kind = if e.is_decode() { "decode" } else { "transport" };
                    error!(cycle = self.cycles, kind, error = %e, "Poll cycle failed");
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!(watermark = self.watermark.get(), "Poller shutting down");
        self.watermark.get()
    }
}

/// Spawn the loop as a background task.
///
/// Returns the task handle (resolving to the final watermark) and the token
/// that stops it.
pub fn spawn_poller(poll_loop: PollLoop) -> (JoinHandle<i64>, CancellationToken) {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move { poll_loop.run(token).await });
    (handle, cancel)
}
