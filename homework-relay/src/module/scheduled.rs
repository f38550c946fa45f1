//! Poll loop driver
//!
//! Runs fetch → diff → notify on a fixed interval until the shutdown future
//! resolves. Every failure inside a cycle is logged and the loop carries on;
//! the next tick is the only retry mechanism.

use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};

use super::homework::{self, FetchError, HomeworkSource, Outcome, StatusError};
use super::notifier::MessageSender;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Status(#[from] StatusError),
}

impl CycleError {
    /// Upstream schema drift that needs an operator rather than a retry.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, CycleError::Status(StatusError::UnknownStatus { .. }))
    }
}

/// Everything the loop remembers between cycles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Lower bound (Unix seconds) for the next status query
    pub from_date: i64,
    /// Text of the last successfully delivered notification
    pub last_message: Option<String>,
}

impl PollState {
    pub fn starting_at(from_date: i64) -> Self {
        Self {
            from_date,
            last_message: None,
        }
    }
}

/// What a completed cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    NoRecords,
    Unchanged,
    Sent(String),
    /// Delivery failed; the status will be evaluated again next cycle.
    SendFailed,
}

/// Deliver `message`, remembering it only once the bot API accepted it.
/// Failures are logged here and never propagate.
pub async fn notify<N>(sender: &N, state: &mut PollState, message: String) -> bool
where
    N: MessageSender + ?Sized,
{
    match sender.send_message(&message).await {
        Ok(()) => {
            tracing::info!("Notification sent: {}", message);
            state.last_message = Some(message);
            true
        }
        Err(e) => {
            tracing::error!("Failed to send notification: {}", e);
            false
        }
    }
}

/// Run one poll cycle against `state`.
///
/// The window only advances when the cycle completes: a failed fetch, an
/// unknown status or a failed send leave `state` as it was so the same status
/// is looked at again next tick.
pub async fn run_cycle<S, N>(source: &S, sender: &N, state: &mut PollState) -> Result<CycleReport, CycleError>
where
    S: HomeworkSource + ?Sized,
    N: MessageSender + ?Sized,
{
    let report = source.fetch_statuses(state.from_date).await?;
    let next_from_date = report.current_date.unwrap_or_else(|| Utc::now().timestamp());

    let outcome = homework::diff(&report.homeworks, state.last_message.as_deref())?;
    let cycle = match outcome {
        Outcome::NoRecords => {
            tracing::debug!("No homework status changes since {}", state.from_date);
            CycleReport::NoRecords
        }
        Outcome::Unchanged => {
            tracing::debug!("Homework status unchanged, nothing to send");
            CycleReport::Unchanged
        }
        Outcome::Changed(message) => {
            if !notify(sender, state, message.clone()).await {
                return Ok(CycleReport::SendFailed);
            }
            CycleReport::Sent(message)
        }
    };

    state.from_date = next_from_date;
    Ok(cycle)
}

/// Log a cycle failure at the severity its kind calls for.
fn report_failure(err: &CycleError) {
    if err.is_contract_violation() {
        tracing::error!(severity = "critical", "Homework API contract violation: {}", err);
    } else {
        tracing::error!("Poll cycle failed: {}", err);
    }
}

pub struct Relay<S, N> {
    source: S,
    sender: N,
    period: Duration,
    state: PollState,
}

impl<S, N> Relay<S, N>
where
    S: HomeworkSource,
    N: MessageSender,
{
    pub fn new(source: S, sender: N, period: Duration, state: PollState) -> Self {
        Self {
            source,
            sender,
            period,
            state,
        }
    }

    /// Run a cycle immediately, then again `period` after each cycle ends,
    /// until `shutdown` resolves.
    /// Returns the final loop state.
    pub async fn run<F>(mut self, shutdown: F) -> PollState
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Starting poll loop (interval: {} s)", self.period.as_secs());

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, leaving poll loop");
                    break;
                }
                _ = ticker.tick() => {
                    tracing::info!("Polling homework statuses from {}", self.state.from_date);
                    if let Err(e) = run_cycle(&self.source, &self.sender, &mut self.state).await {
                        report_failure(&e);
                    }
                    // The wait is measured from the end of the cycle
                    ticker.reset();
                }
            }
        }

        self.state
    }
}
