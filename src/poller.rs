//! Task status polling loop
//!
//! [`TaskPoller`] repeatedly queries a task's status at a fixed cadence until
//! it reaches a terminal condition, resolving exactly one outcome per session:
//!
//! - `completed` from the server resolves [`PollOutcome::Completed`] immediately
//! - `failed` resolves [`PollOutcome::Failed`] immediately
//! - `pending`/`processing` schedules another query after the configured
//!   interval, until the attempt ceiling resolves [`PollOutcome::TimedOut`]
//! - a transport error ends the session with `Err` on first occurrence,
//!   unless [`PollConfig::retry_transport_errors`] is enabled
//! - cancellation resolves [`PollOutcome::Cancelled`]
//!
//! The waits are cooperative (`tokio::time::sleep`); no thread is blocked
//! between attempts. A poller is consumed by [`TaskPoller::run`], so a session
//! can never be reused after resolving.
//!
//! The status query is an injected capability ([`StatusQuery`]), so the state
//! machine is testable without any HTTP server;
//! [`DocumentClient`](crate::client::DocumentClient) is the production
//! implementation.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::types::{Event, PollOutcome, TaskId, TaskSnapshot, TaskStatus};

/// Message used when the server reports a failure without an error message
/// (the polled `failed` status and the legacy synchronous upload path share it)
pub const GENERIC_FAILURE_MESSAGE: &str = "failed to process document";

/// Capability to query the status of a processing task
///
/// Implemented by [`DocumentClient`](crate::client::DocumentClient) over HTTP;
/// tests inject scripted implementations.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    /// Fetch the current snapshot of the given task
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskSnapshot>;
}

#[async_trait]
impl<Q: StatusQuery + ?Sized> StatusQuery for std::sync::Arc<Q> {
    async fn task_status(&self, task_id: &TaskId) -> Result<TaskSnapshot> {
        (**self).task_status(task_id).await
    }
}

/// One poll session over an injected status query
///
/// Holds no presentation state; callers observe progress through the optional
/// event channel and act on the resolved [`PollOutcome`].
pub struct TaskPoller<Q> {
    query: Q,
    config: PollConfig,
    cancel: CancellationToken,
    events: Option<broadcast::Sender<Event>>,
}

impl<Q: StatusQuery> TaskPoller<Q> {
    /// Create a poller with its own cancellation token
    pub fn new(query: Q, config: PollConfig) -> Self {
        Self {
            query,
            config,
            cancel: CancellationToken::new(),
            events: None,
        }
    }

    /// Use an externally owned cancellation token
    ///
    /// Cancelling the token resolves the running session as
    /// [`PollOutcome::Cancelled`] without issuing further queries.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Emit an [`Event::StatusChecked`] on this channel after every query
    pub fn with_events(mut self, events: broadcast::Sender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// Clone of the session's cancellation token
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the poll session to its terminal outcome
    ///
    /// Consumes the poller: a session is never reused after resolving.
    /// Guaranteed to terminate within `max_attempts * interval` wall-clock
    /// time plus one query latency.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if `task_id` is empty (no query is issued)
    /// - a transport or API error from the status query, surfaced immediately
    ///   unless transport retries are enabled
    /// - [`Error::MalformedResponse`] if a `completed` snapshot carries no
    ///   result payload
    pub async fn run(self, task_id: &TaskId) -> Result<PollOutcome> {
        if task_id.is_empty() {
            return Err(Error::Validation("task id must not be empty".to_string()));
        }

        let mut attempts_made: u32 = 0;

        while attempts_made < self.config.max_attempts {
            if self.cancel.is_cancelled() {
                tracing::info!(task_id = %task_id, "poll session cancelled");
                return Ok(PollOutcome::Cancelled);
            }

            let attempt = attempts_made + 1;
            let snapshot = match self.query.task_status(task_id).await {
                Ok(snapshot) => snapshot,
                Err(e)
                    if e.is_transport()
                        && self.config.retry_transport_errors
                        && attempt < self.config.max_attempts =>
                {
                    tracing::warn!(
                        task_id = %task_id,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "status query failed, retrying on poll cadence"
                    );
                    attempts_made = attempt;
                    if !self.wait_for_next_attempt().await {
                        return Ok(PollOutcome::Cancelled);
                    }
                    continue;
                }
                Err(e) => {
                    tracing::error!(task_id = %task_id, attempt, error = %e, "status query failed");
                    return Err(e);
                }
            };
            attempts_made = attempt;

            tracing::debug!(
                task_id = %task_id,
                attempt,
                status = %snapshot.status,
                "status query completed"
            );
            if let Some(events) = &self.events {
                events
                    .send(Event::StatusChecked {
                        task_id: task_id.clone(),
                        attempt,
                        status: snapshot.status,
                    })
                    .ok();
            }

            match snapshot.status {
                TaskStatus::Completed => {
                    let result = snapshot.result.ok_or_else(|| {
                        Error::MalformedResponse(format!(
                            "task {task_id} completed without a result payload"
                        ))
                    })?;
                    tracing::info!(task_id = %task_id, attempts = attempts_made, "task completed");
                    return Ok(PollOutcome::Completed(result));
                }
                TaskStatus::Failed => {
                    let message = snapshot
                        .error
                        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                    tracing::warn!(task_id = %task_id, error = %message, "task failed");
                    return Ok(PollOutcome::Failed { message });
                }
                TaskStatus::Pending | TaskStatus::Processing => {
                    if attempts_made >= self.config.max_attempts {
                        break;
                    }
                    if !self.wait_for_next_attempt().await {
                        return Ok(PollOutcome::Cancelled);
                    }
                }
            }
        }

        tracing::warn!(
            task_id = %task_id,
            attempts = attempts_made,
            "attempt ceiling exhausted without a terminal status"
        );
        Ok(PollOutcome::TimedOut)
    }

    /// Sleep one poll interval; returns false if cancelled while waiting
    async fn wait_for_next_attempt(&self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.config.interval) => true,
        }
    }
}
