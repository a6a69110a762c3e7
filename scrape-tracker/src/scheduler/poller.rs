//! Progress poller
//!
//! Polls the scrape server for the progress of one session on a fixed
//! interval. Each poller runs in its own task, bound to a single session id
//! and a cancellation token.
//!
//! Stop conditions, in priority order:
//! 1. the progress request fails (transport or HTTP status),
//! 2. the snapshot reports `completed`,
//! 3. the handle is stopped.
//!
//! A failed poll is not retried; the first failure ends tracking.

use std::sync::Arc;

use scrape_core::domain::progress::ProgressSnapshot;
use scrape_core::domain::session::SessionId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::PollError;
use crate::repository::JobRepository;

/// What one poll produced
#[derive(Debug)]
pub enum PollEvent {
    /// The job is still running
    Progress(ProgressSnapshot),
    /// The job reported completion; polling has stopped
    Completed(ProgressSnapshot),
    /// The request failed; polling has stopped
    Failed(PollError),
}

impl PollEvent {
    /// Whether this event ends polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollEvent::Progress(_))
    }
}

/// A poll event tagged with the session it belongs to
///
/// Consumers compare the tag with their current session before acting, so a
/// response that arrives after its job was replaced is ignored.
#[derive(Debug)]
pub struct SessionEvent {
    pub session_id: SessionId,
    pub event: PollEvent,
}

/// Spawns per-session polling tasks
pub struct ProgressPoller {
    repository: Arc<dyn JobRepository>,
    interval: Duration,
}

impl ProgressPoller {
    /// Creates a new progress poller
    pub fn new(repository: Arc<dyn JobRepository>, interval: Duration) -> Self {
        Self {
            repository,
            interval,
        }
    }

    /// Poll cadence
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling `session_id`, sending every event to `events`
    ///
    /// The first poll is issued immediately. Each poll is awaited before the
    /// next tick is taken, so a session never has two requests in flight;
    /// ticks missed while a slow request is pending are skipped.
    pub fn spawn(
        &self,
        session_id: SessionId,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> PollerHandle {
        let token = CancellationToken::new();

        info!(
            "Starting progress poller for session {} (interval: {:?})",
            session_id, self.interval
        );

        let task = tokio::spawn(Self::run(
            Arc::clone(&self.repository),
            self.interval,
            session_id.clone(),
            events,
            token.clone(),
        ));

        PollerHandle {
            session_id,
            token,
            task: Some(task),
        }
    }

    /// Polling loop for one session
    async fn run(
        repository: Arc<dyn JobRepository>,
        interval: Duration,
        session_id: SessionId,
        events: mpsc::UnboundedSender<SessionEvent>,
        token: CancellationToken,
    ) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut polls: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Poller for session {} stopped after {} poll(s)", session_id, polls);
                    return;
                }
                _ = ticker.tick() => {}
            }

            polls += 1;
            debug!("Polling progress for session {} (poll #{})", session_id, polls);

            let event = match repository.fetch_progress(&session_id).await {
                Err(e) => {
                    error!("Progress poll for session {} failed: {}", session_id, e);
                    PollEvent::Failed(PollError::from(e))
                }
                Ok(snapshot) if snapshot.is_terminal() => {
                    info!(
                        "Session {} reported completion after {} poll(s)",
                        session_id, polls
                    );
                    PollEvent::Completed(snapshot)
                }
                Ok(snapshot) => {
                    debug!(
                        "Session {}: {}% {} {}",
                        session_id, snapshot.percentage, snapshot.status, snapshot.current_action
                    );
                    PollEvent::Progress(snapshot)
                }
            };

            let terminal = event.is_terminal();
            let tagged = SessionEvent {
                session_id: session_id.clone(),
                event,
            };

            if events.send(tagged).is_err() {
                debug!("Event receiver for session {} is gone, stopping", session_id);
                return;
            }

            if terminal {
                return;
            }
        }
    }
}

/// Handle to a running poller
///
/// Dropping the handle stops the poller.
#[derive(Debug)]
pub struct PollerHandle {
    session_id: SessionId,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// The session this poller is bound to
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Stops polling
    ///
    /// Idempotent: stopping an already stopped or finished poller does
    /// nothing. A request already in flight is allowed to complete.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            debug!("Stopping poller for session {}", self.session_id);
            self.token.cancel();
        }
    }

    /// Whether the poller may still issue requests
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stops the poller and waits for its task to exit
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Poller task for session {} panicked: {}", self.session_id, e);
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
