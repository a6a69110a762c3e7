//! Job client
//!
//! Owns the lifecycle of one scrape job at a time: starts it, spawns its
//! progress poller, forwards progress to the presentation adapter and turns
//! the terminal poll into exactly one outcome.
//!
//! The current session is a plain field of the client. The poller and the
//! reconciler only ever receive it as a parameter, and every poll event is
//! checked against it before anything is shown.
//!
//! Each session gets its own event channel whose only sender lives in the
//! poller task. A poller that dies without a terminal event closes the
//! channel, and tracking ends in a `Failure` outcome.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use scrape_core::domain::outcome::{NormalizedOutcome, OutcomeStatus};
use scrape_core::domain::phase::JobPhase;
use scrape_core::domain::progress::ProgressSnapshot;
use scrape_core::domain::session::SessionId;
use scrape_core::reconcile::{reconcile_failure, reconcile_snapshot};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::TrackerConfig;
use crate::error::{PollError, StartError};
use crate::presentation::PresentationAdapter;
use crate::repository::{HttpJobRepository, JobRepository};
use crate::scheduler::{PollEvent, PollerHandle, ProgressPoller, SessionEvent};

/// The job currently being tracked
#[derive(Debug, Clone)]
pub struct JobSession {
    pub session_id: SessionId,
    pub target_url: String,
    pub started_at: DateTime<Utc>,
}

impl JobSession {
    /// Time since the server accepted the job
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.started_at)
    }
}

/// Starts scrape jobs and tracks them to a single outcome
pub struct JobClient<P: PresentationAdapter> {
    repository: Arc<dyn JobRepository>,
    poller: ProgressPoller,
    presenter: P,
    cleanup_after_outcome: bool,
    phase: JobPhase,
    session: Option<JobSession>,
    poller_handle: Option<PollerHandle>,
    last_progress: Option<ProgressSnapshot>,
    last_outcome: Option<NormalizedOutcome>,
    events: Option<mpsc::UnboundedReceiver<SessionEvent>>,
    cleanup_task: Option<JoinHandle<()>>,
}

impl<P: PresentationAdapter> JobClient<P> {
    /// Creates a job client over any repository
    ///
    /// Fails when the configuration does not validate.
    pub fn new(
        repository: Arc<dyn JobRepository>,
        presenter: P,
        config: &TrackerConfig,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let poller = ProgressPoller::new(Arc::clone(&repository), config.poll_interval);

        Ok(Self {
            repository,
            poller,
            presenter,
            cleanup_after_outcome: config.cleanup_after_outcome,
            phase: JobPhase::Idle,
            session: None,
            poller_handle: None,
            last_progress: None,
            last_outcome: None,
            events: None,
            cleanup_task: None,
        })
    }

    /// Creates a job client talking HTTP to the configured server
    pub fn from_config(config: &TrackerConfig, presenter: P) -> anyhow::Result<Self> {
        let repository = HttpJobRepository::from_config(config)?;
        Self::new(Arc::new(repository), presenter, config)
    }

    // =============================================================================
    // Accessors
    // =============================================================================

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    /// The job being tracked, if any
    pub fn session(&self) -> Option<&JobSession> {
        self.session.as_ref()
    }

    /// Outcome of the last finished job, cleared when a new one starts
    pub fn last_outcome(&self) -> Option<&NormalizedOutcome> {
        self.last_outcome.as_ref()
    }

    /// Latest non-terminal snapshot of the current job
    pub fn last_progress(&self) -> Option<&ProgressSnapshot> {
        self.last_progress.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Whether a poller is still bound to the current job
    pub fn is_polling(&self) -> bool {
        self.poller_handle
            .as_ref()
            .is_some_and(PollerHandle::is_running)
    }

    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Starts a scrape job for `target_url` and begins tracking it
    ///
    /// Any previous job is dropped first: its poller is stopped and the
    /// presentation is reset. A late response from that job is ignored.
    ///
    /// # Arguments
    /// * `target_url` - Absolute URL of the page to scrape
    ///
    /// # Returns
    /// The session issued by the server
    pub async fn start_job(&mut self, target_url: &str) -> Result<SessionId, StartError> {
        self.reset();

        let target_url = target_url.trim();
        if let Err(e) = Url::parse(target_url) {
            return Err(self.fail_start(StartError::InvalidUrl {
                url: target_url.to_string(),
                reason: e.to_string(),
            }));
        }

        self.transition(JobPhase::Starting);
        info!("Starting scrape job for {}", target_url);

        let ack = match self.repository.start_job(target_url).await {
            Ok(ack) => ack,
            Err(e) => {
                error!("Start request for {} failed: {}", target_url, e);
                return Err(self.fail_start(StartError::Transport(e)));
            }
        };

        let Some(session_id) = ack.accepted_session().cloned() else {
            warn!(
                "Server refused job for {}: {}",
                target_url,
                ack.error.as_deref().unwrap_or("no reason given")
            );
            return Err(self.fail_start(StartError::rejected(ack.error.as_deref())));
        };

        info!("Job accepted, session {}", session_id);

        self.session = Some(JobSession {
            session_id: session_id.clone(),
            target_url: target_url.to_string(),
            started_at: Utc::now(),
        });
        self.transition(JobPhase::Tracking);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.events = Some(events_rx);
        self.poller_handle = Some(self.poller.spawn(session_id.clone(), events_tx));

        Ok(session_id)
    }

    /// Drives the current job until it produces its outcome
    ///
    /// Progress snapshots are forwarded to the presenter in arrival order.
    /// Returns `None` when no job is being tracked (never started, already
    /// finished, or cancelled).
    pub async fn track(&mut self) -> Option<NormalizedOutcome> {
        loop {
            let current = self.session.as_ref()?.session_id.clone();
            if self.phase != JobPhase::Tracking {
                return None;
            }

            let received = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => None,
            };
            let Some(tagged) = received else {
                error!("Progress poller for session {} exited without a result", current);
                return Some(self.fail(&PollError::PollerStopped));
            };
            if tagged.session_id != current {
                warn!(
                    "Discarding late event for stale session {} (current: {})",
                    tagged.session_id, current
                );
                continue;
            }

            match tagged.event {
                PollEvent::Progress(snapshot) => self.present_progress(snapshot),
                PollEvent::Completed(snapshot) => return Some(self.complete(&snapshot)),
                PollEvent::Failed(error) => return Some(self.fail(&error)),
            }
        }
    }

    /// Stops tracking the current job without producing an outcome
    ///
    /// Safe to call at any time, any number of times.
    pub fn cancel(&mut self) {
        if let Some(session) = &self.session {
            info!("Cancelling tracking of session {}", session.session_id);
        }
        self.stop_polling();
        self.events = None;
        self.session = None;
        if self.phase == JobPhase::Tracking || self.phase == JobPhase::Starting {
            self.transition(JobPhase::Idle);
        }
    }

    /// Waits up to `timeout` for the cleanup started after the last outcome
    ///
    /// Call this before shutting the runtime down, otherwise the request may
    /// be cancelled in flight. Returns `false` if the cleanup was still
    /// running when the timeout expired; it is left running in that case.
    pub async fn finish_cleanup(&mut self, timeout: Duration) -> bool {
        let Some(task) = self.cleanup_task.as_mut() else {
            return true;
        };

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(())) => {
                self.cleanup_task = None;
                true
            }
            Ok(Err(e)) => {
                warn!("Server cleanup task failed: {}", e);
                self.cleanup_task = None;
                true
            }
            Err(_) => {
                warn!("Server cleanup still running after {:?}", timeout);
                false
            }
        }
    }

    /// Asks the server to delete old files, without waiting for the answer
    ///
    /// Failures are logged and otherwise ignored.
    pub fn cleanup(&self) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        tokio::spawn(async move {
            match repository.cleanup().await {
                Ok(()) => debug!("Server cleanup finished"),
                Err(e) => warn!("Server cleanup failed: {}", e),
            }
        })
    }

    // =============================================================================
    // Internals
    // =============================================================================

    /// Drops every trace of the previous job
    fn reset(&mut self) {
        self.stop_polling();
        self.events = None;
        self.session = None;
        self.last_progress = None;
        self.last_outcome = None;
        if self.phase != JobPhase::Idle {
            self.transition(JobPhase::Idle);
        }
        self.presenter.reset_presentation();
    }

    fn fail_start(&mut self, error: StartError) -> StartError {
        self.presenter.on_start_error(&error.user_message());
        if self.phase == JobPhase::Starting {
            self.transition(JobPhase::Idle);
        }
        error
    }

    fn present_progress(&mut self, snapshot: ProgressSnapshot) {
        if let Some(previous) = &self.last_progress {
            if snapshot.percentage < previous.percentage {
                debug!(
                    "Progress went backwards: {}% -> {}%",
                    previous.percentage, snapshot.percentage
                );
            }
        }
        self.presenter.on_progress(&snapshot);
        self.last_progress = Some(snapshot);
    }

    fn complete(&mut self, snapshot: &ProgressSnapshot) -> NormalizedOutcome {
        self.transition(JobPhase::Reconciling);
        let outcome = reconcile_snapshot(snapshot);
        self.stop_polling();
        self.events = None;
        self.session = None;
        self.transition(JobPhase::Done);

        match outcome.status {
            OutcomeStatus::Success if outcome.diagnostic.is_clean() => {
                info!("Job finished: {}", outcome.message);
            }
            _ => {
                warn!(
                    "Job finished via {:?} with flags {:?} (result count: {:?}, top-level count: {:?})",
                    outcome.diagnostic.branch,
                    outcome.diagnostic.flags,
                    outcome.diagnostic.raw_result_count,
                    outcome.diagnostic.raw_top_level_count
                );
            }
        }

        self.finish(outcome)
    }

    fn fail(&mut self, error: &PollError) -> NormalizedOutcome {
        let detail = error.to_string();
        let outcome = reconcile_failure(error.user_message(), Some(detail.as_str()));
        self.stop_polling();
        self.events = None;
        self.session = None;
        self.transition(JobPhase::Failed);

        error!("Job tracking failed: {}", detail);

        self.finish(outcome)
    }

    fn finish(&mut self, outcome: NormalizedOutcome) -> NormalizedOutcome {
        self.presenter.on_outcome(&outcome);
        self.last_outcome = Some(outcome.clone());

        if self.cleanup_after_outcome && !outcome.is_failure() {
            self.cleanup_task = Some(self.cleanup());
        }

        outcome
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poller_handle.take() {
            handle.stop();
        }
    }

    fn transition(&mut self, next: JobPhase) {
        if !self.phase.can_transition_to(next) {
            warn!("Ignoring illegal phase transition {} -> {}", self.phase, next);
            return;
        }
        debug!("Phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}
