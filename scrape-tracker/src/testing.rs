//! Scripted doubles shared by the tracker's unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use scrape_client::{ClientError, Result};
use scrape_core::domain::outcome::NormalizedOutcome;
use scrape_core::domain::progress::ProgressSnapshot;
use scrape_core::domain::session::SessionId;
use scrape_core::dto::scrape::StartScrapeResponse;
use serde_json::Value as JsonValue;
use tokio::sync::Notify;

use crate::presentation::PresentationAdapter;
use crate::repository::JobRepository;

/// One scripted answer to a progress request
pub(crate) enum Step {
    Snapshot(ProgressSnapshot),
    Status(u16),
    Delayed(Duration, ProgressSnapshot),
    Gated(Arc<Notify>, ProgressSnapshot),
    /// The request task panics
    Panic,
}

pub(crate) enum StartReply {
    Accept(String),
    Reject(Option<String>),
    Status(u16),
}

pub(crate) fn running(percentage: i64) -> ProgressSnapshot {
    ProgressSnapshot {
        percentage,
        status: "scraping".to_string(),
        current_action: format!("step {}", percentage),
        ..Default::default()
    }
}

pub(crate) fn terminal(value: JsonValue) -> ProgressSnapshot {
    let mut snapshot: ProgressSnapshot = serde_json::from_value(value).unwrap();
    snapshot.completed = true;
    snapshot
}

/// Repository that replays scripted responses per session
#[derive(Default)]
pub(crate) struct ScriptedRepository {
    starts: Mutex<VecDeque<StartReply>>,
    scripts: Mutex<HashMap<SessionId, VecDeque<Step>>>,
    polls: Mutex<HashMap<SessionId, usize>>,
    start_calls: AtomicUsize,
    cleanup_calls: AtomicUsize,
    cleanup_delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRepository {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn accept(self, session: &str) -> Self {
        self.push_start(StartReply::Accept(session.to_string()))
    }

    pub(crate) fn reject(self, message: Option<&str>) -> Self {
        self.push_start(StartReply::Reject(message.map(str::to_string)))
    }

    pub(crate) fn fail_start(self, status: u16) -> Self {
        self.push_start(StartReply::Status(status))
    }

    pub(crate) fn script(self, session: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(SessionId::new(session), steps.into());
        self
    }

    /// Cleanup takes `delay` before it completes
    pub(crate) fn slow_cleanup(mut self, delay: Duration) -> Self {
        self.cleanup_delay = Some(delay);
        self
    }

    fn push_start(self, reply: StartReply) -> Self {
        self.starts.lock().unwrap().push_back(reply);
        self
    }

    pub(crate) fn poll_count(&self, session: &str) -> usize {
        self.polls
            .lock()
            .unwrap()
            .get(&SessionId::new(session))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn start_count(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// Cleanups that ran to completion
    pub(crate) fn cleanup_count(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRepository for ScriptedRepository {
    async fn start_job(&self, _target_url: &str) -> Result<StartScrapeResponse> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .starts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StartReply::Reject(None));

        match reply {
            StartReply::Accept(session) => Ok(StartScrapeResponse {
                success: true,
                session_id: Some(SessionId::new(session)),
                error: None,
            }),
            StartReply::Reject(error) => Ok(StartScrapeResponse {
                success: false,
                session_id: None,
                error,
            }),
            StartReply::Status(status) => Err(ClientError::api_error(status, "Bad Gateway")),
        }
    }

    async fn fetch_progress(&self, session_id: &SessionId) -> Result<ProgressSnapshot> {
        *self
            .polls
            .lock()
            .unwrap()
            .entry(session_id.clone())
            .or_default() += 1;
        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(session_id)
            .and_then(|steps| steps.pop_front());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match step {
            None => Ok(running(0)),
            Some(Step::Snapshot(snapshot)) => Ok(snapshot),
            Some(Step::Status(status)) => Err(ClientError::api_error(status, "scripted failure")),
            Some(Step::Delayed(delay, snapshot)) => {
                tokio::time::sleep(delay).await;
                Ok(snapshot)
            }
            Some(Step::Gated(gate, snapshot)) => {
                gate.notified().await;
                Ok(snapshot)
            }
            Some(Step::Panic) => panic!("scripted poll panic"),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn cleanup(&self) -> Result<()> {
        if let Some(delay) = self.cleanup_delay {
            tokio::time::sleep(delay).await;
        }
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Everything a presenter was asked to show
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Shown {
    Reset,
    Progress(i64),
    Outcome(NormalizedOutcome),
    StartError(String),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingPresenter {
    pub(crate) shown: Vec<Shown>,
}

impl RecordingPresenter {
    pub(crate) fn progress(&self) -> Vec<i64> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn outcomes(&self) -> Vec<&NormalizedOutcome> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Outcome(o) => Some(o),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn start_errors(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::StartError(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl PresentationAdapter for RecordingPresenter {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.shown.push(Shown::Progress(snapshot.percentage));
    }

    fn on_outcome(&mut self, outcome: &NormalizedOutcome) {
        self.shown.push(Shown::Outcome(outcome.clone()));
    }

    fn on_start_error(&mut self, message: &str) {
        self.shown.push(Shown::StartError(message.to_string()));
    }

    fn reset_presentation(&mut self) {
        self.shown.push(Shown::Reset);
    }
}

/// Wait until `condition` holds, giving up after a second
pub(crate) async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}
