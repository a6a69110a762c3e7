//! Presentation adapter
//!
//! The tracker never renders anything itself. Whatever surface shows the job
//! (a terminal, a GUI, a test recorder) implements this trait and receives
//! progress and outcomes from the [`JobClient`](crate::JobClient).

use scrape_core::domain::outcome::NormalizedOutcome;
use scrape_core::domain::progress::ProgressSnapshot;

/// Surface that displays a job to the user
///
/// Calls arrive in order from a single task:
/// `reset_presentation`, then zero or more `on_progress`, then exactly one of
/// `on_outcome` or `on_start_error` (or nothing, if the job is cancelled).
pub trait PresentationAdapter: Send {
    /// Called for every non-terminal snapshot, even unchanged ones
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);

    /// Called once per job with its final outcome
    fn on_outcome(&mut self, outcome: &NormalizedOutcome);

    /// Called when a job could not be started
    fn on_start_error(&mut self, message: &str);

    /// Clear progress, outcome and error from a previous job
    fn reset_presentation(&mut self);
}

impl<P: PresentationAdapter + ?Sized> PresentationAdapter for Box<P> {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        (**self).on_progress(snapshot)
    }

    fn on_outcome(&mut self, outcome: &NormalizedOutcome) {
        (**self).on_outcome(outcome)
    }

    fn on_start_error(&mut self, message: &str) {
        (**self).on_start_error(message)
    }

    fn reset_presentation(&mut self) {
        (**self).reset_presentation()
    }
}
