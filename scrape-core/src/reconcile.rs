//! Result reconciliation
//!
//! Turns the terminal state of a job into exactly one [`NormalizedOutcome`].
//!
//! The server does not always fill in the terminal snapshot: it may report
//! `completed` without a `result` object, or a `result` with `success: false`
//! even though a file was written. Completed work is never discarded in those
//! cases; they become [`OutcomeStatus::SuccessFallback`] with the count taken
//! from the top-level `clinic_count`.
//!
//! | Terminal payload | Branch | Count source | Status |
//! |---|---|---|---|
//! | [`TerminalPayload::Confirmed`] | `Primary` | `result.clinic_count` | `Success` |
//! | [`TerminalPayload::Unconfirmed`] | `ResultNotConfirmed` | top-level `clinic_count` | `SuccessFallback` |
//! | [`TerminalPayload::Missing`] | `ResultMissing` | top-level `clinic_count` | `SuccessFallback` |
//! | [`TerminalPayload::PollFailed`] | `PollFailed` | none | `Failure` |
//!
//! Everything here is a pure function of its input.

use serde_json::Value as JsonValue;

use crate::domain::outcome::{
    Diagnostic, DiagnosticFlag, DownloadRef, NormalizedOutcome, OutcomeStatus, ReconcileBranch,
};
use crate::domain::progress::{ProgressSnapshot, ResultPayload};

/// Terminal state of a job, classified by the shape of its payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminalPayload<'a> {
    /// `result` present with `success == true`
    Confirmed {
        result: &'a ResultPayload,
        top_level_count: Option<&'a JsonValue>,
    },
    /// `result` present with `success == false`
    Unconfirmed {
        result: &'a ResultPayload,
        top_level_count: Option<&'a JsonValue>,
    },
    /// `completed` without any `result`
    Missing {
        top_level_count: Option<&'a JsonValue>,
    },
    /// Polling stopped on a transport or HTTP failure
    PollFailed {
        /// Text shown to the user
        message: &'a str,
        /// Underlying error, kept for the diagnostic
        detail: Option<&'a str>,
    },
}

impl<'a> TerminalPayload<'a> {
    /// Classify a terminal snapshot
    pub fn from_snapshot(snapshot: &'a ProgressSnapshot) -> Self {
        let top_level_count = snapshot.clinic_count.as_ref();

        match &snapshot.result {
            Some(result) if result.success => TerminalPayload::Confirmed {
                result,
                top_level_count,
            },
            Some(result) => TerminalPayload::Unconfirmed {
                result,
                top_level_count,
            },
            None => TerminalPayload::Missing { top_level_count },
        }
    }

    pub fn branch(&self) -> ReconcileBranch {
        match self {
            TerminalPayload::Confirmed { .. } => ReconcileBranch::Primary,
            TerminalPayload::Unconfirmed { .. } => ReconcileBranch::ResultNotConfirmed,
            TerminalPayload::Missing { .. } => ReconcileBranch::ResultMissing,
            TerminalPayload::PollFailed { .. } => ReconcileBranch::PollFailed,
        }
    }
}

/// Reconcile a terminal snapshot
pub fn reconcile_snapshot(snapshot: &ProgressSnapshot) -> NormalizedOutcome {
    reconcile(&TerminalPayload::from_snapshot(snapshot))
}

/// Reconcile a polling failure
pub fn reconcile_failure(message: &str, detail: Option<&str>) -> NormalizedOutcome {
    reconcile(&TerminalPayload::PollFailed { message, detail })
}

/// Produce the single outcome for a terminal payload
pub fn reconcile(payload: &TerminalPayload<'_>) -> NormalizedOutcome {
    let mut diagnostic = Diagnostic::new(payload.branch());

    match *payload {
        TerminalPayload::Confirmed {
            result,
            top_level_count,
        } => {
            diagnostic.raw_result_count = result.clinic_count.clone();
            diagnostic.raw_top_level_count = top_level_count.cloned();
            diagnostic.server_error = result.error.clone();

            let count = apply_count(result.clinic_count.as_ref(), &mut diagnostic);
            let download = download_from(result, &mut diagnostic);

            NormalizedOutcome::succeeded(
                OutcomeStatus::Success,
                count,
                download,
                success_message(count),
                diagnostic,
            )
        }
        TerminalPayload::Unconfirmed {
            result,
            top_level_count,
        } => {
            diagnostic.raw_result_count = result.clinic_count.clone();
            diagnostic.raw_top_level_count = top_level_count.cloned();
            diagnostic.server_error = result.error.clone();

            let count = apply_count(top_level_count, &mut diagnostic);
            let download = download_from(result, &mut diagnostic);

            NormalizedOutcome::succeeded(
                OutcomeStatus::SuccessFallback,
                count,
                download,
                fallback_message(count, result.error.as_deref()),
                diagnostic,
            )
        }
        TerminalPayload::Missing { top_level_count } => {
            diagnostic.raw_top_level_count = top_level_count.cloned();

            let count = apply_count(top_level_count, &mut diagnostic);
            diagnostic.flag(DiagnosticFlag::DownloadMissing);

            NormalizedOutcome::succeeded(
                OutcomeStatus::SuccessFallback,
                count,
                None,
                fallback_message(count, None),
                diagnostic,
            )
        }
        TerminalPayload::PollFailed { message, detail } => {
            diagnostic.server_error = detail.map(str::to_string);
            NormalizedOutcome::failed(message, diagnostic)
        }
    }
}

/// A count read from a loosely typed JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoercedCount {
    pub value: u64,
    /// Set when the raw value was not a plain non-negative integer
    pub flag: Option<DiagnosticFlag>,
}

impl CoercedCount {
    fn exact(value: u64) -> Self {
        Self { value, flag: None }
    }

    fn coerced(value: u64) -> Self {
        Self {
            value,
            flag: Some(DiagnosticFlag::CoercedCount),
        }
    }

    fn zero(flag: DiagnosticFlag) -> Self {
        Self {
            value: 0,
            flag: Some(flag),
        }
    }
}

/// Read an item count, falling back to 0 for anything unusable
pub fn coerce_count(raw: Option<&JsonValue>) -> CoercedCount {
    match raw {
        None | Some(JsonValue::Null) => CoercedCount::zero(DiagnosticFlag::MissingCount),
        Some(JsonValue::Number(number)) => {
            if let Some(n) = number.as_u64() {
                CoercedCount::exact(n)
            } else if number.as_i64().is_some() {
                CoercedCount::zero(DiagnosticFlag::NegativeCount)
            } else {
                match number.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 => CoercedCount::coerced(f.trunc() as u64),
                    Some(f) if f.is_finite() => CoercedCount::zero(DiagnosticFlag::NegativeCount),
                    _ => CoercedCount::zero(DiagnosticFlag::NonNumericCount),
                }
            }
        }
        Some(JsonValue::String(text)) => coerce_count_text(text),
        Some(_) => CoercedCount::zero(DiagnosticFlag::NonNumericCount),
    }
}

/// Leading-digit parse of a textual count, so `"12"` and `"12 clinics"` both read as 12
fn coerce_count_text(text: &str) -> CoercedCount {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: &str = {
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());
        &unsigned[..end]
    };

    if digits.is_empty() {
        let negative = trimmed
            .strip_prefix('-')
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()));
        return if negative {
            CoercedCount::zero(DiagnosticFlag::NegativeCount)
        } else {
            CoercedCount::zero(DiagnosticFlag::NonNumericCount)
        };
    }

    match digits.parse::<u64>() {
        Ok(n) => CoercedCount::coerced(n),
        Err(_) => CoercedCount::zero(DiagnosticFlag::NonNumericCount),
    }
}

fn apply_count(raw: Option<&JsonValue>, diagnostic: &mut Diagnostic) -> u64 {
    let count = coerce_count(raw);
    if let Some(flag) = count.flag {
        diagnostic.flag(flag);
    }
    if count.value == 0 {
        diagnostic.flag(DiagnosticFlag::ZeroCount);
    }
    count.value
}

fn download_from(result: &ResultPayload, diagnostic: &mut Diagnostic) -> Option<DownloadRef> {
    let url = result
        .download_url
        .as_deref()
        .map(str::trim)
        .filter(|url| is_download_target(url));
    let filename = result
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match (url, filename) {
        (Some(url), Some(filename)) => Some(DownloadRef {
            url: url.to_string(),
            filename: filename.to_string(),
        }),
        _ => {
            diagnostic.flag(DiagnosticFlag::DownloadMissing);
            None
        }
    }
}

/// `"#"` is what the server's own fallbacks put in place of a real link
fn is_download_target(url: &str) -> bool {
    !url.is_empty() && url != "#"
}

fn success_message(count: u64) -> String {
    if count == 0 {
        "Warning: the job finished with 0 clinic records. The count may have been lost in transit."
            .to_string()
    } else {
        format!("Collected {} clinic records.", count)
    }
}

fn fallback_message(count: u64, server_error: Option<&str>) -> String {
    let mut message = format!(
        "Warning: the server did not confirm the result; recovered {} clinic records from progress data.",
        count
    );
    if let Some(error) = server_error.filter(|e| !e.trim().is_empty()) {
        message.push_str(&format!(" Server reported: {}", error.trim()));
    }
    message
}
