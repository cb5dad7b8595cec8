// src/error.rs

use thiserror::Error;

use crate::core::models::{AssessmentReport, PartialReason};

/// Failures surfaced across the engine boundary.
///
/// Two failure classes deliberately never appear here: individual probe
/// errors (downgraded to "not open" and logged at debug) and ICMP probe
/// errors (downgraded to an `Unknown` fingerprint carrying the reason). Only
/// the orchestrator converts anything into an error the caller sees.
#[derive(Debug, Error)]
pub enum AssessError {
    /// Target string is neither a parseable IP literal nor a resolvable
    /// hostname. Raised before any probing happens; the caller should treat
    /// it as a client-side rejection, not an engine failure.
    #[error("invalid target address: {0}")]
    InvalidTarget(String),

    /// Port range option string could not be parsed.
    #[error("invalid port range \"{input}\": {reason}")]
    InvalidPortRange { input: String, reason: String },

    /// The assessment hit its deadline or was cancelled mid-scan. The partial
    /// report carries everything gathered up to that point, explicitly marked
    /// partial.
    #[error("assessment interrupted ({reason}); partial results attached")]
    Partial {
        reason: PartialReason,
        report: Box<AssessmentReport>,
    },

    /// Unexpected failure caught at the orchestrator boundary (e.g. a
    /// panicked assessment task). The text is preserved verbatim so the
    /// caller can record it as the failed run's sole finding.
    #[error("assessment failed: {0}")]
    Internal(String),
}
