//! Typed errors surfaced by the planner. Configuration mistakes and problem
//! precondition violations are reported through [`PlannerError`] instead of
//! panicking, except where the spec explicitly calls for a hard failure in
//! debug builds (see [`PlannerError::BoundAdmissibility`]).

/// Errors the core recognizes, grouped the way the design calls for:
/// configuration mistakes caught before planning starts, precondition
/// violations raised by a misbehaving [`Problem`](crate::Problem)
/// implementation, and admissibility violations detected during a backup.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// An invalid strategy/value-representation combination or a malformed
    /// numeric option was supplied. Surfaced before any planning begins.
    #[error("invalid planner configuration: {0}")]
    Configuration(String),

    /// The `Problem` implementation violated one of its preconditions: an
    /// out-of-range action index, outcome probabilities that do not sum to 1,
    /// or a NaN reward. Fatal; the core never attempts to repair this.
    #[error("problem precondition violated: {0}")]
    Precondition(String),

    /// A backup attempted to raise `ub_val` above its previous value (or
    /// lower `lb_val` below its previous value) by more than numerical slack.
    /// Only ever returned when compiled with debug assertions; in release
    /// builds the offending bound is clamped to its previous value instead
    /// and a `warn!` log line records the clamp.
    #[error("bound admissibility violated at {state_repr}: previous={previous}, attempted={attempted}")]
    BoundAdmissibility {
        state_repr: String,
        previous: f64,
        attempted: f64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlannerError>;
