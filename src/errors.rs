use crate::body::BodyId;
use thiserror::Error;

/// A catalog record the core must never see. Raised at the ingestion
/// boundary, before a body is admitted to the population.
#[derive(Debug, PartialEq, Error)]
pub enum InvalidBodyError {
    #[error("semimajor axis {axis_m} m is not positive")]
    NonPositiveSemimajorAxis { axis_m: f64 },

    #[error("semimajor axis {axis_m} m is outside the LEO range [{min_m} m, {max_m} m]")]
    SemimajorAxisOutOfRange { axis_m: f64, min_m: f64, max_m: f64 },

    #[error("non-finite value for '{field}'")]
    NonFinite { field: &'static str },

    #[error("malformed catalog record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum SimError {
    /// Propagation produced a non-finite position. Fatal for the run; NaNs
    /// must not reach the collision checks where comparisons would mask hits.
    #[error("non-finite position for body {id} at t={timestamp_secs} s")]
    Propagation { id: BodyId, timestamp_secs: f64 },

    /// The id allocator handed out an id at or below one already in the
    /// population. Cannot happen while allocation is monotonic and
    /// single-threaded; fatal if observed.
    #[error("id allocation regressed: {id} already in use")]
    IdAllocation { id: BodyId },

    #[error(transparent)]
    InvalidBody(#[from] InvalidBodyError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
