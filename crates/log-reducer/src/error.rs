use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

/// Failure taxonomy for log reduction.
///
/// Every variant is fatal: the inputs are already-written simulator logs, so
/// retrying without fixing the input would reproduce the same failure.
#[derive(Debug, Error)]
pub enum Error {
    /// A row or field could not be parsed into its declared column type.
    #[error("malformed input: {0}")]
    Parse(#[from] csv::Error),
    /// A field parsed but carries an out-of-range or unrecognized value.
    #[error("{key}: {message}")]
    Format { key: String, message: String },
    /// Sequence numbers or timestamps broke the in-order arrival invariant.
    #[error("{key}: {message}")]
    Sequence { key: String, message: String },
    /// Pre-aggregated intervals do not form a gapless partition of time.
    #[error(
        "{key}: intervals do not match up (expected start {expected_ns} ns, found {actual_ns} ns)"
    )]
    Contiguity {
        key: String,
        expected_ns: u64,
        actual_ns: u64,
    },
    /// The entity filter matched zero records, which is distinct from a
    /// legitimately empty result: downstream must be able to tell a bad key
    /// from no activity.
    #[error("no entries found for {key}")]
    NoData { key: String },
    /// An interval with non-positive width reached the step emitter.
    #[error("{key}: interval [{start_ns} ns, {end_ns} ns) has non-positive width")]
    InvertedInterval {
        key: String,
        start_ns: u64,
        end_ns: u64,
    },
    /// A zero-width interval reached rate conversion.
    #[error("{key}: zero-width interval at {start_ns} ns in rate conversion")]
    ZeroWidth { key: String, start_ns: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
