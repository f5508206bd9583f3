use chrono::NaiveDate;

pub type Result<T> = std::result::Result<T, CounterError>;

/// Errors raised by the counting core. None of them are retried: they point
/// at malformed input or a broken invariant and surface unchanged to the caller.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    #[error("series is not continuous: {previous} is followed by {next}")]
    DiscontinuousSeries { previous: NaiveDate, next: NaiveDate },

    #[error("day {0} not found in series")]
    DayNotFound(NaiveDate),

    #[error("series is empty")]
    EmptySeries,

    #[error("rank must be strictly smaller than population size (rank {rank}, population {population})")]
    RankOutOfRange { rank: usize, population: usize },

    #[error("value {0} not found among ranked values")]
    RankTargetMissing(u64),

    #[error("need at least one event to elect one")]
    NoEvents,

    #[error("message has {length} characters, maximum is {max}")]
    MessageTooLong { length: usize, max: usize },

    #[error("hashtag must start with '#', received {0:?}")]
    InvalidHashtag(String),

    #[error("expecting a fraction between 0 and 1, received {0}")]
    FractionOutOfRange(f64),

    #[error("invalid date {value:?}, expected format {format}")]
    InvalidDate { value: String, format: &'static str },

    #[error("invalid count {0:?}")]
    InvalidCount(String),

    #[error("malformed record {0:?}")]
    MalformedRecord(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}
