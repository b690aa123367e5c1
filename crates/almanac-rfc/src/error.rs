use thiserror::Error;

/// Recurrence rule construction errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("RRULE interval must be a positive integer")]
    InvalidInterval,

    #[error("RRULE count must be a positive integer")]
    InvalidCount,

    #[error("RRULE day of month must be within -31..=31 and non-zero, got {0}")]
    InvalidMonthDay(i8),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
