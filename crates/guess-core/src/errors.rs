use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuessError>;

#[derive(Debug, Error)]
pub enum GuessError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("verdict channel unavailable (fd={fd}): {detail}")]
    VerdictChannel { fd: i32, detail: String },

    #[error("invalid search range (low={low}, high={high})")]
    InvalidRange { low: i32, high: i32 },

    #[error("verdict encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
