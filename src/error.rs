use thiserror::Error;

/// Ошибки обращения к backend REST API инвентаря.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Circuit breaker разомкнут, запрос не отправлялся.
    #[error("inventory API temporarily unavailable (circuit breaker open)")]
    CircuitOpen,
    #[error("inventory API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inventory API responded with {status}: {message}")]
    Status { status: u16, message: String },
    /// Отказ коллаборатора без HTTP-деталей (используется in-memory реализациями).
    #[error("inventory API rejected the request: {0}")]
    Rejected(String),
    /// Фоновая задача действия завершилась аварийно.
    #[error("inventory action was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("unknown listing field `{0}`")]
    UnknownField(String),
    #[error("invalid value `{value}` for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value `{value}`: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}
