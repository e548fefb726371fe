use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    /// Network-level failure: connect, TLS, request timeout.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Well-formed error response from the remote service.
    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    /// Response or webhook body that could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Handler error: {0}")]
    Handler(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Engine-internal failure, e.g. a panicked loop task.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// True for errors that repeated retries cannot fix, e.g. a revoked
    /// token. The poller stops after a run of these instead of backing off
    /// forever.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BotError::Api { code: 401 | 403 | 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_are_fatal() {
        let err = BotError::Api {
            code: 401,
            description: "Unauthorized".to_string(),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn flood_wait_is_not_fatal() {
        let err = BotError::Api {
            code: 429,
            description: "Too Many Requests".to_string(),
        };
        assert!(!err.is_fatal());
        assert!(!BotError::Transport("connection reset".to_string()).is_fatal());
    }
}
