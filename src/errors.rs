use thiserror::Error;

/// Fallback surfaced to the user when a failure carries no usable text.
pub const GENERIC_ERROR: &str = "An unknown error occurred.";

#[derive(Debug, Error)]
pub enum CoinchatError {
    #[error("api error: {0}")]
    Api(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("channel closed: {0}")]
    Channel(String),
}

impl CoinchatError {
    pub fn api_error(msg: impl Into<String>) -> Self {
        CoinchatError::Api(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        CoinchatError::Config(msg.into())
    }

    /// The bare string shown to the user. API failures already carry the
    /// extracted message; everything else falls back to the Display form.
    pub fn user_message(&self) -> String {
        match self {
            CoinchatError::Api(msg) if !msg.trim().is_empty() => msg.clone(),
            CoinchatError::Api(_) => GENERIC_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

pub type CoinchatResult<T> = Result<T, CoinchatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_surfaces_bare_message() {
        let err = CoinchatError::api_error("insufficient funds");
        assert_eq!(err.user_message(), "insufficient funds");
    }

    #[test]
    fn test_empty_api_error_falls_back() {
        let err = CoinchatError::api_error("   ");
        assert_eq!(err.user_message(), GENERIC_ERROR);
    }
}
