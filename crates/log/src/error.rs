//! Error type for logger configuration and initialization.

/// Failure modes of logger setup.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The filter expression did not parse.
    #[error("invalid filter '{filter}': {reason}")]
    Filter {
        /// The rejected expression.
        filter: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A global subscriber was already installed, or installation failed.
    #[error("logger init failed: {0}")]
    Init(String),
}

/// Result alias for logger operations.
pub type LogResult<T> = Result<T, LogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = LogError::Filter {
            filter: "app=verbose".into(),
            reason: "invalid level".into(),
        };
        assert!(err.to_string().contains("app=verbose"));
    }
}
