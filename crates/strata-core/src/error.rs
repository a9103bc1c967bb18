//! Error types and result aliases for Strata core primitives.

/// The result type used throughout strata-core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in core primitive operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A time window with an invalid extent was constructed.
    #[error("invalid time window: {message}")]
    InvalidTimeWindow {
        /// Description of what made the window invalid.
        message: String,
    },

    /// Two time windows that neither overlap nor touch were merged.
    ///
    /// This indicates a construction bug in the caller and should fail
    /// fast rather than be retried.
    #[error("invalid time window merge: {message}")]
    InvalidMerge {
        /// Description of the attempted merge.
        message: String,
    },
}

impl Error {
    /// Creates a new invalid time window error.
    #[must_use]
    pub fn invalid_time_window(message: impl Into<String>) -> Self {
        Self::InvalidTimeWindow {
            message: message.into(),
        }
    }

    /// Creates a new invalid merge error.
    #[must_use]
    pub fn invalid_merge(message: impl Into<String>) -> Self {
        Self::InvalidMerge {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_merge_display() {
        let err = Error::invalid_merge("windows do not touch");
        assert!(err.to_string().contains("invalid time window merge"));
        assert!(err.to_string().contains("windows do not touch"));
    }

    #[test]
    fn invalid_time_window_display() {
        let err = Error::invalid_time_window("start must precede end");
        assert!(err.to_string().contains("start must precede end"));
    }
}
