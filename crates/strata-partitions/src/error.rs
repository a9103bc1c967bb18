//! Error types for the partitions domain.

/// The result type used throughout strata-partitions.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in partition definition and subset operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A key could not be parsed or resolved against its definition.
    ///
    /// Raised at the point of addition or lookup; never silently ignored.
    #[error("invalid partition key '{partition_key}': {message}")]
    InvalidPartitionKey {
        /// The offending key.
        partition_key: String,
        /// Description of why the key is invalid.
        message: String,
    },

    /// A partitions definition failed construction-time validation.
    #[error("invalid partitions definition: {message}")]
    InvalidDefinition {
        /// Description of the violated invariant.
        message: String,
    },

    /// Deserialization encountered a version with no registered decoder.
    ///
    /// Fatal to the deserialize call; the offending version is carried in
    /// the message so callers and operators see the exact value.
    #[error("cannot deserialize partitions subset: unsupported serialization version {version}")]
    UnsupportedSerializationVersion {
        /// The version tag found in the payload.
        version: i64,
    },

    /// A serialized subset was deserialized against a definition whose key
    /// space does not match the payload's shape.
    #[error("definition does not match serialized subset: {message}")]
    DefinitionMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// Full materialization was requested on a partition space with no
    /// resolved end.
    #[error("unbounded partition space: {message}")]
    UnboundedPartitionSpace {
        /// Description of the unbounded operation.
        message: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// An error from strata-core.
    #[error("core error: {0}")]
    Core(#[from] strata_core::Error),
}

impl Error {
    /// Creates a new invalid partition key error.
    #[must_use]
    pub fn invalid_partition_key(
        partition_key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPartitionKey {
            partition_key: partition_key.into(),
            message: message.into(),
        }
    }

    /// Creates a new invalid definition error.
    #[must_use]
    pub fn invalid_definition(message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: message.into(),
        }
    }

    /// Creates a new definition mismatch error.
    #[must_use]
    pub fn definition_mismatch(message: impl Into<String>) -> Self {
        Self::DefinitionMismatch {
            message: message.into(),
        }
    }

    /// Creates a new unbounded partition space error.
    #[must_use]
    pub fn unbounded(message: impl Into<String>) -> Self {
        Self::UnboundedPartitionSpace {
            message: message.into(),
        }
    }

    /// Creates a new serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_version_message_carries_literal_version() {
        let err = Error::UnsupportedSerializationVersion { version: -1 };
        assert!(err.to_string().contains("version -1"));

        let err = Error::UnsupportedSerializationVersion { version: 42 };
        assert!(err.to_string().contains("version 42"));
    }

    #[test]
    fn invalid_partition_key_display() {
        let err = Error::invalid_partition_key("2023-13-40", "does not parse with format '%Y-%m-%d'");
        let msg = err.to_string();
        assert!(msg.contains("2023-13-40"));
        assert!(msg.contains("does not parse"));
    }
}
