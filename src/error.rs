//! Error types for dataset generation.

use thiserror::Error;

/// Errors that can occur while generating a partitioned dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Invalid generator configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Partitioning could not satisfy the requested distribution.
    #[error("partitioning failed: {0}")]
    Partition(String),

    /// A client received no samples and cannot be split.
    #[error("cannot split empty client shard {0}")]
    EmptyShard(String),

    /// A client shard is too small to yield non-empty train and test sides.
    #[error("client shard {client} has {samples} sample(s); train/test split needs at least 2")]
    TooFewSamples {
        /// Zero-padded client name.
        client: String,
        /// Number of samples the client received.
        samples: usize,
    },

    /// A previously written manifest could not be parsed.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DatasetError {
    /// Creates a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Creates a partitioning error.
    pub fn partition(reason: impl Into<String>) -> Self {
        Self::Partition(reason.into())
    }

    /// Creates a manifest error.
    pub fn manifest(reason: impl Into<String>) -> Self {
        Self::Manifest(reason.into())
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for dataset generation operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_shard_message() {
        let err = DatasetError::EmptyShard("f_00003".to_string());
        assert!(err.to_string().contains("empty client shard f_00003"));
    }

    #[test]
    fn test_too_few_samples_message() {
        let err = DatasetError::TooFewSamples {
            client: "f_00001".to_string(),
            samples: 1,
        };
        assert!(err.to_string().contains("f_00001"));
        assert!(err.to_string().contains("1 sample"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }

    #[test]
    fn test_from_serde_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: DatasetError = json_err.into();
        assert!(matches!(err, DatasetError::Serialization(_)));
    }
}
