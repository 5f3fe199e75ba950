use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No value found for key {0}")]
    NotFound(String),

    #[error("{0} has not been defined in this context")]
    KeyNotDefined(String),

    #[error("Invalid key {key}: {reason}")]
    InvalidKeyShape { key: String, reason: String },

    #[error("Stepped assignment to {key} covers {expected} windows but only {actual} values were given")]
    LengthMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Parent scope unavailable: {0}")]
    ScopeUnavailable(String),

    #[error("Configuration file error: {0}")]
    Load(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl ConfigError {
    pub fn invalid_key(key: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidKeyShape {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = ConfigError::LengthMismatch {
            key: "0:9:3".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Stepped assignment to 0:9:3 covers 3 windows but only 2 values were given"
        );
    }

    #[test]
    fn test_invalid_key_helper() {
        let err = ConfigError::invalid_key(5, "points cannot be assigned");
        assert!(matches!(err, ConfigError::InvalidKeyShape { ref key, .. } if key == "5"));
    }
}
