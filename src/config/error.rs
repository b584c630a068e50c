use thiserror::Error;

/// Errors raised while loading a scene configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document is not valid YAML or has the wrong shape
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value parsed but is outside what the scene can run with
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message() {
        let err = ConfigError::invalid("update_divisor", "must be at least 1");
        assert_eq!(err.to_string(), "invalid update_divisor: must be at least 1");
    }

    #[test]
    fn test_parse_error_converts() {
        let parse = serde_yaml::from_str::<u32>("[not a number").unwrap_err();
        let err: ConfigError = parse.into();
        assert!(err.to_string().starts_with("YAML parse error"));
    }
}
