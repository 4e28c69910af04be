//! Configuration errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid host pattern for service {service}: {source}")]
    InvalidPattern {
        service: String,
        #[source]
        source: regex::Error,
    },

    #[error("Preferences path could not be resolved")]
    NoPreferencesPath,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_error() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = ConfigError::InvalidPattern {
            service: "chatgpt".to_string(),
            source,
        };
        assert!(err.to_string().contains("chatgpt"));
        assert!(err.to_string().contains("Invalid host pattern"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(err.to_string().contains("IO error"));
    }
}
