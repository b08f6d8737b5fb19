//! Error types shared by every teleop crate

use std::sync::PoisonError;
use thiserror::Error;

/// Errors raised by the teleop runtime and its nodes
#[derive(Debug, Error)]
pub enum TeleopError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Communication error: {0}")]
    Communication(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TeleopError {
    pub fn config(msg: impl Into<String>) -> Self {
        TeleopError::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        TeleopError::InvalidInput(msg.into())
    }

    pub fn communication(msg: impl Into<String>) -> Self {
        TeleopError::Communication(msg.into())
    }

    pub fn terminal(msg: impl Into<String>) -> Self {
        TeleopError::Terminal(msg.into())
    }
}

impl<T> From<PoisonError<T>> for TeleopError {
    fn from(err: PoisonError<T>) -> Self {
        TeleopError::Internal(format!("Lock poisoned: {}", err))
    }
}

pub type TeleopResult<T> = Result<T, TeleopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(TeleopError::config("bad"), TeleopError::Config(m) if m == "bad"));
        assert!(matches!(
            TeleopError::invalid_input("x"),
            TeleopError::InvalidInput(_)
        ));
        assert_eq!(
            TeleopError::communication("topic gone").to_string(),
            "Communication error: topic gone"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TeleopError = io.into();
        assert!(matches!(err, TeleopError::Io(_)));
    }
}
