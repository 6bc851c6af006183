// Domain errors - Validation failures raised by the pure domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Duration value outside the accepted range
    InvalidDuration(String),
    /// Settings failed validation
    InvalidSettings(String),
    /// Input file not found
    FileNotFound(String),
    /// Settings file could not be parsed
    ConfigParse(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::InvalidDuration(msg) => write!(f, "Invalid duration: {}", msg),
            DomainError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            DomainError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            DomainError::ConfigParse(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
