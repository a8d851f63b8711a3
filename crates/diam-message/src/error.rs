use diam_dict::{AvpDataType, DictError};
use thiserror::Error;

use crate::result_code;

/// Message decoding errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MessageError {
    #[error("AVP {name} is not defined for application {app_id}: {source}")]
    UnknownAvp {
        name: &'static str,
        app_id: u32,
        #[source]
        source: DictError,
    },

    #[error("AVP {avp} has type {found}, expected {expected}")]
    TypeMismatch {
        avp: &'static str,
        expected: AvpDataType,
        found: AvpDataType,
    },

    #[error("Invalid AVP value for code {code}: {reason}")]
    InvalidAvpValue { code: u32, reason: String },
}

impl MessageError {
    /// Convert error to Diameter Result-Code
    pub fn to_result_code(&self) -> u32 {
        match self {
            Self::UnknownAvp { .. } => result_code::UNABLE_TO_COMPLY,
            Self::TypeMismatch { .. } | Self::InvalidAvpValue { .. } => {
                result_code::INVALID_AVP_VALUE
            }
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // The local schema disagrees with the local dictionary
            Self::UnknownAvp { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Warning,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Result type alias for message operations
pub type Result<T> = std::result::Result<T, MessageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_to_result_code() {
        let mismatch = MessageError::TypeMismatch {
            avp: "Result-Code",
            expected: AvpDataType::Unsigned32,
            found: AvpDataType::Utf8String,
        };
        assert_eq!(mismatch.to_result_code(), 5004);
        assert_eq!(
            MessageError::InvalidAvpValue { code: 260, reason: "empty".into() }.to_result_code(),
            5004
        );
    }

    #[test]
    fn test_error_severity() {
        let unknown = MessageError::UnknownAvp {
            name: "Origin-Host",
            app_id: 0,
            source: DictError::ParentCycle(0),
        };
        assert_eq!(unknown.severity(), ErrorSeverity::Critical);
        assert_eq!(unknown.to_result_code(), 5012);
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Info.to_string(), "info");
        assert_eq!(ErrorSeverity::Critical.to_string(), "critical");
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
    }
}
