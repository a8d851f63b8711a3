use diam_message::{result_code, Avp, ErrorSeverity, MessageError};
use thiserror::Error;

use crate::cea::Cea;

/// Application negotiation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplicationError {
    #[error("No common application")]
    NoCommonApplication { failed_avp: Option<Avp> },

    #[error("Vendor-Specific-Application-Id carries no Auth- or Acct-Application-Id")]
    MissingApplicationId(Avp),

    #[error("Invalid AVP value for code {code}: expected {expected}")]
    InvalidAvpValue { code: u32, expected: &'static str },
}

impl ApplicationError {
    /// Convert error to Diameter Result-Code
    pub fn to_result_code(&self) -> u32 {
        match self {
            Self::NoCommonApplication { .. } => result_code::NO_COMMON_APPLICATION,
            Self::MissingApplicationId(_) => result_code::MISSING_AVP,
            Self::InvalidAvpValue { .. } => result_code::INVALID_AVP_VALUE,
        }
    }

    /// AVP to report in Failed-AVP, when known
    pub fn failed_avp(&self) -> Option<&Avp> {
        match self {
            Self::NoCommonApplication { failed_avp } => failed_avp.as_ref(),
            Self::MissingApplicationId(avp) => Some(avp),
            Self::InvalidAvpValue { .. } => None,
        }
    }
}

/// Capabilities-exchange parse errors
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    // ========================================
    // Malformed or incomplete message
    // ========================================
    #[error("Malformed message: {0}")]
    Malformed(#[from] MessageError),

    #[error("Missing Result-Code AVP")]
    MissingResultCode,

    #[error("Missing Origin-Host AVP")]
    MissingOriginHost,

    #[error("Missing Origin-Realm AVP")]
    MissingOriginRealm,

    #[error("Missing Host-IP-Address AVP")]
    MissingHostIpAddress,

    // ========================================
    // Peer rejected the handshake
    // ========================================
    #[error("failed Result-Code AVP: {}", .0.result_code)]
    FailedResultCode(Box<Cea>),

    // ========================================
    // Negotiation
    // ========================================
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl ParseError {
    /// Convert error to Diameter Result-Code
    pub fn to_result_code(&self) -> u32 {
        match self {
            Self::Malformed(err) => err.to_result_code(),
            Self::MissingResultCode
            | Self::MissingOriginHost
            | Self::MissingOriginRealm
            | Self::MissingHostIpAddress => result_code::MISSING_AVP,
            Self::FailedResultCode(cea) => cea.result_code,
            Self::Application(err) => err.to_result_code(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Malformed(err) => err.severity().max(ErrorSeverity::Error),
            Self::FailedResultCode(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Check if the peer explicitly rejected the handshake
    pub fn is_peer_rejection(&self) -> bool {
        matches!(self, Self::FailedResultCode(_))
    }

    /// CEA carried by a rejected handshake
    pub fn answer(&self) -> Option<&Cea> {
        match self {
            Self::FailedResultCode(cea) => Some(cea),
            _ => None,
        }
    }
}
