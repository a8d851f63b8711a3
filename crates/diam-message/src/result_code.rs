//! Result-Code values (RFC 6733 section 7.1)

// Success (2xxx)
pub const SUCCESS: u32 = 2001;
pub const LIMITED_SUCCESS: u32 = 2002;

// Protocol errors (3xxx)
pub const APPLICATION_UNSUPPORTED: u32 = 3007;
pub const UNKNOWN_PEER: u32 = 3010;

// Permanent failures (5xxx)
pub const INVALID_AVP_VALUE: u32 = 5004;
pub const MISSING_AVP: u32 = 5005;
pub const NO_COMMON_APPLICATION: u32 = 5010;
pub const UNABLE_TO_COMPLY: u32 = 5012;
