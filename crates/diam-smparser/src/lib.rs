//! Capabilities-exchange parsing.
//!
//! Parses CER and CEA messages against a [`diam_dict::Dictionary`] and
//! negotiates the set of applications both peers support.

// Error types module
pub mod error;

pub mod application;
pub mod cea;
pub mod cer;
pub mod hook;
pub mod role;

// Re-export commonly used types
pub use application::{Application, RELAY_APPLICATION_ID};
pub use cea::{Cea, CeaField};
pub use cer::{Cer, CerField};
pub use error::{ApplicationError, ParseError};
pub use hook::{NoHook, OverridePolicy, ParseHook};
pub use role::Role;
