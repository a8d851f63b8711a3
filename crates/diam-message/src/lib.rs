// Error types module
pub mod error;

// Diameter message model
pub mod avp;
pub mod message;
pub mod result_code;
pub mod schema;

// Re-export commonly used types
pub use avp::{Avp, AvpData, GroupedAvp, MBIT, PBIT, VBIT};
pub use error::{ErrorSeverity, MessageError, Result};
pub use message::{Header, Message};
pub use schema::{Cardinality, FieldSpec, Unmarshal};
