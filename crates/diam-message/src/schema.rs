//! Explicit field schemas for structural unmarshal.
//!
//! A message type lists its fields once, as a static table mapping each
//! field to the AVP that carries it, and receives decoded AVPs through
//! [`Unmarshal::assign`]. [`Message::unmarshal`](crate::Message::unmarshal)
//! walks the table against the AVPs of a message.

use diam_dict::{AvpDataType, UNDEFINED_VENDOR_ID};

use crate::avp::Avp;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// First occurrence wins
    Single,
    /// Every occurrence, in message order
    Multiple,
}

/// One row of a message schema
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<F> {
    pub field: F,
    /// AVP name as known to the dictionary
    pub avp: &'static str,
    pub vendor_id: u32,
    pub data_type: AvpDataType,
    pub cardinality: Cardinality,
}

impl<F> FieldSpec<F> {
    pub const fn single(field: F, avp: &'static str, data_type: AvpDataType) -> Self {
        Self {
            field,
            avp,
            vendor_id: UNDEFINED_VENDOR_ID,
            data_type,
            cardinality: Cardinality::Single,
        }
    }

    pub const fn multiple(field: F, avp: &'static str, data_type: AvpDataType) -> Self {
        Self {
            field,
            avp,
            vendor_id: UNDEFINED_VENDOR_ID,
            data_type,
            cardinality: Cardinality::Multiple,
        }
    }

    pub const fn with_vendor(mut self, vendor_id: u32) -> Self {
        self.vendor_id = vendor_id;
        self
    }
}

/// A type that can be filled from the AVPs of a message
pub trait Unmarshal {
    type Field: Copy + 'static;

    const SCHEMA: &'static [FieldSpec<Self::Field>];

    /// Store one decoded AVP. The AVP already matches the field's data type.
    fn assign(&mut self, field: Self::Field, avp: &Avp) -> Result<()>;
}
