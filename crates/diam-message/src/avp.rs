use std::net::IpAddr;

use bytes::Bytes;
use diam_dict::{AvpDataType, UNDEFINED_VENDOR_ID};

// AVP flags
pub const VBIT: u8 = 0x80;
pub const MBIT: u8 = 0x40;
pub const PBIT: u8 = 0x20;

/// Decoded AVP value
#[derive(Debug, Clone, PartialEq)]
pub enum AvpData {
    OctetString(Bytes),
    Integer32(i32),
    Integer64(i64),
    Unsigned32(u32),
    Unsigned64(u64),
    Float32(f32),
    Float64(f64),
    Address(IpAddr),
    /// Seconds since 1900-01-01 (NTP epoch)
    Time(u32),
    Utf8String(String),
    DiameterIdentity(String),
    DiameterUri(String),
    Enumerated(i32),
    IpFilterRule(String),
    QosFilterRule(String),
    Grouped(GroupedAvp),
}

impl AvpData {
    pub fn data_type(&self) -> AvpDataType {
        match self {
            Self::OctetString(_) => AvpDataType::OctetString,
            Self::Integer32(_) => AvpDataType::Integer32,
            Self::Integer64(_) => AvpDataType::Integer64,
            Self::Unsigned32(_) => AvpDataType::Unsigned32,
            Self::Unsigned64(_) => AvpDataType::Unsigned64,
            Self::Float32(_) => AvpDataType::Float32,
            Self::Float64(_) => AvpDataType::Float64,
            Self::Address(_) => AvpDataType::Address,
            Self::Time(_) => AvpDataType::Time,
            Self::Utf8String(_) => AvpDataType::Utf8String,
            Self::DiameterIdentity(_) => AvpDataType::DiameterIdentity,
            Self::DiameterUri(_) => AvpDataType::DiameterUri,
            Self::Enumerated(_) => AvpDataType::Enumerated,
            Self::IpFilterRule(_) => AvpDataType::IpFilterRule,
            Self::QosFilterRule(_) => AvpDataType::QosFilterRule,
            Self::Grouped(_) => AvpDataType::Grouped,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Unsigned32(v) | Self::Time(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value of string-like types
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Utf8String(s)
            | Self::DiameterIdentity(s)
            | Self::DiameterUri(s)
            | Self::IpFilterRule(s)
            | Self::QosFilterRule(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<IpAddr> {
        match self {
            Self::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn as_grouped(&self) -> Option<&GroupedAvp> {
        match self {
            Self::Grouped(group) => Some(group),
            _ => None,
        }
    }
}

impl From<GroupedAvp> for AvpData {
    fn from(group: GroupedAvp) -> Self {
        Self::Grouped(group)
    }
}

/// Diameter AVP
#[derive(Debug, Clone, PartialEq)]
pub struct Avp {
    pub code: u32,
    pub flags: u8,
    /// `UNDEFINED_VENDOR_ID` unless the V bit is set
    pub vendor_id: u32,
    pub data: AvpData,
}

impl Avp {
    pub fn new(code: u32, flags: u8, vendor_id: u32, data: impl Into<AvpData>) -> Self {
        Self {
            code,
            flags,
            vendor_id,
            data: data.into(),
        }
    }

    /// Create a mandatory base protocol AVP
    pub fn mandatory(code: u32, data: impl Into<AvpData>) -> Self {
        Self::new(code, MBIT, UNDEFINED_VENDOR_ID, data)
    }

    /// Create a vendor-specific mandatory AVP
    pub fn vendor_mandatory(code: u32, vendor_id: u32, data: impl Into<AvpData>) -> Self {
        Self::new(code, MBIT | VBIT, vendor_id, data)
    }

    pub fn is_vendor_specific(&self) -> bool {
        self.flags & VBIT != 0
    }

    pub fn is_mandatory(&self) -> bool {
        self.flags & MBIT != 0
    }
}

/// Value of a Grouped AVP: an ordered list of child AVPs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedAvp {
    pub avps: Vec<Avp>,
}

impl GroupedAvp {
    pub fn new(avps: Vec<Avp>) -> Self {
        Self { avps }
    }

    /// First child with `code`
    pub fn find(&self, code: u32) -> Option<&Avp> {
        self.avps.iter().find(|avp| avp.code == code)
    }

    /// All children with `code`
    pub fn find_all(&self, code: u32) -> impl Iterator<Item = &Avp> {
        self.avps.iter().filter(move |avp| avp.code == code)
    }
}
