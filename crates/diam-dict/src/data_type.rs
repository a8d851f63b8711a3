use std::fmt;
use std::str::FromStr;

use crate::error::DictError;

/// AVP data type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvpDataType {
    OctetString,
    Integer32,
    Integer64,
    Unsigned32,
    Unsigned64,
    Float32,
    Float64,
    Grouped,
    Address,
    Time,
    Utf8String,
    DiameterIdentity,
    DiameterUri,
    Enumerated,
    IpFilterRule,
    QosFilterRule,
}

impl AvpDataType {
    /// Type name as written in dictionary sources
    pub fn name(&self) -> &'static str {
        match self {
            Self::OctetString => "OctetString",
            Self::Integer32 => "Integer32",
            Self::Integer64 => "Integer64",
            Self::Unsigned32 => "Unsigned32",
            Self::Unsigned64 => "Unsigned64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Grouped => "Grouped",
            Self::Address => "Address",
            Self::Time => "Time",
            Self::Utf8String => "UTF8String",
            Self::DiameterIdentity => "DiameterIdentity",
            Self::DiameterUri => "DiameterURI",
            Self::Enumerated => "Enumerated",
            Self::IpFilterRule => "IPFilterRule",
            Self::QosFilterRule => "QoSFilterRule",
        }
    }

    /// Types whose values are carried as text
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Utf8String
                | Self::DiameterIdentity
                | Self::DiameterUri
                | Self::IpFilterRule
                | Self::QosFilterRule
        )
    }
}

impl FromStr for AvpDataType {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data_type = match s {
            "OctetString" => Self::OctetString,
            "Integer32" => Self::Integer32,
            "Integer64" => Self::Integer64,
            "Unsigned32" => Self::Unsigned32,
            "Unsigned64" => Self::Unsigned64,
            "Float32" => Self::Float32,
            "Float64" => Self::Float64,
            "Grouped" => Self::Grouped,
            "Address" => Self::Address,
            "Time" => Self::Time,
            "UTF8String" => Self::Utf8String,
            "DiameterIdentity" => Self::DiameterIdentity,
            "DiameterURI" => Self::DiameterUri,
            "Enumerated" => Self::Enumerated,
            "IPFilterRule" => Self::IpFilterRule,
            "QoSFilterRule" => Self::QosFilterRule,
            other => return Err(DictError::UnknownDataType(other.to_string())),
        };
        Ok(data_type)
    }
}

impl fmt::Display for AvpDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
