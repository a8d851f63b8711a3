use std::fmt;
use std::str::FromStr;

use crate::data_type::AvpDataType;
use crate::error::DictError;

/// Application ID of the Diameter base protocol
pub const BASE_APPLICATION_ID: u32 = 0;

/// Vendor ID used by AVPs that carry no vendor-specific meaning
pub const UNDEFINED_VENDOR_ID: u32 = 0;

/// Kind of application as advertised in capabilities exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplicationType {
    #[default]
    Base,
    Auth,
    Acct,
}

impl FromStr for ApplicationType {
    type Err = DictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "base" => Ok(Self::Base),
            "auth" => Ok(Self::Auth),
            "acct" => Ok(Self::Acct),
            other => Err(DictError::InvalidAttribute {
                attribute: "type",
                value: other.to_string(),
            }),
        }
    }
}

/// Vendor record scoped to an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vendor {
    pub id: u32,
    pub name: String,
}

/// Diameter application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: u32,
    pub name: String,
    pub kind: ApplicationType,
    /// Application whose AVPs and rules are visible as fallback
    pub parent: Option<u32>,
    pub vendors: Vec<Vendor>,
}

impl Application {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ApplicationType::Base,
            parent: None,
            vendors: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ApplicationType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// M/V/P flag rules of an AVP definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvpFlagRules {
    pub must: String,
    pub may: String,
    pub must_not: String,
    pub may_encrypt: bool,
}

impl AvpFlagRules {
    /// Check whether the M bit is required
    pub fn mandatory(&self) -> bool {
        self.must.split(',').any(|flag| flag.trim() == "M")
    }

    /// Check whether the V bit is required
    pub fn vendor_bit(&self) -> bool {
        self.must.split(',').any(|flag| flag.trim() == "V")
    }
}

/// Named constant of an Enumerated AVP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub code: i32,
    pub name: String,
}

/// Enum lookup result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub app_id: u32,
    pub avp_code: u32,
    pub value: i32,
    pub name: String,
}

/// Structural constraint on the AVPs of a command or grouped AVP
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub app_id: u32,
    /// Command code, or AVP code for grouped AVP rules
    pub code: u32,
    pub avp: String,
    pub required: bool,
    pub min: u32,
    /// None means unbounded
    pub max: Option<u32>,
}

/// AVP definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvpDefinition {
    pub code: u32,
    pub name: String,
    pub vendor_id: u32,
    pub data_type: AvpDataType,
    pub flags: AvpFlagRules,
    pub items: Vec<EnumItem>,
    pub rules: Vec<Rule>,
}

impl AvpDefinition {
    pub fn new(code: u32, name: impl Into<String>, data_type: AvpDataType) -> Self {
        Self {
            code,
            name: name.into(),
            vendor_id: UNDEFINED_VENDOR_ID,
            data_type,
            flags: AvpFlagRules::default(),
            items: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn with_vendor(mut self, vendor_id: u32) -> Self {
        self.vendor_id = vendor_id;
        self
    }

    pub fn item(&self, value: i32) -> Option<&EnumItem> {
        self.items.iter().find(|item| item.code == value)
    }

    pub fn rule(&self, avp: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.avp == avp)
    }
}

/// Command definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub code: u32,
    pub app_id: u32,
    pub name: String,
    pub short: String,
    pub request: Vec<Rule>,
    pub answer: Vec<Rule>,
}

impl Command {
    /// Request rules first, then answer rules
    pub fn rule(&self, avp: &str) -> Option<&Rule> {
        self.request
            .iter()
            .chain(self.answer.iter())
            .find(|rule| rule.avp == avp)
    }
}

/// Key of an AVP lookup: numeric code or symbolic name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvpKey<'a> {
    Code(u32),
    Name(&'a str),
}

impl AvpKey<'_> {
    pub fn matches(&self, avp: &AvpDefinition) -> bool {
        match self {
            Self::Code(code) => avp.code == *code,
            Self::Name(name) => avp.name == *name,
        }
    }
}

impl From<u32> for AvpKey<'_> {
    fn from(code: u32) -> Self {
        Self::Code(code)
    }
}

impl<'a> From<&'a str> for AvpKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for AvpKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl fmt::Display for AvpKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One application block as produced by a dictionary source
#[derive(Debug, Clone)]
pub struct ApplicationDef {
    pub application: Application,
    pub avps: Vec<AvpDefinition>,
    pub commands: Vec<Command>,
}
