/// Embedded dictionary sources, in load order (parents first)
pub const SOURCES: [&str; 3] = [
    include_str!("../dict/base.xml"),
    include_str!("../dict/credit_control.xml"),
    include_str!("../dict/s6a.xml"),
];

/// Credit-Control application ID (RFC 4006)
pub const CREDIT_CONTROL_APPLICATION_ID: u32 = 4;

/// 3GPP S6a/S6d application ID (TS 29.272)
pub const S6A_APPLICATION_ID: u32 = 16777251;

/// 3GPP vendor ID
pub const TGPP_VENDOR_ID: u32 = 10415;

/// Base protocol AVPs used during capabilities exchange (RFC 6733)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StandardAvpCode {
    HostIpAddress = 257,
    AuthApplicationId = 258,
    AcctApplicationId = 259,
    VendorSpecificApplicationId = 260,
    OriginHost = 264,
    SupportedVendorId = 265,
    VendorId = 266,
    FirmwareRevision = 267,
    ResultCode = 268,
    ProductName = 269,
    OriginStateId = 278,
    FailedAvp = 279,
    ErrorMessage = 281,
    OriginRealm = 296,
    InbandSecurityId = 299,
}

impl StandardAvpCode {
    /// Convert u32 code to StandardAvpCode
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            257 => Some(Self::HostIpAddress),
            258 => Some(Self::AuthApplicationId),
            259 => Some(Self::AcctApplicationId),
            260 => Some(Self::VendorSpecificApplicationId),
            264 => Some(Self::OriginHost),
            265 => Some(Self::SupportedVendorId),
            266 => Some(Self::VendorId),
            267 => Some(Self::FirmwareRevision),
            268 => Some(Self::ResultCode),
            269 => Some(Self::ProductName),
            278 => Some(Self::OriginStateId),
            279 => Some(Self::FailedAvp),
            281 => Some(Self::ErrorMessage),
            296 => Some(Self::OriginRealm),
            299 => Some(Self::InbandSecurityId),
            _ => None,
        }
    }

    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get AVP name
    pub fn name(&self) -> &'static str {
        match self {
            Self::HostIpAddress => "Host-IP-Address",
            Self::AuthApplicationId => "Auth-Application-Id",
            Self::AcctApplicationId => "Acct-Application-Id",
            Self::VendorSpecificApplicationId => "Vendor-Specific-Application-Id",
            Self::OriginHost => "Origin-Host",
            Self::SupportedVendorId => "Supported-Vendor-Id",
            Self::VendorId => "Vendor-Id",
            Self::FirmwareRevision => "Firmware-Revision",
            Self::ResultCode => "Result-Code",
            Self::ProductName => "Product-Name",
            Self::OriginStateId => "Origin-State-Id",
            Self::FailedAvp => "Failed-AVP",
            Self::ErrorMessage => "Error-Message",
            Self::OriginRealm => "Origin-Realm",
            Self::InbandSecurityId => "Inband-Security-Id",
        }
    }
}
