use std::net::IpAddr;

use diam_dict::{AvpDataType, Dictionary};
use diam_message::{result_code, Avp, FieldSpec, Message, MessageError, Unmarshal};
use tracing::debug;

use crate::application::Application;
use crate::error::ParseError;
use crate::hook::{NoHook, ParseHook};
use crate::role::Role;

/// Capabilities-Exchange-Answer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cea {
    pub result_code: u32,
    pub origin_host: String,
    pub origin_realm: String,
    pub host_ip_address: Vec<IpAddr>,
    pub vendor_id: u32,
    pub product_name: String,
    pub origin_state_id: u32,
    pub error_message: String,
    pub failed_avp: Vec<Avp>,
    pub supported_vendor_id: Vec<u32>,
    pub auth_application_id: Vec<Avp>,
    pub inband_security_id: Vec<u32>,
    pub acct_application_id: Vec<Avp>,
    pub vendor_specific_application_id: Vec<Avp>,
    pub firmware_revision: u32,
    pub(crate) app_id: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CeaField {
    ResultCode,
    OriginHost,
    OriginRealm,
    HostIpAddress,
    VendorId,
    ProductName,
    OriginStateId,
    ErrorMessage,
    FailedAvp,
    SupportedVendorId,
    AuthApplicationId,
    InbandSecurityId,
    AcctApplicationId,
    VendorSpecificApplicationId,
    FirmwareRevision,
}

impl Unmarshal for Cea {
    type Field = CeaField;

    const SCHEMA: &'static [FieldSpec<CeaField>] = &[
        FieldSpec::single(CeaField::ResultCode, "Result-Code", AvpDataType::Unsigned32),
        FieldSpec::single(CeaField::OriginHost, "Origin-Host", AvpDataType::DiameterIdentity),
        FieldSpec::single(CeaField::OriginRealm, "Origin-Realm", AvpDataType::DiameterIdentity),
        FieldSpec::multiple(CeaField::HostIpAddress, "Host-IP-Address", AvpDataType::Address),
        FieldSpec::single(CeaField::VendorId, "Vendor-Id", AvpDataType::Unsigned32),
        FieldSpec::single(CeaField::ProductName, "Product-Name", AvpDataType::Utf8String),
        FieldSpec::single(CeaField::OriginStateId, "Origin-State-Id", AvpDataType::Unsigned32),
        FieldSpec::single(CeaField::ErrorMessage, "Error-Message", AvpDataType::Utf8String),
        FieldSpec::multiple(CeaField::FailedAvp, "Failed-AVP", AvpDataType::Grouped),
        FieldSpec::multiple(CeaField::SupportedVendorId, "Supported-Vendor-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CeaField::AuthApplicationId, "Auth-Application-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CeaField::InbandSecurityId, "Inband-Security-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CeaField::AcctApplicationId, "Acct-Application-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(
            CeaField::VendorSpecificApplicationId,
            "Vendor-Specific-Application-Id",
            AvpDataType::Grouped,
        ),
        FieldSpec::single(CeaField::FirmwareRevision, "Firmware-Revision", AvpDataType::Unsigned32),
    ];

    fn assign(&mut self, field: CeaField, avp: &Avp) -> diam_message::Result<()> {
        match field {
            CeaField::ResultCode => self.result_code = unsigned(avp)?,
            CeaField::OriginHost => self.origin_host = text(avp)?,
            CeaField::OriginRealm => self.origin_realm = text(avp)?,
            CeaField::HostIpAddress => self.host_ip_address.push(address(avp)?),
            CeaField::VendorId => self.vendor_id = unsigned(avp)?,
            CeaField::ProductName => self.product_name = text(avp)?,
            CeaField::OriginStateId => self.origin_state_id = unsigned(avp)?,
            CeaField::ErrorMessage => self.error_message = text(avp)?,
            CeaField::FailedAvp => self.failed_avp.push(avp.clone()),
            CeaField::SupportedVendorId => self.supported_vendor_id.push(unsigned(avp)?),
            CeaField::AuthApplicationId => self.auth_application_id.push(avp.clone()),
            CeaField::InbandSecurityId => self.inband_security_id.push(unsigned(avp)?),
            CeaField::AcctApplicationId => self.acct_application_id.push(avp.clone()),
            CeaField::VendorSpecificApplicationId => {
                self.vendor_specific_application_id.push(avp.clone())
            }
            CeaField::FirmwareRevision => self.firmware_revision = unsigned(avp)?,
        }
        Ok(())
    }
}

impl Cea {
    /// Parse a CEA without rewrites
    pub fn parse(msg: &Message, dict: &Dictionary, local_role: Role) -> Result<Self, ParseError> {
        Self::parse_with(msg, dict, local_role, &NoHook)
    }

    /// Parse a CEA and negotiate the common applications.
    ///
    /// Checks run in order: structure, mandatory AVPs, Result-Code, then
    /// application negotiation. A non-success Result-Code yields
    /// [`ParseError::FailedResultCode`] carrying the answer as parsed so far.
    pub fn parse_with(
        msg: &Message,
        dict: &Dictionary,
        local_role: Role,
        hook: &dyn ParseHook<Cea>,
    ) -> Result<Self, ParseError> {
        let mut cea = Cea::default();
        msg.unmarshal(dict, &mut cea)?;
        cea.sanity_check()?;

        if cea.result_code != result_code::SUCCESS {
            debug!(
                result_code = cea.result_code,
                origin_host = %cea.origin_host,
                "Peer rejected capabilities exchange"
            );
            return Err(ParseError::FailedResultCode(Box::new(cea)));
        }

        hook.before_resolve(&mut cea);

        let mut app = Application::new(
            cea.acct_application_id.clone(),
            cea.auth_application_id.clone(),
            cea.vendor_specific_application_id.clone(),
        );
        app.parse(dict, local_role)?;
        cea.app_id = app.into_ids();

        hook.after_resolve(&mut cea);

        debug!(
            origin_host = %cea.origin_host,
            applications = ?cea.app_id,
            "CEA parsed"
        );
        Ok(cea)
    }

    // Reports the first missing AVP only
    fn sanity_check(&self) -> Result<(), ParseError> {
        if self.result_code == 0 {
            return Err(ParseError::MissingResultCode);
        }
        if self.origin_host.is_empty() {
            return Err(ParseError::MissingOriginHost);
        }
        if self.origin_realm.is_empty() {
            return Err(ParseError::MissingOriginRealm);
        }
        Ok(())
    }

    /// Application IDs negotiated with the peer
    pub fn applications(&self) -> &[u32] {
        &self.app_id
    }
}

pub(crate) fn unsigned(avp: &Avp) -> diam_message::Result<u32> {
    avp.data.as_u32().ok_or_else(|| invalid(avp, "not an Unsigned32"))
}

pub(crate) fn text(avp: &Avp) -> diam_message::Result<String> {
    avp.data
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(avp, "not a string"))
}

pub(crate) fn address(avp: &Avp) -> diam_message::Result<IpAddr> {
    avp.data.as_address().ok_or_else(|| invalid(avp, "not an Address"))
}

fn invalid(avp: &Avp, reason: &str) -> MessageError {
    MessageError::InvalidAvpValue {
        code: avp.code,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diam_message::{AvpData, GroupedAvp, MBIT, VBIT};
    use std::net::Ipv4Addr;

    fn answer(result_code: u32) -> Message {
        Message::answer(257, 0)
            .with_avp(Avp::mandatory(268, AvpData::Unsigned32(result_code)))
            .with_avp(Avp::mandatory(264, AvpData::DiameterIdentity("hss.example.com".into())))
            .with_avp(Avp::mandatory(296, AvpData::DiameterIdentity("example.com".into())))
            .with_avp(Avp::mandatory(257, AvpData::Address(IpAddr::V4(Ipv4Addr::LOCALHOST))))
            .with_avp(Avp::mandatory(266, AvpData::Unsigned32(10415)))
            .with_avp(Avp::new(269, 0, 0, AvpData::Utf8String("hss".into())))
    }

    fn dict() -> Dictionary {
        Dictionary::standard().unwrap()
    }

    #[test]
    fn test_parse_fields() {
        let msg = answer(2001)
            .with_avp(Avp::mandatory(278, AvpData::Unsigned32(7)))
            .with_avp(Avp::mandatory(265, AvpData::Unsigned32(10415)))
            .with_avp(Avp::mandatory(265, AvpData::Unsigned32(5535)))
            .with_avp(Avp::mandatory(258, AvpData::Unsigned32(4)));

        let cea = Cea::parse(&msg, &dict(), Role::Client).unwrap();

        assert_eq!(cea.origin_host, "hss.example.com");
        assert_eq!(cea.origin_realm, "example.com");
        assert_eq!(cea.host_ip_address, vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        assert_eq!(cea.vendor_id, 10415);
        assert_eq!(cea.product_name, "hss");
        assert_eq!(cea.origin_state_id, 7);
        assert_eq!(cea.supported_vendor_id, vec![10415, 5535]);
        assert_eq!(cea.applications(), &[4]);
    }

    #[test]
    fn test_sanity_order() {
        let msg = Message::answer(257, 0);
        assert!(matches!(
            Cea::parse(&msg, &dict(), Role::Client),
            Err(ParseError::MissingResultCode)
        ));

        // Origin-Realm is missing too; Origin-Host is reported first
        let msg = Message::answer(257, 0).with_avp(Avp::mandatory(268, AvpData::Unsigned32(2001)));
        assert!(matches!(
            Cea::parse(&msg, &dict(), Role::Client),
            Err(ParseError::MissingOriginHost)
        ));

        let msg = Message::answer(257, 0)
            .with_avp(Avp::mandatory(268, AvpData::Unsigned32(2001)))
            .with_avp(Avp::mandatory(264, AvpData::DiameterIdentity("hss".into())));
        assert!(matches!(
            Cea::parse(&msg, &dict(), Role::Client),
            Err(ParseError::MissingOriginRealm)
        ));
    }

    #[test]
    fn test_sanity_before_result_code() {
        // A failing Result-Code is not reported while mandatory AVPs are absent
        let msg = Message::answer(257, 0).with_avp(Avp::mandatory(268, AvpData::Unsigned32(5012)));
        assert!(matches!(
            Cea::parse(&msg, &dict(), Role::Client),
            Err(ParseError::MissingOriginHost)
        ));
    }

    #[test]
    fn test_failed_result_code_skips_negotiation() {
        let msg = answer(3010)
            .with_avp(Avp::new(281, 0, 0, AvpData::Utf8String("unknown peer".into())))
            .with_avp(Avp::mandatory(258, AvpData::Unsigned32(4)));

        let err = Cea::parse(&msg, &dict(), Role::Client).unwrap_err();
        let cea = err.answer().unwrap();

        assert_eq!(cea.result_code, 3010);
        assert_eq!(cea.error_message, "unknown peer");
        assert!(cea.applications().is_empty());
    }

    #[test]
    fn test_vendor_specific_with_v_bit() {
        let vsai = Avp::new(
            260,
            MBIT | VBIT,
            10415,
            GroupedAvp::new(vec![
                Avp::mandatory(266, AvpData::Unsigned32(10415)),
                Avp::mandatory(258, AvpData::Unsigned32(16777251)),
            ]),
        );
        let msg = answer(2001).with_avp(vsai);

        let cea = Cea::parse(&msg, &dict(), Role::Client).unwrap();
        assert_eq!(cea.vendor_specific_application_id.len(), 1);
        assert_eq!(cea.applications(), &[16777251]);
    }

    #[test]
    fn test_malformed() {
        let msg = answer(2001).with_avp(Avp::mandatory(258, AvpData::Utf8String("4".into())));
        let err = Cea::parse(&msg, &dict(), Role::Client).unwrap_err();

        assert!(matches!(err, ParseError::Malformed(MessageError::TypeMismatch { .. })));
        assert_eq!(err.to_result_code(), 5004);
    }
}
