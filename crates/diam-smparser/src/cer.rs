use std::net::IpAddr;

use diam_dict::{AvpDataType, Dictionary};
use diam_message::{Avp, FieldSpec, Message, Unmarshal};
use tracing::debug;

use crate::application::Application;
use crate::cea::{address, text, unsigned};
use crate::error::ParseError;
use crate::hook::{NoHook, ParseHook};
use crate::role::Role;

/// Capabilities-Exchange-Request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cer {
    pub origin_host: String,
    pub origin_realm: String,
    pub host_ip_address: Vec<IpAddr>,
    pub vendor_id: u32,
    pub product_name: String,
    pub origin_state_id: u32,
    pub supported_vendor_id: Vec<u32>,
    pub auth_application_id: Vec<Avp>,
    pub inband_security_id: Vec<u32>,
    pub acct_application_id: Vec<Avp>,
    pub vendor_specific_application_id: Vec<Avp>,
    pub firmware_revision: u32,
    pub(crate) app_id: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CerField {
    OriginHost,
    OriginRealm,
    HostIpAddress,
    VendorId,
    ProductName,
    OriginStateId,
    SupportedVendorId,
    AuthApplicationId,
    InbandSecurityId,
    AcctApplicationId,
    VendorSpecificApplicationId,
    FirmwareRevision,
}

impl Unmarshal for Cer {
    type Field = CerField;

    const SCHEMA: &'static [FieldSpec<CerField>] = &[
        FieldSpec::single(CerField::OriginHost, "Origin-Host", AvpDataType::DiameterIdentity),
        FieldSpec::single(CerField::OriginRealm, "Origin-Realm", AvpDataType::DiameterIdentity),
        FieldSpec::multiple(CerField::HostIpAddress, "Host-IP-Address", AvpDataType::Address),
        FieldSpec::single(CerField::VendorId, "Vendor-Id", AvpDataType::Unsigned32),
        FieldSpec::single(CerField::ProductName, "Product-Name", AvpDataType::Utf8String),
        FieldSpec::single(CerField::OriginStateId, "Origin-State-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CerField::SupportedVendorId, "Supported-Vendor-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CerField::AuthApplicationId, "Auth-Application-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CerField::InbandSecurityId, "Inband-Security-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(CerField::AcctApplicationId, "Acct-Application-Id", AvpDataType::Unsigned32),
        FieldSpec::multiple(
            CerField::VendorSpecificApplicationId,
            "Vendor-Specific-Application-Id",
            AvpDataType::Grouped,
        ),
        FieldSpec::single(CerField::FirmwareRevision, "Firmware-Revision", AvpDataType::Unsigned32),
    ];

    fn assign(&mut self, field: CerField, avp: &Avp) -> diam_message::Result<()> {
        match field {
            CerField::OriginHost => self.origin_host = text(avp)?,
            CerField::OriginRealm => self.origin_realm = text(avp)?,
            CerField::HostIpAddress => self.host_ip_address.push(address(avp)?),
            CerField::VendorId => self.vendor_id = unsigned(avp)?,
            CerField::ProductName => self.product_name = text(avp)?,
            CerField::OriginStateId => self.origin_state_id = unsigned(avp)?,
            CerField::SupportedVendorId => self.supported_vendor_id.push(unsigned(avp)?),
            CerField::AuthApplicationId => self.auth_application_id.push(avp.clone()),
            CerField::InbandSecurityId => self.inband_security_id.push(unsigned(avp)?),
            CerField::AcctApplicationId => self.acct_application_id.push(avp.clone()),
            CerField::VendorSpecificApplicationId => {
                self.vendor_specific_application_id.push(avp.clone())
            }
            CerField::FirmwareRevision => self.firmware_revision = unsigned(avp)?,
        }
        Ok(())
    }
}

impl Cer {
    pub fn parse(msg: &Message, dict: &Dictionary, local_role: Role) -> Result<Self, ParseError> {
        Self::parse_with(msg, dict, local_role, &NoHook)
    }

    /// Parse a CER and negotiate the applications both sides support.
    ///
    /// Acting as server, a failed negotiation carries the first
    /// unsupported application AVP for the answer's Failed-AVP.
    pub fn parse_with(
        msg: &Message,
        dict: &Dictionary,
        local_role: Role,
        hook: &dyn ParseHook<Cer>,
    ) -> Result<Self, ParseError> {
        let mut cer = Cer::default();
        msg.unmarshal(dict, &mut cer)?;
        cer.sanity_check()?;

        hook.before_resolve(&mut cer);

        let mut app = Application::new(
            cer.acct_application_id.clone(),
            cer.auth_application_id.clone(),
            cer.vendor_specific_application_id.clone(),
        );
        app.parse(dict, local_role)?;
        cer.app_id = app.into_ids();

        hook.after_resolve(&mut cer);

        debug!(
            origin_host = %cer.origin_host,
            applications = ?cer.app_id,
            "CER parsed"
        );
        Ok(cer)
    }

    fn sanity_check(&self) -> Result<(), ParseError> {
        if self.origin_host.is_empty() {
            return Err(ParseError::MissingOriginHost);
        }
        if self.origin_realm.is_empty() {
            return Err(ParseError::MissingOriginRealm);
        }
        if self.host_ip_address.is_empty() {
            return Err(ParseError::MissingHostIpAddress);
        }
        Ok(())
    }

    pub fn applications(&self) -> &[u32] {
        &self.app_id
    }
}
