use diam_dict::{AvpDefinition, Dictionary, UNDEFINED_VENDOR_ID};
use tracing::trace;

use crate::avp::Avp;
use crate::error::{MessageError, Result};
use crate::schema::{Cardinality, Unmarshal};

// Header flags
pub const FLAG_REQUEST: u8 = 0x80;
pub const FLAG_PROXIABLE: u8 = 0x40;
pub const FLAG_ERROR: u8 = 0x20;
pub const FLAG_RETRANSMIT: u8 = 0x10;

/// Diameter message header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub flags: u8,
    pub command_code: u32,
    pub application_id: u32,
    pub hop_by_hop_id: u32,
    pub end_to_end_id: u32,
}

impl Header {
    /// Check if this is a request
    pub fn is_request(&self) -> bool {
        (self.flags & FLAG_REQUEST) != 0
    }

    /// Check if this is an answer
    pub fn is_answer(&self) -> bool {
        !self.is_request()
    }

    pub fn is_error(&self) -> bool {
        (self.flags & FLAG_ERROR) != 0
    }
}

/// Decoded Diameter message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub header: Header,
    pub avps: Vec<Avp>,
}

impl Message {
    pub fn new(command_code: u32, application_id: u32, flags: u8) -> Self {
        Self {
            header: Header {
                flags,
                command_code,
                application_id,
                ..Header::default()
            },
            avps: Vec::new(),
        }
    }

    pub fn request(command_code: u32, application_id: u32) -> Self {
        Self::new(command_code, application_id, FLAG_REQUEST)
    }

    pub fn answer(command_code: u32, application_id: u32) -> Self {
        Self::new(command_code, application_id, 0)
    }

    /// Append an AVP
    pub fn add_avp(&mut self, avp: Avp) -> &mut Self {
        self.avps.push(avp);
        self
    }

    /// Builder form of `add_avp`
    pub fn with_avp(mut self, avp: Avp) -> Self {
        self.avps.push(avp);
        self
    }

    /// First AVP with `code` and `vendor_id`
    pub fn find_avp(&self, code: u32, vendor_id: u32) -> Option<&Avp> {
        self.find_avps(code, vendor_id).next()
    }

    /// All AVPs with `code` and `vendor_id`, in message order
    pub fn find_avps(&self, code: u32, vendor_id: u32) -> impl Iterator<Item = &Avp> {
        self.avps
            .iter()
            .filter(move |avp| avp.code == code && avp.vendor_id == vendor_id)
    }

    /// Fill `target` from this message's AVPs according to `T::SCHEMA`.
    ///
    /// AVP names are resolved through `dict`, scoped by the message's
    /// application ID. Absent AVPs leave the field untouched.
    pub fn unmarshal<T: Unmarshal>(&self, dict: &Dictionary, target: &mut T) -> Result<()> {
        let app_id = self.header.application_id;

        for spec in T::SCHEMA {
            let def = dict
                .find_avp_with_vendor(app_id, spec.avp, spec.vendor_id)
                .map_err(|source| MessageError::UnknownAvp {
                    name: spec.avp,
                    app_id,
                    source,
                })?;

            let selected: Vec<&Avp> = match spec.cardinality {
                Cardinality::Single => self
                    .find_avp(def.code, def.vendor_id)
                    .or_else(|| self.avps.iter().find(|avp| carries(avp, &def)))
                    .into_iter()
                    .collect(),
                Cardinality::Multiple => self.avps.iter().filter(|avp| carries(avp, &def)).collect(),
            };

            for avp in selected {
                let actual = avp.data.data_type();
                if actual != spec.data_type {
                    return Err(MessageError::TypeMismatch {
                        avp: spec.avp,
                        expected: spec.data_type,
                        found: actual,
                    });
                }
                target.assign(spec.field, avp)?;
            }
        }

        trace!(
            command = self.header.command_code,
            app_id,
            avps = self.avps.len(),
            "Message unmarshaled"
        );
        Ok(())
    }
}

/// Vendor-agnostic definitions match on code alone: peers may still set
/// the V bit and a vendor ID on them.
fn carries(avp: &Avp, def: &AvpDefinition) -> bool {
    avp.code == def.code && (def.vendor_id == UNDEFINED_VENDOR_ID || avp.vendor_id == def.vendor_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avp::{AvpData, GroupedAvp, MBIT, VBIT};
    use crate::schema::FieldSpec;
    use diam_dict::{AvpDataType, DictError};

    #[derive(Debug, Clone, Copy)]
    enum DwaField {
        ResultCode,
        OriginHost,
        FailedAvp,
    }

    #[derive(Debug, Default)]
    struct Dwa {
        result_code: u32,
        origin_host: String,
        failed_avp: Vec<Avp>,
    }

    impl Unmarshal for Dwa {
        type Field = DwaField;

        const SCHEMA: &'static [FieldSpec<DwaField>] = &[
            FieldSpec::single(DwaField::ResultCode, "Result-Code", AvpDataType::Unsigned32),
            FieldSpec::single(DwaField::OriginHost, "Origin-Host", AvpDataType::DiameterIdentity),
            FieldSpec::multiple(DwaField::FailedAvp, "Failed-AVP", AvpDataType::Grouped),
        ];

        fn assign(&mut self, field: DwaField, avp: &Avp) -> Result<()> {
            match field {
                DwaField::ResultCode => self.result_code = avp.data.as_u32().unwrap_or_default(),
                DwaField::OriginHost => {
                    self.origin_host = avp.data.as_str().unwrap_or_default().to_string()
                }
                DwaField::FailedAvp => self.failed_avp.push(avp.clone()),
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum AdvertField {
        VendorSpecific,
        SupportedFeatures,
    }

    #[derive(Debug, Default)]
    struct Advert {
        vendor_specific: Vec<Avp>,
        supported_features: Vec<Avp>,
    }

    impl Unmarshal for Advert {
        type Field = AdvertField;

        const SCHEMA: &'static [FieldSpec<AdvertField>] = &[
            FieldSpec::multiple(
                AdvertField::VendorSpecific,
                "Vendor-Specific-Application-Id",
                AvpDataType::Grouped,
            ),
            FieldSpec::multiple(AdvertField::SupportedFeatures, "Supported-Features", AvpDataType::Grouped)
                .with_vendor(10415),
        ];

        fn assign(&mut self, field: AdvertField, avp: &Avp) -> Result<()> {
            match field {
                AdvertField::VendorSpecific => self.vendor_specific.push(avp.clone()),
                AdvertField::SupportedFeatures => self.supported_features.push(avp.clone()),
            }
            Ok(())
        }
    }

    fn dict() -> Dictionary {
        Dictionary::standard().unwrap()
    }

    #[test]
    fn test_header_flags() {
        let req = Message::request(280, 0);
        assert!(req.header.is_request());
        assert!(!req.header.is_error());

        let ans = Message::new(280, 0, FLAG_ERROR);
        assert!(ans.header.is_answer());
        assert!(ans.header.is_error());
    }

    #[test]
    fn test_find_avp_respects_vendor() {
        let msg = Message::answer(316, 16777251)
            .with_avp(Avp::vendor_mandatory(1406, 10415, AvpData::Unsigned32(1)))
            .with_avp(Avp::mandatory(268, AvpData::Unsigned32(2001)));

        assert!(msg.find_avp(1406, 10415).is_some());
        assert!(msg.find_avp(1406, 0).is_none());
        assert_eq!(msg.find_avps(268, 0).count(), 1);
    }

    #[test]
    fn test_unmarshal() {
        let failed = GroupedAvp::new(vec![Avp::mandatory(264, AvpData::DiameterIdentity("x".into()))]);
        let msg = Message::answer(280, 0)
            .with_avp(Avp::mandatory(268, AvpData::Unsigned32(2001)))
            .with_avp(Avp::mandatory(264, AvpData::DiameterIdentity("peer.example.com".into())))
            .with_avp(Avp::mandatory(264, AvpData::DiameterIdentity("second.example.com".into())))
            .with_avp(Avp::mandatory(279, failed.clone()))
            .with_avp(Avp::mandatory(279, failed));

        let mut dwa = Dwa::default();
        msg.unmarshal(&dict(), &mut dwa).unwrap();

        assert_eq!(dwa.result_code, 2001);
        assert_eq!(dwa.origin_host, "peer.example.com");
        assert_eq!(dwa.failed_avp.len(), 2);
    }

    #[test]
    fn test_unmarshal_absent_fields_untouched() {
        let mut dwa = Dwa::default();
        Message::answer(280, 0).unmarshal(&dict(), &mut dwa).unwrap();

        assert_eq!(dwa.result_code, 0);
        assert!(dwa.origin_host.is_empty());
        assert!(dwa.failed_avp.is_empty());
    }

    #[test]
    fn test_unmarshal_vendor_agnostic_avp_with_v_bit() {
        let vsai = GroupedAvp::new(vec![
            Avp::mandatory(266, AvpData::Unsigned32(10415)),
            Avp::mandatory(258, AvpData::Unsigned32(16777251)),
        ]);
        let msg = Message::answer(316, 16777251)
            .with_avp(Avp::new(260, MBIT | VBIT, 10415, vsai.clone()))
            .with_avp(Avp::mandatory(260, vsai));

        let mut advert = Advert::default();
        msg.unmarshal(&dict(), &mut advert).unwrap();

        assert_eq!(advert.vendor_specific.len(), 2);
        assert_eq!(advert.vendor_specific[0].vendor_id, 10415);
    }

    #[test]
    fn test_unmarshal_vendor_specific_needs_vendor() {
        let features = GroupedAvp::new(vec![Avp::vendor_mandatory(629, 10415, AvpData::Unsigned32(1))]);
        let msg = Message::answer(316, 16777251)
            .with_avp(Avp::mandatory(628, features.clone()))
            .with_avp(Avp::vendor_mandatory(628, 10415, features));

        let mut advert = Advert::default();
        msg.unmarshal(&dict(), &mut advert).unwrap();

        assert_eq!(advert.supported_features.len(), 1);
        assert_eq!(advert.supported_features[0].vendor_id, 10415);
    }

    #[test]
    fn test_unmarshal_type_mismatch() {
        let msg = Message::answer(280, 0)
            .with_avp(Avp::mandatory(268, AvpData::Utf8String("2001".into())));

        let err = msg.unmarshal(&dict(), &mut Dwa::default()).unwrap_err();
        assert_eq!(
            err,
            MessageError::TypeMismatch {
                avp: "Result-Code",
                expected: AvpDataType::Unsigned32,
                found: AvpDataType::Utf8String,
            }
        );
    }

    #[test]
    fn test_unmarshal_unknown_avp_name() {
        let err = Message::answer(280, 0)
            .unmarshal(&Dictionary::new(), &mut Dwa::default())
            .unwrap_err();

        match err {
            MessageError::UnknownAvp { name, app_id, source } => {
                assert_eq!(name, "Result-Code");
                assert_eq!(app_id, 0);
                assert!(matches!(source, DictError::NotFound { .. }));
            }
            other => panic!("Expected UnknownAvp, got {other:?}"),
        }
    }
}
