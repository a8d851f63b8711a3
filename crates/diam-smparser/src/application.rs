//! Application-ID negotiation for the capabilities exchange.
//!
//! A peer advertises its applications in three AVP lists. Each advertised
//! ID is kept only if the local dictionary knows it under a compatible
//! application type. Vendor-Specific-Application-Id groups are unwrapped
//! to the Auth- or Acct-Application-Id they carry.

use diam_dict::{ApplicationType, Dictionary, StandardAvpCode};
use diam_message::Avp;
use tracing::{debug, trace};

use crate::error::ApplicationError;
use crate::role::Role;

/// Relay application ID, accepted without a dictionary entry
pub const RELAY_APPLICATION_ID: u32 = 0xffff_ffff;

const AUTH_APPLICATION_ID: u32 = StandardAvpCode::AuthApplicationId as u32;
const ACCT_APPLICATION_ID: u32 = StandardAvpCode::AcctApplicationId as u32;

/// Advertised application AVPs and the IDs negotiated from them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Application {
    pub acct_application_id: Vec<Avp>,
    pub auth_application_id: Vec<Avp>,
    pub vendor_specific_application_id: Vec<Avp>,
    id: Vec<u32>,
}

impl Application {
    pub fn new(
        acct_application_id: Vec<Avp>,
        auth_application_id: Vec<Avp>,
        vendor_specific_application_id: Vec<Avp>,
    ) -> Self {
        Self {
            acct_application_id,
            auth_application_id,
            vendor_specific_application_id,
            id: Vec::new(),
        }
    }

    /// Resolve the advertised AVPs against `dict`.
    ///
    /// Replaces the previously negotiated IDs. Fails with
    /// `NoCommonApplication` when nothing survives; the first unsupported
    /// AVP is reported only when acting as server.
    pub fn parse(&mut self, dict: &Dictionary, local_role: Role) -> Result<&[u32], ApplicationError> {
        let mut ids = Vec::new();
        let mut failed = None;

        for avp in &self.acct_application_id {
            match resolve(dict, avp, ApplicationType::Acct)? {
                Some(id) => ids.push(id),
                None => remember(&mut failed, avp),
            }
        }

        for avp in &self.auth_application_id {
            match resolve(dict, avp, ApplicationType::Auth)? {
                Some(id) => ids.push(id),
                None => remember(&mut failed, avp),
            }
        }

        for group in &self.vendor_specific_application_id {
            let (inner, kind) = unwrap_vendor_specific(group)?;
            match resolve(dict, inner, kind)? {
                Some(id) => ids.push(id),
                None => remember(&mut failed, group),
            }
        }

        dedup_in_order(&mut ids);
        self.id = ids;

        if self.id.is_empty() {
            debug!(role = %local_role, "No common application with peer");
            let failed_avp = match local_role {
                Role::Server => failed,
                Role::Client => None,
            };
            return Err(ApplicationError::NoCommonApplication { failed_avp });
        }

        Ok(&self.id)
    }

    /// Negotiated IDs from the last successful `parse`
    pub fn id(&self) -> &[u32] {
        &self.id
    }

    pub fn into_ids(self) -> Vec<u32> {
        self.id
    }
}

fn remember(failed: &mut Option<Avp>, avp: &Avp) {
    if failed.is_none() {
        *failed = Some(avp.clone());
    }
}

fn unwrap_vendor_specific(group: &Avp) -> Result<(&Avp, ApplicationType), ApplicationError> {
    let children = group.data.as_grouped().ok_or(ApplicationError::InvalidAvpValue {
        code: group.code,
        expected: "Grouped",
    })?;

    if let Some(auth) = children.find(AUTH_APPLICATION_ID) {
        return Ok((auth, ApplicationType::Auth));
    }
    if let Some(acct) = children.find(ACCT_APPLICATION_ID) {
        return Ok((acct, ApplicationType::Acct));
    }
    Err(ApplicationError::MissingApplicationId(group.clone()))
}

/// `Some(id)` when the local dictionary supports the advertised ID
fn resolve(dict: &Dictionary, avp: &Avp, kind: ApplicationType) -> Result<Option<u32>, ApplicationError> {
    let id = avp.data.as_u32().ok_or(ApplicationError::InvalidAvpValue {
        code: avp.code,
        expected: "Unsigned32",
    })?;

    if id == RELAY_APPLICATION_ID {
        return Ok(Some(id));
    }

    let Ok(app) = dict.app(id) else {
        trace!(app_id = id, "Advertised application unknown");
        return Ok(None);
    };

    // Base entries carry no auth/acct distinction
    if app.kind != ApplicationType::Base && app.kind != kind {
        trace!(app_id = id, advertised = ?kind, local = ?app.kind, "Application type mismatch");
        return Ok(None);
    }

    Ok(Some(id))
}

fn dedup_in_order(ids: &mut Vec<u32>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use diam_message::{AvpData, GroupedAvp, MBIT, VBIT};

    fn dict() -> Dictionary {
        Dictionary::standard().unwrap()
    }

    fn auth(id: u32) -> Avp {
        Avp::mandatory(AUTH_APPLICATION_ID, AvpData::Unsigned32(id))
    }

    fn acct(id: u32) -> Avp {
        Avp::mandatory(ACCT_APPLICATION_ID, AvpData::Unsigned32(id))
    }

    fn vendor_specific(children: Vec<Avp>) -> Avp {
        Avp::new(260, MBIT | VBIT, 10415, GroupedAvp::new(children))
    }

    #[test]
    fn test_auth_application() {
        let mut app = Application::new(vec![], vec![auth(4)], vec![]);
        assert_eq!(app.parse(&dict(), Role::Client).unwrap(), &[4]);
        assert_eq!(app.id(), &[4]);
    }

    #[test]
    fn test_vendor_specific_unwrapped() {
        let vsai = vendor_specific(vec![
            Avp::mandatory(266, AvpData::Unsigned32(10415)),
            auth(16777251),
        ]);
        let mut app = Application::new(vec![], vec![], vec![vsai]);
        assert_eq!(app.parse(&dict(), Role::Client).unwrap(), &[16777251]);
    }

    #[test]
    fn test_vendor_specific_without_id() {
        let vsai = vendor_specific(vec![Avp::mandatory(266, AvpData::Unsigned32(10415))]);
        let mut app = Application::new(vec![], vec![], vec![vsai.clone()]);

        let err = app.parse(&dict(), Role::Server).unwrap_err();
        assert_eq!(err, ApplicationError::MissingApplicationId(vsai));
    }

    #[test]
    fn test_vendor_specific_not_grouped() {
        let bogus = Avp::mandatory(260, AvpData::Unsigned32(4));
        let mut app = Application::new(vec![], vec![], vec![bogus]);

        let err = app.parse(&dict(), Role::Client).unwrap_err();
        assert_eq!(err, ApplicationError::InvalidAvpValue { code: 260, expected: "Grouped" });
    }

    #[test]
    fn test_kind_mismatch_dropped() {
        // Credit control is an auth application
        let mut app = Application::new(vec![acct(4)], vec![], vec![]);
        assert!(matches!(
            app.parse(&dict(), Role::Client),
            Err(ApplicationError::NoCommonApplication { failed_avp: None })
        ));
    }

    #[test]
    fn test_relay_and_dedup() {
        let mut app = Application::new(
            vec![],
            vec![auth(RELAY_APPLICATION_ID), auth(4), auth(999), auth(4)],
            vec![],
        );
        assert_eq!(app.parse(&dict(), Role::Client).unwrap(), &[RELAY_APPLICATION_ID, 4]);
    }

    #[test]
    fn test_failed_avp_only_for_server() {
        let mut app = Application::new(vec![], vec![auth(999), auth(998)], vec![]);

        match app.parse(&dict(), Role::Server) {
            Err(ApplicationError::NoCommonApplication { failed_avp }) => {
                assert_eq!(failed_avp, Some(auth(999)));
            }
            other => panic!("Expected NoCommonApplication, got {other:?}"),
        }

        match app.parse(&dict(), Role::Client) {
            Err(ApplicationError::NoCommonApplication { failed_avp }) => assert!(failed_avp.is_none()),
            other => panic!("Expected NoCommonApplication, got {other:?}"),
        }
    }

    #[test]
    fn test_reparse_replaces_ids() {
        let mut app = Application::new(vec![], vec![auth(4)], vec![]);
        app.parse(&dict(), Role::Client).unwrap();

        app.auth_application_id = vec![auth(16777251)];
        app.parse(&dict(), Role::Client).unwrap();
        assert_eq!(app.id(), &[16777251]);
    }
}
