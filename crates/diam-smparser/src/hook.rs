//! Rewrites applied around application negotiation.
//!
//! Deployments that must massage a peer's answer install a [`ParseHook`]
//! instead of patching the parser. [`OverridePolicy`] covers the common
//! case of pinning advertised applications and identity from config.

use diam_config::CapabilityOverrides;
use diam_dict::StandardAvpCode;
use diam_message::{Avp, AvpData, GroupedAvp};
use tracing::debug;

use crate::cea::Cea;

pub trait ParseHook<T>: Send + Sync {
    /// Runs after sanity checks, before application IDs are resolved
    fn before_resolve(&self, _message: &mut T) {}

    /// Runs once negotiation succeeded
    fn after_resolve(&self, _message: &mut T) {}
}

/// Leaves every message untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHook;

impl<T> ParseHook<T> for NoHook {}

/// Config-driven rewrite of a parsed CEA.
///
/// Advertised lists are replaced only when the peer sent that list at all.
#[derive(Debug, Clone, Default)]
pub struct OverridePolicy {
    overrides: CapabilityOverrides,
}

impl OverridePolicy {
    pub fn new(overrides: CapabilityOverrides) -> Self {
        Self { overrides }
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    fn auth_application_ids(&self) -> Vec<Avp> {
        self.overrides
            .auth_application_ids
            .iter()
            .map(|id| auth_application_id(*id))
            .collect()
    }

    fn vendor_specific_application_ids(&self) -> Vec<Avp> {
        self.overrides
            .vendor_specific_application_ids
            .iter()
            .map(|app| {
                let group = GroupedAvp::new(vec![
                    Avp::mandatory(StandardAvpCode::VendorId.code(), AvpData::Unsigned32(app.vendor_id)),
                    auth_application_id(app.auth_application_id),
                ]);
                Avp::mandatory(StandardAvpCode::VendorSpecificApplicationId.code(), group)
            })
            .collect()
    }
}

fn auth_application_id(id: u32) -> Avp {
    Avp::mandatory(StandardAvpCode::AuthApplicationId.code(), AvpData::Unsigned32(id))
}

impl From<CapabilityOverrides> for OverridePolicy {
    fn from(overrides: CapabilityOverrides) -> Self {
        Self::new(overrides)
    }
}

impl ParseHook<Cea> for OverridePolicy {
    fn before_resolve(&self, cea: &mut Cea) {
        if !self.overrides.auth_application_ids.is_empty() && !cea.auth_application_id.is_empty() {
            debug!(ids = ?self.overrides.auth_application_ids, "Overriding Auth-Application-Id");
            cea.auth_application_id = self.auth_application_ids();
        }

        if !self.overrides.vendor_specific_application_ids.is_empty()
            && !cea.vendor_specific_application_id.is_empty()
        {
            debug!("Overriding Vendor-Specific-Application-Id");
            cea.vendor_specific_application_id = self.vendor_specific_application_ids();
        }
    }

    fn after_resolve(&self, cea: &mut Cea) {
        if let Some(vendor_id) = self.overrides.vendor_id {
            cea.vendor_id = vendor_id;
        }
        if let Some(product_name) = &self.overrides.product_name {
            cea.product_name = product_name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diam_config::VendorApplication;
    use diam_dict::UNDEFINED_VENDOR_ID;

    fn overrides() -> CapabilityOverrides {
        CapabilityOverrides {
            product_name: Some("edge-agent".into()),
            vendor_id: Some(0),
            auth_application_ids: vec![4],
            vendor_specific_application_ids: vec![VendorApplication {
                vendor_id: 10415,
                auth_application_id: 16777251,
            }],
        }
    }

    #[test]
    fn test_no_hook_is_noop() {
        let mut cea = Cea {
            product_name: "peer".into(),
            ..Cea::default()
        };
        let hook = NoHook;
        ParseHook::<Cea>::before_resolve(&hook, &mut cea);
        ParseHook::<Cea>::after_resolve(&hook, &mut cea);
        assert_eq!(cea.product_name, "peer");
    }

    #[test]
    fn test_lists_replaced_only_when_advertised() {
        let policy = OverridePolicy::new(overrides());

        let mut cea = Cea {
            auth_application_id: vec![auth_application_id(999)],
            ..Cea::default()
        };
        policy.before_resolve(&mut cea);

        assert_eq!(cea.auth_application_id, vec![auth_application_id(4)]);
        assert!(cea.vendor_specific_application_id.is_empty());
    }

    #[test]
    fn test_vendor_specific_shape() {
        let policy = OverridePolicy::new(overrides());
        let vsai = policy.vendor_specific_application_ids();

        assert_eq!(vsai.len(), 1);
        assert_eq!(vsai[0].code, 260);
        // Base protocol AVP: V bit clear, no vendor
        assert!(!vsai[0].is_vendor_specific());
        assert!(vsai[0].is_mandatory());
        assert_eq!(vsai[0].vendor_id, UNDEFINED_VENDOR_ID);

        let group = vsai[0].data.as_grouped().unwrap();
        assert_eq!(group.find(266).and_then(|a| a.data.as_u32()), Some(10415));
        assert_eq!(group.find(258).and_then(|a| a.data.as_u32()), Some(16777251));
    }

    #[test]
    fn test_identity_stamped_after_resolve() {
        let policy = OverridePolicy::from(overrides());
        let mut cea = Cea {
            vendor_id: 10415,
            product_name: "peer".into(),
            ..Cea::default()
        };
        policy.after_resolve(&mut cea);

        assert_eq!(cea.vendor_id, 0);
        assert_eq!(cea.product_name, "edge-agent");
    }

    #[test]
    fn test_empty_policy() {
        let policy = OverridePolicy::default();
        assert!(policy.is_empty());

        let mut cea = Cea {
            vendor_id: 10415,
            auth_application_id: vec![auth_application_id(4)],
            ..Cea::default()
        };
        let before = cea.clone();
        policy.before_resolve(&mut cea);
        policy.after_resolve(&mut cea);
        assert_eq!(cea, before);
    }
}
