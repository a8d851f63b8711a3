use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{DictError, Result};
use crate::model::{
    Application, ApplicationDef, AvpDefinition, AvpKey, Command, BASE_APPLICATION_ID,
    UNDEFINED_VENDOR_ID,
};

/// Definitions owned by one application ID
#[derive(Debug, Clone, Default)]
pub(crate) struct Scope {
    /// Load order
    avps: Vec<Arc<AvpDefinition>>,
    by_code: HashMap<(u32, u32), usize>,
    by_name: HashMap<u32, HashMap<String, usize>>,
    commands: HashMap<u32, Arc<Command>>,
}

impl Scope {
    fn insert_avp(&mut self, avp: AvpDefinition) {
        let key = (avp.code, avp.vendor_id);
        let vendor = avp.vendor_id;
        let name = avp.name.clone();

        let idx = match self.by_code.get(&key) {
            Some(&idx) => {
                // Redefinition replaces the earlier row in place
                let old = &self.avps[idx];
                if old.name != name {
                    // Only drop the old name if no later row claimed it
                    if let Some(names) = self.by_name.get_mut(&vendor) {
                        if names.get(&old.name) == Some(&idx) {
                            names.remove(&old.name);
                        }
                    }
                }
                self.avps[idx] = Arc::new(avp);
                idx
            }
            None => {
                self.avps.push(Arc::new(avp));
                self.avps.len() - 1
            }
        };

        self.by_code.insert(key, idx);
        self.by_name.entry(vendor).or_default().insert(name, idx);
    }

    fn exact(&self, key: AvpKey<'_>, vendor_id: u32) -> Option<&Arc<AvpDefinition>> {
        let idx = match key {
            AvpKey::Code(code) => self.by_code.get(&(code, vendor_id)),
            AvpKey::Name(name) => self.by_name.get(&vendor_id).and_then(|names| names.get(name)),
        }?;
        self.avps.get(*idx)
    }

    /// Vendor-specific entry first, then the vendor-agnostic one
    pub(crate) fn find_avp(&self, key: AvpKey<'_>, vendor_id: u32) -> Option<&Arc<AvpDefinition>> {
        self.exact(key, vendor_id).or_else(|| {
            if vendor_id == UNDEFINED_VENDOR_ID {
                None
            } else {
                self.exact(key, UNDEFINED_VENDOR_ID)
            }
        })
    }

    /// Any vendor, preferring the vendor-agnostic definition
    pub(crate) fn find_avp_any_vendor(&self, code: u32) -> Option<&Arc<AvpDefinition>> {
        self.exact(AvpKey::Code(code), UNDEFINED_VENDOR_ID)
            .or_else(|| self.avps.iter().find(|avp| avp.code == code))
    }

    pub(crate) fn scan(&self, key: AvpKey<'_>) -> Option<&Arc<AvpDefinition>> {
        self.avps.iter().find(|avp| key.matches(avp))
    }

    pub(crate) fn command(&self, code: u32) -> Option<&Arc<Command>> {
        self.commands.get(&code)
    }

    pub(crate) fn avp_count(&self) -> usize {
        self.avps.len()
    }
}

/// Complete, immutable set of dictionary tables
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    /// Load order
    apps: Vec<Arc<Application>>,
    app_index: HashMap<u32, usize>,
    scopes: HashMap<u32, Scope>,
}

impl Tables {
    pub(crate) fn apps(&self) -> &[Arc<Application>] {
        &self.apps
    }

    pub(crate) fn app(&self, id: u32) -> Option<&Arc<Application>> {
        self.app_index.get(&id).map(|&idx| &self.apps[idx])
    }

    pub(crate) fn scope(&self, id: u32) -> Option<&Scope> {
        self.scopes.get(&id)
    }

    /// `id` itself, its parent chain, then the base application
    pub(crate) fn lineage(&self, id: u32) -> Lineage<'_> {
        Lineage {
            tables: self,
            next: Some(id),
            base_seen: false,
            remaining: self.apps.len() + 2,
        }
    }

    /// Merge rows into these tables. Blocks sharing an ID fold into one
    /// application; the first block supplies name, kind and parent.
    pub(crate) fn merge(&mut self, defs: Vec<ApplicationDef>) {
        for def in defs {
            let id = def.application.id;
            match self.app_index.get(&id) {
                Some(&idx) => {
                    let app = Arc::make_mut(&mut self.apps[idx]);
                    if app.parent.is_none() {
                        app.parent = def.application.parent;
                    }
                    for vendor in def.application.vendors {
                        if !app.vendors.iter().any(|v| v.id == vendor.id) {
                            app.vendors.push(vendor);
                        }
                    }
                }
                None => {
                    self.app_index.insert(id, self.apps.len());
                    self.apps.push(Arc::new(def.application));
                }
            }

            let scope = self.scopes.entry(id).or_default();
            for avp in def.avps {
                scope.insert_avp(avp);
            }
            for cmd in def.commands {
                scope.commands.insert(cmd.code, Arc::new(cmd));
            }
        }
    }

    /// Every parent must be loaded and no parent chain may loop.
    pub(crate) fn validate(&self) -> Result<()> {
        for app in &self.apps {
            let mut visited = HashSet::new();
            let mut current = app.as_ref();
            visited.insert(current.id);

            while let Some(parent_id) = current.parent {
                let parent = self.app(parent_id).ok_or(DictError::UnknownParent {
                    app_id: current.id,
                    parent_id,
                })?;
                if !visited.insert(parent_id) {
                    return Err(DictError::ParentCycle(app.id));
                }
                current = parent;
            }
        }
        Ok(())
    }
}

/// Fallback order of an AVP or rule lookup
pub(crate) struct Lineage<'a> {
    tables: &'a Tables,
    next: Option<u32>,
    base_seen: bool,
    // Bounded even if validation was bypassed
    remaining: usize,
}

impl Iterator for Lineage<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let id = self.next.take()?;
        if id == BASE_APPLICATION_ID {
            self.base_seen = true;
        }
        self.next = self
            .tables
            .app(id)
            .and_then(|app| app.parent)
            .or_else(|| (!self.base_seen).then_some(BASE_APPLICATION_ID));
        Some(id)
    }
}
