use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, trace};

use diam_config::DictionaryConfig;

use crate::error::{DictError, Entity, Result};
use crate::model::{
    Application, AvpDefinition, AvpKey, Command, EnumValue, Rule, UNDEFINED_VENDOR_ID,
};
use crate::source::DictionarySource;
use crate::standard;
use crate::tables::Tables;
use crate::xml::XmlSource;

/// Diameter dictionary store.
///
/// Lookups read a published snapshot of the tables and never block. `load`
/// builds the next snapshot off to the side and swaps it in, so readers
/// observe either the previous tables or the new ones, never a mix.
pub struct Dictionary {
    tables: ArcSwap<Tables>,
    // Serialises writers; readers never touch it
    writer: Mutex<()>,
}

impl Dictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        Self {
            tables: ArcSwap::from_pointee(Tables::default()),
            writer: Mutex::new(()),
        }
    }

    /// Create a dictionary preloaded with the base protocol, Credit-Control
    /// and 3GPP S6a definitions
    pub fn standard() -> Result<Self> {
        let dict = Self::new();
        for xml in standard::SOURCES {
            dict.load(XmlSource::from_xml(xml))?;
        }
        Ok(dict)
    }

    /// Build a dictionary as described by configuration
    pub fn from_config(config: &DictionaryConfig) -> Result<Self> {
        let dict = if config.preload_standard {
            Self::standard()?
        } else {
            Self::new()
        };
        for path in &config.dictionary_files {
            dict.load_file(path)?;
        }
        Ok(dict)
    }

    /// Merge definitions from `source` and publish the result.
    ///
    /// On error the previously published tables stay in place.
    pub fn load<S: DictionarySource>(&self, source: S) -> Result<()> {
        let defs = source.read()?;
        let count = defs.len();

        let _guard = self.writer.lock();
        let mut next = Tables::clone(&self.tables.load());
        next.merge(defs);
        next.validate()?;
        let apps = next.apps().len();
        self.tables.store(Arc::new(next));

        debug!(blocks = count, apps, "Dictionary published");
        Ok(())
    }

    /// Load XML definitions from a reader
    pub fn load_xml<R: BufRead>(&self, reader: R) -> Result<()> {
        self.load(XmlSource::new(reader))
    }

    /// Load XML definitions from a file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DictError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load_xml(BufReader::new(file))
    }

    /// All applications in load order
    pub fn apps(&self) -> Vec<Arc<Application>> {
        self.tables.load().apps().to_vec()
    }

    /// Application by ID
    pub fn app(&self, id: u32) -> Result<Arc<Application>> {
        self.tables
            .load()
            .app(id)
            .cloned()
            .ok_or_else(|| DictError::not_found(Entity::Application, id, id, UNDEFINED_VENDOR_ID))
    }

    /// AVP by code or name, scoped to `app_id` with parent and base fallback
    pub fn find_avp<'a>(&self, app_id: u32, key: impl Into<AvpKey<'a>>) -> Result<Arc<AvpDefinition>> {
        self.find_avp_with_vendor(app_id, key, UNDEFINED_VENDOR_ID)
    }

    /// AVP by code or name, scoped to `app_id` and narrowed by `vendor_id`.
    ///
    /// Each application in the fallback chain is tried with the requested
    /// vendor, then with the undefined vendor. Vendor-specific definitions
    /// are only visible to a matching vendor.
    pub fn find_avp_with_vendor<'a>(
        &self,
        app_id: u32,
        key: impl Into<AvpKey<'a>>,
        vendor_id: u32,
    ) -> Result<Arc<AvpDefinition>> {
        let key = key.into();
        let tables = self.tables.load();

        for id in tables.lineage(app_id) {
            let Some(scope) = tables.scope(id) else {
                continue;
            };
            if let Some(avp) = scope.find_avp(key, vendor_id) {
                if id != app_id {
                    trace!(app_id, fallback = id, %key, "AVP resolved through fallback");
                }
                return Ok(Arc::clone(avp));
            }
        }

        Err(DictError::not_found(Entity::Avp, app_id, key, vendor_id))
    }

    /// AVP by code or name in any application, first match in load order.
    ///
    /// Prefer `find_avp` once an application is known: the same code can
    /// mean different things in different applications.
    pub fn scan_avp<'a>(&self, key: impl Into<AvpKey<'a>>) -> Result<Arc<AvpDefinition>> {
        let key = key.into();
        let tables = self.tables.load();

        tables
            .apps()
            .iter()
            .filter_map(|app| tables.scope(app.id))
            .find_map(|scope| scope.scan(key))
            .cloned()
            .ok_or_else(|| DictError::not_found(Entity::Avp, 0, key, UNDEFINED_VENDOR_ID))
    }

    /// Command by code. Commands are not inherited.
    pub fn find_command(&self, app_id: u32, code: u32) -> Result<Arc<Command>> {
        self.tables
            .load()
            .scope(app_id)
            .and_then(|scope| scope.command(code))
            .cloned()
            .ok_or_else(|| DictError::not_found(Entity::Command, app_id, code, UNDEFINED_VENDOR_ID))
    }

    /// Named value of an Enumerated AVP
    pub fn enum_value(&self, app_id: u32, avp_code: u32, value: i32) -> Result<EnumValue> {
        let tables = self.tables.load();
        let not_found = || {
            DictError::not_found(Entity::Enum, app_id, format!("{avp_code}:{value}"), UNDEFINED_VENDOR_ID)
        };

        // The first definition in the chain is authoritative
        let (owner, avp) = tables
            .lineage(app_id)
            .find_map(|id| {
                tables
                    .scope(id)
                    .and_then(|scope| scope.find_avp_any_vendor(avp_code))
                    .map(|avp| (id, avp))
            })
            .ok_or_else(not_found)?;

        let item = avp.item(value).ok_or_else(not_found)?;
        Ok(EnumValue {
            app_id: owner,
            avp_code,
            value,
            name: item.name.clone(),
        })
    }

    /// Rule for `avp` within the command, or grouped AVP, numbered `code`
    pub fn rule(&self, app_id: u32, code: u32, avp: &str) -> Result<Rule> {
        let tables = self.tables.load();

        tables
            .lineage(app_id)
            .filter_map(|id| tables.scope(id))
            .find_map(|scope| {
                scope
                    .command(code)
                    .and_then(|cmd| cmd.rule(avp))
                    .or_else(|| scope.find_avp_any_vendor(code).and_then(|group| group.rule(avp)))
                    .cloned()
            })
            .ok_or_else(|| {
                DictError::not_found(Entity::Rule, app_id, format!("{code}:{avp}"), UNDEFINED_VENDOR_ID)
            })
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}
