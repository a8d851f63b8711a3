// Diameter dictionary module
pub mod data_type;
pub mod error;
pub mod manager;
pub mod model;
pub mod source;
pub mod standard;
mod tables;
pub mod xml;

// Re-export commonly used types
pub use data_type::AvpDataType;
pub use error::{DictError, Entity, Result};
pub use manager::Dictionary;
pub use model::{
    Application, ApplicationDef, ApplicationType, AvpDefinition, AvpFlagRules, AvpKey, Command,
    EnumItem, EnumValue, Rule, Vendor, BASE_APPLICATION_ID, UNDEFINED_VENDOR_ID,
};
pub use source::DictionarySource;
pub use standard::StandardAvpCode;
pub use xml::XmlSource;
