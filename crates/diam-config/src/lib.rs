use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Configuration error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Common application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub service_name: String,
    #[validate(length(min = 1))]
    pub log_level: String,
    #[serde(default)]
    #[validate(nested)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    #[validate(nested)]
    pub capability_overrides: CapabilityOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "diam".to_string(),
            log_level: "info".to_string(),
            dictionary: DictionaryConfig::default(),
            capability_overrides: CapabilityOverrides::default(),
        }
    }
}

/// Which dictionary definitions to load at startup
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DictionaryConfig {
    /// Load the embedded base, Credit-Control and S6a definitions first
    #[serde(default = "default_true")]
    pub preload_standard: bool,
    /// Extra XML dictionary files, loaded in order after the standard set
    #[serde(default)]
    pub dictionary_files: Vec<String>,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            preload_standard: true,
            dictionary_files: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Vendor-Specific-Application-Id advertised in place of the peer's
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VendorApplication {
    #[validate(range(min = 1))]
    pub vendor_id: u32,
    pub auth_application_id: u32,
}

/// Deployment-specific rewrites applied to a parsed capabilities answer.
///
/// Empty by default, which leaves the answer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CapabilityOverrides {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub product_name: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<u32>,
    #[serde(default)]
    pub auth_application_ids: Vec<u32>,
    #[serde(default)]
    #[validate(nested)]
    pub vendor_specific_application_ids: Vec<VendorApplication>,
}

impl CapabilityOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Load configuration from file
pub fn load_config<T>(path: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let config: T = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("DIAM").separator("__"))
        .build()
        .map_err(|e| ConfigError::LoadError(e.to_string()))?
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError(e.to_string()))?;

    config
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    Ok(config)
}

/// Load configuration from YAML string (for testing)
pub fn load_from_yaml<T>(yaml: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let config: T =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::LoadError(e.to_string()))?;
    config
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    Ok(config)
}
