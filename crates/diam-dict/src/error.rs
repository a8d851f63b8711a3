use std::fmt;

use thiserror::Error;

/// What a failed lookup was searching for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Application,
    Avp,
    Command,
    Enum,
    Rule,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Application => write!(f, "application"),
            Self::Avp => write!(f, "AVP"),
            Self::Command => write!(f, "command"),
            Self::Enum => write!(f, "enum value"),
            Self::Rule => write!(f, "rule"),
        }
    }
}

/// Dictionary errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DictError {
    // ========================================
    // Lookup Errors
    // ========================================
    #[error("{entity} not found: app={app_id} key={key} vendor={vendor_id}")]
    NotFound {
        entity: Entity,
        app_id: u32,
        key: String,
        vendor_id: u32,
    },

    // ========================================
    // Load Errors
    // ========================================
    #[error("Failed to parse dictionary source: {0}")]
    Source(String),

    #[error("Invalid {attribute} attribute: {value:?}")]
    InvalidAttribute { attribute: &'static str, value: String },

    #[error("Unknown AVP data type: {0}")]
    UnknownDataType(String),

    #[error("Application {app_id} references unknown parent {parent_id}")]
    UnknownParent { app_id: u32, parent_id: u32 },

    #[error("Parent cycle detected at application {0}")]
    ParentCycle(u32),

    #[error("I/O error reading {path}: {reason}")]
    Io { path: String, reason: String },
}

impl DictError {
    pub(crate) fn not_found(entity: Entity, app_id: u32, key: impl fmt::Display, vendor_id: u32) -> Self {
        Self::NotFound {
            entity,
            app_id,
            key: key.to_string(),
            vendor_id,
        }
    }

    /// Check if this is a lookup miss rather than a load failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for dictionary operations
pub type Result<T> = std::result::Result<T, DictError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DictError::not_found(Entity::Avp, 4, "Session-Id", 0);
        assert_eq!(err.to_string(), "AVP not found: app=4 key=Session-Id vendor=0");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_errors_are_not_lookup_misses() {
        assert!(!DictError::ParentCycle(7).is_not_found());
        assert!(!DictError::UnknownDataType("Foo".into()).is_not_found());
    }
}
