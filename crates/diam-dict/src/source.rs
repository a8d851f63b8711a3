use crate::error::Result;
use crate::model::ApplicationDef;

/// Producer of dictionary rows from an external definition format
pub trait DictionarySource {
    fn read(self) -> Result<Vec<ApplicationDef>>;
}

/// Rows built in memory are already a source
impl DictionarySource for Vec<ApplicationDef> {
    fn read(self) -> Result<Vec<ApplicationDef>> {
        Ok(self)
    }
}
