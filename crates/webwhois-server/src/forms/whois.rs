//! The plain search form, one handle field.

use serde::Deserialize;

use super::{FieldErrors, clean_handle};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhoisForm {
    #[serde(default)]
    pub handle: String,
}

impl WhoisForm {
    /// Returns the handle with surrounding whitespace removed.
    pub fn validate(&self) -> Result<String, FieldErrors> {
        let mut errors = FieldErrors::default();
        match clean_handle(&self.handle, &mut errors) {
            Some(handle) => Ok(handle),
            None => Err(errors),
        }
    }
}
