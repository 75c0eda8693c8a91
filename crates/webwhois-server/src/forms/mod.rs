//! Form models for the search and public-request pages.
//!
//! Submitted fields deserialize as plain optional strings, validation
//! runs as a second step so a re-rendered page carries every message
//! at once instead of failing on the first bad field.

pub mod public_request;
pub mod whois;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub(crate) const MSG_REQUIRED: &str = "This field is required.";
pub(crate) const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";

/// Key for messages that belong to the form as a whole.
pub(crate) const NON_FIELD: &str = "__all__";

pub(crate) const HANDLE_MAX_LENGTH: usize = 255;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("fixed pattern compiles"));

pub(crate) fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub(crate) fn invalid_choice_message(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

pub(crate) fn clean_handle(value: &str, errors: &mut FieldErrors) -> Option<String> {
    let handle = value.trim();
    if handle.is_empty() {
        errors.add("handle", MSG_REQUIRED);
        return None;
    }
    let length = handle.chars().count();
    if length > HANDLE_MAX_LENGTH {
        errors.add(
            "handle",
            format!(
                "Ensure this value has at most {HANDLE_MAX_LENGTH} characters \
                 (it has {length})."
            ),
        );
        return None;
    }
    Some(handle.to_string())
}

/// Validation messages grouped by field, serialized in stable field
/// order for the re-rendered page.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn messages(&self, field: &str) -> Vec<String> {
        self.0.get(field).cloned().unwrap_or_default()
    }
}
