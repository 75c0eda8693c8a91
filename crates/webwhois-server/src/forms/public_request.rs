//! Forms for the public request pages.
//!
//! The delivery rules mirror the paper process. A password can go to
//! the address already in the registry or to a custom one, and a
//! notarized letter only makes sense with a custom address.

use serde::Deserialize;
use webwhois_registry::ObjectType;
use webwhois_registry::types::ConfirmationMethod;

use super::{
    FieldErrors, MSG_INVALID_EMAIL, MSG_REQUIRED, NON_FIELD, clean_handle,
    invalid_choice_message, is_valid_email,
};
use crate::public_response::LockLevel;

const MSG_UNEXPECTED_CUSTOM_EMAIL: &str =
    "Option \"Send to email in registry\" is incompatible with custom email. \
     Please choose one of the two options.";
const MSG_CUSTOM_EMAIL_MISSING: &str =
    "Custom email is required as \"Send to custom email\" option is selected. \
     Please fill it in.";
const MSG_NOTARIZED_NEEDS_CUSTOM_EMAIL: &str =
    "Letter with officially verified signature can be sent only to the custom email. \
     Please select \"Send to custom email\" and enter it.";

/// Object types the public request forms accept.
const REQUEST_OBJECT_TYPES: [ObjectType; 4] = [
    ObjectType::Domain,
    ObjectType::Contact,
    ObjectType::Nsset,
    ObjectType::Keyset,
];

/// Delivery choice for the password or personal data email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTo {
    EmailInRegistry,
    CustomEmail,
}

impl SendTo {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailInRegistry => "email_in_registry",
            Self::CustomEmail => "custom_email",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "email_in_registry" => Some(Self::EmailInRegistry),
            "custom_email" => Some(Self::CustomEmail),
            _ => None,
        }
    }
}

/// Effective confirmation method, the blank choice means a signed email.
pub fn effective_method(chosen: Option<ConfirmationMethod>) -> ConfirmationMethod {
    chosen.unwrap_or(ConfirmationMethod::SignedEmail)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendPasswordForm {
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub send_to: String,
    #[serde(default)]
    pub custom_email: String,
    #[serde(default)]
    pub confirmation_method: String,
}

#[derive(Debug, Clone)]
pub struct SendPasswordData {
    pub object_type: ObjectType,
    pub handle: String,
    pub send_to: SendTo,
    pub custom_email: Option<String>,
    /// What the visitor explicitly picked; `None` when the field was
    /// left on its blank default.
    pub chosen_method: Option<ConfirmationMethod>,
}

impl SendPasswordForm {
    pub fn validate(&self) -> Result<SendPasswordData, FieldErrors> {
        let mut errors = FieldErrors::default();
        let object_type = clean_object_type(&self.object_type, &mut errors);
        let handle = clean_handle(&self.handle, &mut errors);
        let send_to = clean_send_to(&self.send_to, &mut errors);
        let custom_email = clean_custom_email(&self.custom_email, &mut errors);
        let chosen_method = clean_confirmation_method(&self.confirmation_method, &mut errors);
        check_delivery(send_to, custom_email.as_deref(), chosen_method, &mut errors);
        match (object_type, handle, send_to) {
            (Some(object_type), Some(handle), Some(send_to)) if errors.is_empty() => {
                Ok(SendPasswordData {
                    object_type,
                    handle,
                    send_to,
                    custom_email,
                    chosen_method,
                })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonalInfoForm {
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub send_to: String,
    #[serde(default)]
    pub custom_email: String,
    #[serde(default)]
    pub confirmation_method: String,
}

#[derive(Debug, Clone)]
pub struct PersonalInfoData {
    pub handle: String,
    pub send_to: SendTo,
    pub custom_email: Option<String>,
    pub chosen_method: Option<ConfirmationMethod>,
}

impl PersonalInfoForm {
    pub fn validate(&self) -> Result<PersonalInfoData, FieldErrors> {
        let mut errors = FieldErrors::default();
        let handle = clean_handle(&self.handle, &mut errors);
        let send_to = clean_send_to(&self.send_to, &mut errors);
        let custom_email = clean_custom_email(&self.custom_email, &mut errors);
        let chosen_method = clean_confirmation_method(&self.confirmation_method, &mut errors);
        check_delivery(send_to, custom_email.as_deref(), chosen_method, &mut errors);
        match (handle, send_to) {
            (Some(handle), Some(send_to)) if errors.is_empty() => Ok(PersonalInfoData {
                handle,
                send_to,
                custom_email,
                chosen_method,
            }),
            _ => Err(errors),
        }
    }
}

/// Shared by the block and unblock pages, which differ only in the
/// direction of the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockUnblockForm {
    #[serde(default)]
    pub lock_type: String,
    #[serde(default)]
    pub object_type: String,
    #[serde(default)]
    pub handle: String,
    #[serde(default)]
    pub confirmation_method: String,
}

#[derive(Debug, Clone)]
pub struct BlockUnblockData {
    pub lock_level: LockLevel,
    pub object_type: ObjectType,
    pub handle: String,
    pub chosen_method: Option<ConfirmationMethod>,
}

impl BlockUnblockForm {
    pub fn validate(&self) -> Result<BlockUnblockData, FieldErrors> {
        let mut errors = FieldErrors::default();
        let lock_level = clean_lock_type(&self.lock_type, &mut errors);
        let object_type = clean_object_type(&self.object_type, &mut errors);
        let handle = clean_handle(&self.handle, &mut errors);
        let chosen_method = clean_confirmation_method(&self.confirmation_method, &mut errors);
        match (lock_level, object_type, handle) {
            (Some(lock_level), Some(object_type), Some(handle)) if errors.is_empty() => {
                Ok(BlockUnblockData {
                    lock_level,
                    object_type,
                    handle,
                    chosen_method,
                })
            }
            _ => Err(errors),
        }
    }
}

fn clean_object_type(value: &str, errors: &mut FieldErrors) -> Option<ObjectType> {
    if value.is_empty() {
        errors.add("object_type", MSG_REQUIRED);
        return None;
    }
    match ObjectType::from_str(value).filter(|t| REQUEST_OBJECT_TYPES.contains(t)) {
        Some(object_type) => Some(object_type),
        None => {
            errors.add("object_type", invalid_choice_message(value));
            None
        }
    }
}

fn clean_send_to(value: &str, errors: &mut FieldErrors) -> Option<SendTo> {
    if value.is_empty() {
        errors.add("send_to", MSG_REQUIRED);
        return None;
    }
    match SendTo::from_str(value) {
        Some(send_to) => Some(send_to),
        None => {
            errors.add("send_to", invalid_choice_message(value));
            None
        }
    }
}

fn clean_custom_email(value: &str, errors: &mut FieldErrors) -> Option<String> {
    let email = value.trim();
    if email.is_empty() {
        return None;
    }
    if !is_valid_email(email) {
        errors.add("custom_email", MSG_INVALID_EMAIL);
        return None;
    }
    Some(email.to_string())
}

fn clean_confirmation_method(
    value: &str,
    errors: &mut FieldErrors,
) -> Option<ConfirmationMethod> {
    if value.is_empty() {
        return None;
    }
    match ConfirmationMethod::from_str(value) {
        Some(method) => Some(method),
        None => {
            errors.add("confirmation_method", invalid_choice_message(value));
            None
        }
    }
}

fn clean_lock_type(value: &str, errors: &mut FieldErrors) -> Option<LockLevel> {
    if value.is_empty() {
        errors.add("lock_type", MSG_REQUIRED);
        return None;
    }
    match LockLevel::from_str(value) {
        Some(level) => Some(level),
        None => {
            errors.add("lock_type", invalid_choice_message(value));
            None
        }
    }
}

/// At most one delivery rule fires at a time, the checks shortcut in
/// the order they are listed.
fn check_delivery(
    send_to: Option<SendTo>,
    custom_email: Option<&str>,
    chosen_method: Option<ConfirmationMethod>,
    errors: &mut FieldErrors,
) {
    if send_to == Some(SendTo::EmailInRegistry) && custom_email.is_some() {
        errors.add(NON_FIELD, MSG_UNEXPECTED_CUSTOM_EMAIL);
    } else if send_to == Some(SendTo::CustomEmail) && custom_email.is_none() {
        errors.add(NON_FIELD, MSG_CUSTOM_EMAIL_MISSING);
    } else if chosen_method.is_some_and(|method| method != ConfirmationMethod::SignedEmail)
        && send_to != Some(SendTo::CustomEmail)
    {
        errors.add(NON_FIELD, MSG_NOTARIZED_NEEDS_CUSTOM_EMAIL);
    }
}
