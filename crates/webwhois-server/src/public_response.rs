//! Records of accepted public requests.
//!
//! A successful form submission produces one of these records. It is stored
//! under a one-time token and drives the confirmation page the visitor is
//! redirected to.

use time::Date;

use webwhois_registry::ObjectType;
use webwhois_registry::clients::LogRequestType;
use webwhois_registry::types::ConfirmationMethod;

/// Whether a block form enables or disables the protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    Block,
    Unblock,
}

impl BlockAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Unblock => "unblock",
        }
    }
}

/// Scope of a block or unblock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockLevel {
    Transfer,
    All,
}

impl LockLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::All => "all",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "transfer" => Some(Self::Transfer),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Payload specific to the request family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    SendPassword { custom_email: Option<String> },
    PersonalInfo { custom_email: Option<String> },
    Block { action: BlockAction, lock_level: LockLevel },
}

/// An accepted public request, as shown on the confirmation pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicResponse {
    pub object_type: ObjectType,
    pub public_request_id: i64,
    pub request_type: LogRequestType,
    pub handle: String,
    pub confirmation_method: ConfirmationMethod,
    /// Local date of submission, shown in the confirmation texts.
    pub create_date: Date,
    pub kind: ResponseKind,
}

impl PublicResponse {
    /// The custom email of the request, when one was specified.
    pub fn custom_email(&self) -> Option<&str> {
        match &self.kind {
            ResponseKind::SendPassword { custom_email }
            | ResponseKind::PersonalInfo { custom_email } => custom_email.as_deref(),
            ResponseKind::Block { .. } => None,
        }
    }
}
