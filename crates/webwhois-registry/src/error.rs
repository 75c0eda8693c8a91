//! Registry backend errors.
//!
//! Backend services report business failures through well-known error
//! kinds carried in the response envelope. Those kinds are preserved
//! verbatim so the gateway can branch on them and echo them into audit
//! trails; transport and payload problems get their own variants.

use thiserror::Error;

/// Errors returned by registry backend clients.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No object with the queried handle exists.
    #[error("object not found")]
    ObjectNotFound,

    /// The handle is syntactically unacceptable to the registry.
    #[error("invalid handle")]
    InvalidHandle,

    /// A domain name label violates the registry rules.
    #[error("invalid label")]
    InvalidLabel,

    /// The domain name is not under any zone this registry manages.
    #[error("unmanaged zone")]
    UnmanagedZone,

    /// The queried name has more labels than the zone allows.
    #[error("too many labels")]
    TooManyLabels,

    /// The object exists but is scheduled for deletion.
    #[error("object is a delete candidate")]
    ObjectDeleteCandidate,

    /// Transfer of the object is administratively prohibited.
    #[error("transfer of the object is prohibited")]
    ObjectTransferProhibited,

    /// The registry knows no usable email address for the object.
    #[error("no valid email address in the registry")]
    InvalidEmail,

    /// A blocking request hit an object that is already blocked.
    #[error("object is already blocked")]
    ObjectAlreadyBlocked,

    /// An unblocking request hit an object that is not blocked.
    #[error("object is not blocked")]
    ObjectNotBlocked,

    /// The object carries a different active blocking.
    #[error("object has another active blocking")]
    HasDifferentBlock,

    /// The operation is prohibited for this object.
    #[error("operation is prohibited for this object")]
    OperationProhibited,

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with an HTTP error carrying no known error kind.
    #[error("backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend payload did not decode into the expected shape.
    #[error("malformed backend payload: {0}")]
    Decode(String),

    /// Client-side configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RegistryError {
    /// The wire name of this error kind, as exchanged with the backends
    /// and recorded in audit trails.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ObjectNotFound => "OBJECT_NOT_FOUND",
            Self::InvalidHandle => "INVALID_HANDLE",
            Self::InvalidLabel => "INVALID_LABEL",
            Self::UnmanagedZone => "UNMANAGED_ZONE",
            Self::TooManyLabels => "TOO_MANY_LABELS",
            Self::ObjectDeleteCandidate => "OBJECT_DELETE_CANDIDATE",
            Self::ObjectTransferProhibited => "OBJECT_TRANSFER_PROHIBITED",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::ObjectAlreadyBlocked => "OBJECT_ALREADY_BLOCKED",
            Self::ObjectNotBlocked => "OBJECT_NOT_BLOCKED",
            Self::HasDifferentBlock => "HAS_DIFFERENT_BLOCK",
            Self::OperationProhibited => "OPERATION_PROHIBITED",
            Self::Http(_) => "TRANSPORT_ERROR",
            Self::Api { .. } => "BACKEND_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Map a wire error kind back to a variant. Unknown kinds stay with
    /// the caller, which wraps them as an API error.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            "OBJECT_NOT_FOUND" => Some(Self::ObjectNotFound),
            "INVALID_HANDLE" => Some(Self::InvalidHandle),
            "INVALID_LABEL" => Some(Self::InvalidLabel),
            "UNMANAGED_ZONE" => Some(Self::UnmanagedZone),
            "TOO_MANY_LABELS" => Some(Self::TooManyLabels),
            "OBJECT_DELETE_CANDIDATE" => Some(Self::ObjectDeleteCandidate),
            "OBJECT_TRANSFER_PROHIBITED" => Some(Self::ObjectTransferProhibited),
            "INVALID_EMAIL" => Some(Self::InvalidEmail),
            "OBJECT_ALREADY_BLOCKED" => Some(Self::ObjectAlreadyBlocked),
            "OBJECT_NOT_BLOCKED" => Some(Self::ObjectNotBlocked),
            "HAS_DIFFERENT_BLOCK" => Some(Self::HasDifferentBlock),
            "OPERATION_PROHIBITED" => Some(Self::OperationProhibited),
            _ => None,
        }
    }

    /// Whether this is a well-known business outcome rather than an
    /// infrastructure failure.
    pub fn is_business(&self) -> bool {
        !matches!(
            self,
            Self::Http(_) | Self::Api { .. } | Self::Decode(_) | Self::Config(_)
        )
    }
}
