//! Decoded registry record types.
//!
//! These are the structures the rest of the gateway works with, produced
//! from the wire payloads by the decoder in [`crate::wire`]. Undisclosed
//! fields stay inside [`Disclosable`] and are never serialized.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::net::IpAddr;
use time::{Date, OffsetDateTime};

/// The registry object types a handle can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Contact,
    Domain,
    Nsset,
    Keyset,
    Registrar,
}

impl ObjectType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Domain => "domain",
            Self::Nsset => "nsset",
            Self::Keyset => "keyset",
            Self::Registrar => "registrar",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "contact" => Some(Self::Contact),
            "domain" => Some(Self::Domain),
            "nsset" => Some(Self::Nsset),
            "keyset" => Some(Self::Keyset),
            "registrar" => Some(Self::Registrar),
            _ => None,
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field value paired with its privacy flag.
///
/// Serialization emits the flag always and the value only when disclosed,
/// so a hidden value cannot leak through any context built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosable<T> {
    value: T,
    disclose: bool,
}

impl<T> Disclosable<T> {
    pub fn new(value: T, disclose: bool) -> Self {
        Self { value, disclose }
    }

    pub fn public(value: T) -> Self {
        Self::new(value, true)
    }

    pub fn private(value: T) -> Self {
        Self::new(value, false)
    }

    pub fn is_disclosed(&self) -> bool {
        self.disclose
    }

    /// The value, only when it is disclosed.
    pub fn disclosed(&self) -> Option<&T> {
        self.disclose.then_some(&self.value)
    }
}

impl<T: Serialize> Serialize for Disclosable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.disclose { 2 } else { 1 };
        let mut state = serializer.serialize_struct("Disclosable", fields)?;
        state.serialize_field("disclose", &self.disclose)?;
        if self.disclose {
            state.serialize_field("value", &self.value)?;
        }
        state.end()
    }
}

/// Postal address of a contact or registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Address {
    pub street1: String,
    pub street2: String,
    pub street3: String,
    pub city: String,
    pub stateorprovince: String,
    pub postalcode: String,
    pub country_code: String,
}

/// Identification document attached to a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identification {
    /// Document kind, e.g. `BIRTHDAY`, `OP`, `PASS`, `ICO`.
    pub kind: String,
    pub value: String,
}

/// Decoded birthday of a contact. Values that do not parse as a calendar
/// date are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Birthday {
    Date(Date),
    Text(String),
}

impl Serialize for Birthday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Date(date) => {
                let formatted = crate::decode::format_date(*date)
                    .map_err(|e| serde::ser::Error::custom(e.to_string()))?;
                serializer.serialize_str(&formatted)
            }
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Contact record.
#[derive(Debug, Clone)]
pub struct Contact {
    pub handle: String,
    pub organization: Disclosable<String>,
    pub name: Disclosable<String>,
    pub address: Disclosable<Address>,
    pub phone: Disclosable<String>,
    pub fax: Disclosable<String>,
    pub email: Disclosable<String>,
    pub notify_email: Disclosable<String>,
    pub vat_number: Disclosable<String>,
    pub identification: Disclosable<Identification>,
    pub creating_registrar_handle: String,
    pub sponsoring_registrar_handle: String,
    pub created: OffsetDateTime,
    pub changed: Option<OffsetDateTime>,
    pub last_transfer: Option<OffsetDateTime>,
    pub statuses: Vec<String>,
}

/// Domain record. The handle is always the ASCII (punycode) form.
#[derive(Debug, Clone)]
pub struct Domain {
    pub handle: String,
    pub registrant_handle: String,
    pub admin_contact_handles: Vec<String>,
    pub nsset_handle: Option<String>,
    pub keyset_handle: Option<String>,
    pub registrar_handle: String,
    pub statuses: Vec<String>,
    pub registered: OffsetDateTime,
    pub changed: Option<OffsetDateTime>,
    pub last_transfer: Option<OffsetDateTime>,
    pub expire: Date,
    pub validated_to: Option<Date>,
}

/// One name server inside a name server set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameServer {
    pub name: String,
    pub ip_addresses: Vec<IpAddr>,
}

/// Name server set record.
#[derive(Debug, Clone)]
pub struct Nsset {
    pub handle: String,
    pub name_servers: Vec<NameServer>,
    pub tech_contact_handles: Vec<String>,
    pub registrar_handle: String,
    pub created: OffsetDateTime,
    pub changed: Option<OffsetDateTime>,
    pub last_transfer: Option<OffsetDateTime>,
    pub statuses: Vec<String>,
}

/// One DNSKEY record inside a key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsKey {
    pub flags: u16,
    pub protocol: u8,
    pub alg: u8,
    pub key: String,
}

/// Key set record.
#[derive(Debug, Clone)]
pub struct Keyset {
    pub handle: String,
    pub dns_keys: Vec<DnsKey>,
    pub tech_contact_handles: Vec<String>,
    pub registrar_handle: String,
    pub created: OffsetDateTime,
    pub changed: Option<OffsetDateTime>,
    pub last_transfer: Option<OffsetDateTime>,
    pub statuses: Vec<String>,
}

/// Registrar record. Registrar data is public, nothing is disclosable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Registrar {
    pub handle: String,
    pub name: String,
    pub organization: String,
    pub url: String,
    pub phone: String,
    pub fax: String,
    pub address: Address,
}

/// Named group of registrars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrarGroup {
    pub name: String,
    pub members: Vec<String>,
}

/// Certification record of one registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrarCertification {
    pub registrar_handle: String,
    pub score: u8,
    pub evaluation_file_id: Option<i64>,
}

/// One status code with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDesc {
    pub handle: String,
    pub name: String,
}

/// Metadata of a file stored in the registry file manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub id: i64,
    pub name: String,
    pub mimetype: String,
    pub size: u64,
}

/// One CDNSKEY scan observation for a domain.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub worker_name: String,
    pub nameserver: String,
    pub nameserver_ip: String,
    pub cdnskey_status: String,
    pub flags: u16,
    pub protocol: u8,
    pub alg: u8,
    pub public_key: String,
    pub scan_at: OffsetDateTime,
}

/// How a visitor confirms a public request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationMethod {
    SignedEmail,
    NotarizedLetter,
}

impl ConfirmationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignedEmail => "signed_email",
            Self::NotarizedLetter => "notarized_letter",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "signed_email" => Some(Self::SignedEmail),
            "notarized_letter" => Some(Self::NotarizedLetter),
            _ => None,
        }
    }
}

/// The concrete blocking operation requested from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockRequestType {
    BlockTransfer,
    BlockTransferAndUpdate,
    UnblockTransfer,
    UnblockTransferAndUpdate,
}

impl LockRequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlockTransfer => "block_transfer",
            Self::BlockTransferAndUpdate => "block_transfer_and_update",
            Self::UnblockTransfer => "unblock_transfer",
            Self::UnblockTransferAndUpdate => "unblock_transfer_and_update",
        }
    }
}

/// Languages the registry can produce documents in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    En,
    Cs,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Cs => "cs",
        }
    }

    /// Map a UI language to a document language, falling back to English.
    pub fn from_ui_lang(lang: &str) -> Self {
        if lang == "cs" { Self::Cs } else { Self::En }
    }
}
