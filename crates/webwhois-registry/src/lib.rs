//! Registry backend access for webwhois.
//!
//! The registry exposes five backend services (WHOIS queries, public
//! requests, record statements, stored files, audit logging) plus an
//! optional CDNSKEY scanner. This crate holds:
//! - decoded record types and the wire payloads they are decoded from
//! - the type decoder (date sentinels, timestamp policy, DNSKEY tables)
//! - one client trait per backend service, HTTP implementations speaking
//!   the JSON protocol, and in-memory fakes for tests

pub mod clients;
pub mod decode;
pub mod dnskey;
pub mod error;
pub mod status;
pub mod types;
pub mod wire;

pub use error::RegistryError;
pub use types::ObjectType;
