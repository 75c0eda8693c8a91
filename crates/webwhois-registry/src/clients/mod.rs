//! Client facades over the registry backend services.
//!
//! Each backend service gets one trait so the gateway handlers stay
//! independent of the transport; the `Http*` implementations speak the
//! JSON protocol and [`fake`] provides in-memory substitutes for tests.

pub mod cdnskey;
pub mod fake;
pub mod file_manager;
pub mod logger;
pub mod public_request;
pub mod record_statement;
pub mod transport;
pub mod whois;

pub use cdnskey::{CdnskeyClient, HttpCdnskeyClient};
pub use file_manager::{FileManagerClient, HttpFileManagerClient};
pub use logger::{
    HttpLoggerClient, LogRequestId, LogRequestType, LogResult, LogService, LoggerClient,
};
pub use public_request::{HttpPublicRequestClient, PublicRequestClient};
pub use record_statement::{HttpRecordStatementClient, RecordStatementClient};
pub use whois::{HttpWhoisClient, WhoisClient};

use bytes::Bytes;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error::RegistryError;

/// Streamed body delivered by a backend (PDF documents, stored files).
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RegistryError>> + Send>>;
