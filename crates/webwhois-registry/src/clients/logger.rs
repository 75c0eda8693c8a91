//! Audit logger backend client.
//!
//! Every audited gateway operation opens a request entry before touching
//! other backends and closes it exactly once with an outcome.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::transport::RpcTransport;
use crate::error::RegistryError;

/// Identifier of one open audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogRequestId(pub i64);

impl std::fmt::Display for LogRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The audited service an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogService {
    WebWhois,
    PublicRequest,
}

impl LogService {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebWhois => "Web whois",
            Self::PublicRequest => "Public Request",
        }
    }
}

/// The operation kind recorded for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRequestType {
    Info,
    AuthInfo,
    PersonalInfo,
    BlockTransfer,
    BlockChanges,
    UnblockTransfer,
    UnblockChanges,
    NotarizedLetterPdf,
    RecordStatement,
    ScanResults,
}

impl LogRequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::AuthInfo => "AuthInfo",
            Self::PersonalInfo => "PersonalInfo",
            Self::BlockTransfer => "BlockTransfer",
            Self::BlockChanges => "BlockChanges",
            Self::UnblockTransfer => "UnblockTransfer",
            Self::UnblockChanges => "UnblockChanges",
            Self::NotarizedLetterPdf => "NotarizedLetterPdf",
            Self::RecordStatement => "RecordStatement",
            Self::ScanResults => "ScanResults",
        }
    }
}

/// Outcome recorded when an entry is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogResult {
    Ok,
    NotFound,
    Fail,
    Error,
}

impl LogResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::NotFound => "NotFound",
            Self::Fail => "Fail",
            Self::Error => "Error",
        }
    }
}

/// Audit trail operations.
#[async_trait]
pub trait LoggerClient: Send + Sync {
    async fn create_request(
        &self,
        source_ip: &str,
        service: LogService,
        request_type: LogRequestType,
        properties: &[(String, String)],
    ) -> Result<LogRequestId, RegistryError>;

    async fn close_request(
        &self,
        request_id: LogRequestId,
        result: LogResult,
        properties: &[(String, String)],
        references: &[(String, i64)],
    ) -> Result<(), RegistryError>;
}

/// HTTP implementation of [`LoggerClient`].
#[derive(Debug, Clone)]
pub struct HttpLoggerClient {
    transport: RpcTransport,
}

impl HttpLoggerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            transport: RpcTransport::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl LoggerClient for HttpLoggerClient {
    async fn create_request(
        &self,
        source_ip: &str,
        service: LogService,
        request_type: LogRequestType,
        properties: &[(String, String)],
    ) -> Result<LogRequestId, RegistryError> {
        let id: i64 = self
            .transport
            .call(
                "create_request",
                json!({
                    "source_ip": source_ip,
                    "service": service.as_str(),
                    "request_type": request_type.as_str(),
                    "properties": properties,
                }),
            )
            .await?;
        Ok(LogRequestId(id))
    }

    async fn close_request(
        &self,
        request_id: LogRequestId,
        result: LogResult,
        properties: &[(String, String)],
        references: &[(String, i64)],
    ) -> Result<(), RegistryError> {
        self.transport
            .call(
                "close_request",
                json!({
                    "request_id": request_id.0,
                    "result": result.as_str(),
                    "properties": properties,
                    "references": references,
                }),
            )
            .await
    }
}
