//! File-manager backend client.
//!
//! Stored documents (registrar evaluation files) are fetched in two steps:
//! metadata first, then the content stream.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::transport::RpcTransport;
use super::ByteStream;
use crate::error::RegistryError;
use crate::types::FileInfo;
use crate::wire::WireFileInfo;

#[async_trait]
pub trait FileManagerClient: Send + Sync {
    async fn info(&self, file_id: i64) -> Result<FileInfo, RegistryError>;
    async fn load(&self, file_id: i64) -> Result<ByteStream, RegistryError>;
}

/// HTTP implementation of [`FileManagerClient`].
#[derive(Debug, Clone)]
pub struct HttpFileManagerClient {
    transport: RpcTransport,
}

impl HttpFileManagerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            transport: RpcTransport::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl FileManagerClient for HttpFileManagerClient {
    async fn info(&self, file_id: i64) -> Result<FileInfo, RegistryError> {
        let wire: WireFileInfo = self
            .transport
            .call("info", json!({ "file_id": file_id }))
            .await?;
        Ok(wire.into())
    }

    async fn load(&self, file_id: i64) -> Result<ByteStream, RegistryError> {
        self.transport
            .stream("load", json!({ "file_id": file_id }))
            .await
    }
}
