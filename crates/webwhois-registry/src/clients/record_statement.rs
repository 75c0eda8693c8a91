//! Record-statement backend client.
//!
//! Produces verified PDF printouts of registry records. The gateway only
//! ever asks for the public variants.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::transport::RpcTransport;
use super::ByteStream;
use crate::error::RegistryError;

#[async_trait]
pub trait RecordStatementClient: Send + Sync {
    async fn domain_printout(
        &self,
        handle: &str,
        is_private_printout: bool,
    ) -> Result<ByteStream, RegistryError>;

    async fn contact_printout(
        &self,
        handle: &str,
        is_private_printout: bool,
    ) -> Result<ByteStream, RegistryError>;

    async fn nsset_printout(&self, handle: &str) -> Result<ByteStream, RegistryError>;

    async fn keyset_printout(&self, handle: &str) -> Result<ByteStream, RegistryError>;
}

/// HTTP implementation of [`RecordStatementClient`].
#[derive(Debug, Clone)]
pub struct HttpRecordStatementClient {
    transport: RpcTransport,
}

impl HttpRecordStatementClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            transport: RpcTransport::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl RecordStatementClient for HttpRecordStatementClient {
    async fn domain_printout(
        &self,
        handle: &str,
        is_private_printout: bool,
    ) -> Result<ByteStream, RegistryError> {
        self.transport
            .stream(
                "domain_printout",
                json!({ "handle": handle, "is_private_printout": is_private_printout }),
            )
            .await
    }

    async fn contact_printout(
        &self,
        handle: &str,
        is_private_printout: bool,
    ) -> Result<ByteStream, RegistryError> {
        self.transport
            .stream(
                "contact_printout",
                json!({ "handle": handle, "is_private_printout": is_private_printout }),
            )
            .await
    }

    async fn nsset_printout(&self, handle: &str) -> Result<ByteStream, RegistryError> {
        self.transport
            .stream("nsset_printout", json!({ "handle": handle }))
            .await
    }

    async fn keyset_printout(&self, handle: &str) -> Result<ByteStream, RegistryError> {
        self.transport
            .stream("keyset_printout", json!({ "handle": handle }))
            .await
    }
}
