//! CDNSKEY scanner client.
//!
//! Optional backend; the gateway serves scan-result pages only when an
//! endpoint is configured.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::transport::RpcTransport;
use crate::error::RegistryError;
use crate::types::ScanResult;
use crate::wire::WireScanResult;

#[async_trait]
pub trait CdnskeyClient: Send + Sync {
    /// All scan observations recorded for a domain, unfiltered.
    async fn raw_scan_results(&self, domain: &str) -> Result<Vec<ScanResult>, RegistryError>;
}

/// HTTP implementation of [`CdnskeyClient`].
#[derive(Debug, Clone)]
pub struct HttpCdnskeyClient {
    transport: RpcTransport,
}

impl HttpCdnskeyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            transport: RpcTransport::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl CdnskeyClient for HttpCdnskeyClient {
    async fn raw_scan_results(&self, domain: &str) -> Result<Vec<ScanResult>, RegistryError> {
        let wire: Vec<WireScanResult> = self
            .transport
            .call("raw_scan_results", json!({ "domain": domain }))
            .await?;
        wire.into_iter().map(ScanResult::try_from).collect()
    }
}
