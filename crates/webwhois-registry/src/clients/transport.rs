//! Shared JSON-over-HTTP plumbing for the backend clients.
//!
//! Every backend operation is a POST of named parameters to
//! `{base_url}/{operation}`. Successful responses wrap their payload in a
//! `data` envelope; failures carry an `error` envelope whose `code` is a
//! well-known error kind.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_stream::StreamExt;

use super::ByteStream;
use crate::error::RegistryError;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

/// One backend service endpoint.
#[derive(Debug, Clone)]
pub struct RpcTransport {
    http: reqwest::Client,
    base_url: String,
}

impl RpcTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        if base_url.is_empty() {
            return Err(RegistryError::Config("backend base URL is empty".into()));
        }

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed -- safe to ignore.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    fn op_url(&self, operation: &str) -> String {
        format!("{}/{operation}", self.base_url)
    }

    /// Call one backend operation and decode the data envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<T, RegistryError> {
        let resp = self
            .http
            .post(self.op_url(operation))
            .json(&params)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let envelope: DataEnvelope<T> = resp.json().await?;
        Ok(envelope.data)
    }

    /// Call one backend operation and hand back the raw body stream.
    pub async fn stream(
        &self,
        operation: &str,
        params: serde_json::Value,
    ) -> Result<ByteStream, RegistryError> {
        let resp = self
            .http
            .post(self.op_url(operation))
            .json(&params)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let stream = resp
            .bytes_stream()
            .map(|chunk| chunk.map_err(RegistryError::from));
        Ok(Box::pin(stream))
    }

    /// Map backend error responses onto their error kinds.
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, RegistryError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let fallback = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body = resp.bytes().await.unwrap_or_default();
        if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(&body) {
            if let Some(err) = RegistryError::from_kind(&envelope.error.code) {
                return Err(err);
            }
            let message = if envelope.error.message.is_empty() {
                envelope.error.code
            } else {
                envelope.error.message
            };
            return Err(RegistryError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Err(RegistryError::Api {
            status: status.as_u16(),
            message: fallback,
        })
    }
}
