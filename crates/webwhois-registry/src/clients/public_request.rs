//! Public-request backend client.
//!
//! Write-side registry operations: password (authinfo) delivery, personal
//! data delivery and object blocking/unblocking, plus the notarized-letter
//! PDF produced for requests confirmed by letter.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use super::logger::LogRequestId;
use super::transport::RpcTransport;
use super::ByteStream;
use crate::error::RegistryError;
use crate::types::{ConfirmationMethod, Language, LockRequestType, ObjectType};

/// Public-request registry operations.
#[async_trait]
pub trait PublicRequestClient: Send + Sync {
    async fn create_authinfo_request_registry_email(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
    ) -> Result<i64, RegistryError>;

    async fn create_authinfo_request_non_registry_email(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        specified_email: &str,
    ) -> Result<i64, RegistryError>;

    async fn create_block_unblock_request(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        lock_request_type: LockRequestType,
    ) -> Result<i64, RegistryError>;

    async fn create_personal_info_request_registry_email(
        &self,
        handle: &str,
        request_id: Option<LogRequestId>,
    ) -> Result<i64, RegistryError>;

    async fn create_personal_info_request_non_registry_email(
        &self,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        specified_email: &str,
    ) -> Result<i64, RegistryError>;

    /// Render the notarized-letter PDF for a created public request.
    async fn create_public_request_pdf(
        &self,
        public_request_id: i64,
        language: Language,
    ) -> Result<ByteStream, RegistryError>;
}

/// HTTP implementation of [`PublicRequestClient`].
#[derive(Debug, Clone)]
pub struct HttpPublicRequestClient {
    transport: RpcTransport,
}

impl HttpPublicRequestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RegistryError> {
        Ok(Self {
            transport: RpcTransport::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl PublicRequestClient for HttpPublicRequestClient {
    async fn create_authinfo_request_registry_email(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
    ) -> Result<i64, RegistryError> {
        self.transport
            .call(
                "create_authinfo_request_registry_email",
                json!({
                    "object_type": object_type.as_str(),
                    "handle": handle,
                    "request_id": request_id.map(|id| id.0),
                }),
            )
            .await
    }

    async fn create_authinfo_request_non_registry_email(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        specified_email: &str,
    ) -> Result<i64, RegistryError> {
        self.transport
            .call(
                "create_authinfo_request_non_registry_email",
                json!({
                    "object_type": object_type.as_str(),
                    "handle": handle,
                    "request_id": request_id.map(|id| id.0),
                    "confirmation_method": confirmation_method.as_str(),
                    "specified_email": specified_email,
                }),
            )
            .await
    }

    async fn create_block_unblock_request(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        lock_request_type: LockRequestType,
    ) -> Result<i64, RegistryError> {
        self.transport
            .call(
                "create_block_unblock_request",
                json!({
                    "object_type": object_type.as_str(),
                    "handle": handle,
                    "request_id": request_id.map(|id| id.0),
                    "confirmation_method": confirmation_method.as_str(),
                    "lock_request_type": lock_request_type.as_str(),
                }),
            )
            .await
    }

    async fn create_personal_info_request_registry_email(
        &self,
        handle: &str,
        request_id: Option<LogRequestId>,
    ) -> Result<i64, RegistryError> {
        self.transport
            .call(
                "create_personal_info_request_registry_email",
                json!({
                    "handle": handle,
                    "request_id": request_id.map(|id| id.0),
                }),
            )
            .await
    }

    async fn create_personal_info_request_non_registry_email(
        &self,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        specified_email: &str,
    ) -> Result<i64, RegistryError> {
        self.transport
            .call(
                "create_personal_info_request_non_registry_email",
                json!({
                    "handle": handle,
                    "request_id": request_id.map(|id| id.0),
                    "confirmation_method": confirmation_method.as_str(),
                    "specified_email": specified_email,
                }),
            )
            .await
    }

    async fn create_public_request_pdf(
        &self,
        public_request_id: i64,
        language: Language,
    ) -> Result<ByteStream, RegistryError> {
        self.transport
            .stream(
                "create_public_request_pdf",
                json!({
                    "public_request_id": public_request_id,
                    "language": language.as_str(),
                }),
            )
            .await
    }
}
