//! Audit bracket around backend interactions.
//!
//! Every audited operation opens an entry before calling other backends
//! and closes it exactly once with the outcome. Handlers that are dropped
//! mid-flight (client disconnect, timeout) still close their entry: the
//! drop guard spawns a close with `exception=Cancelled`.

use std::sync::Arc;

use tracing::error;

use webwhois_registry::RegistryError;
use webwhois_registry::clients::{LogRequestId, LogRequestType, LogResult, LogService, LoggerClient};

/// Entry point for audit brackets. Without a configured logger backend all
/// brackets are no-ops.
#[derive(Clone)]
pub struct AuditLog {
    client: Option<Arc<dyn LoggerClient>>,
}

impl AuditLog {
    pub fn new(client: Option<Arc<dyn LoggerClient>>) -> Self {
        Self { client }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    /// Open an audit entry. The returned guard must be closed on every
    /// path; dropping it unclosed records a cancellation.
    pub async fn open(
        &self,
        source_ip: &str,
        service: LogService,
        request_type: LogRequestType,
        properties: &[(String, String)],
    ) -> Result<AuditEntry, RegistryError> {
        let Some(client) = &self.client else {
            return Ok(AuditEntry { open: None });
        };
        let request_id = client
            .create_request(source_ip, service, request_type, properties)
            .await?;
        Ok(AuditEntry {
            open: Some(OpenEntry {
                client: Arc::clone(client),
                request_id,
            }),
        })
    }
}

struct OpenEntry {
    client: Arc<dyn LoggerClient>,
    request_id: LogRequestId,
}

/// One open audit entry.
pub struct AuditEntry {
    open: Option<OpenEntry>,
}

impl AuditEntry {
    /// Backend-issued id of this entry, passed to public-request commands
    /// as `log_request_id`.
    pub fn request_id(&self) -> Option<LogRequestId> {
        self.open.as_ref().map(|open| open.request_id)
    }

    /// Close the entry with the outcome. Close failures are logged and
    /// swallowed; the page outcome is already decided at this point.
    pub async fn close(
        mut self,
        result: LogResult,
        properties: &[(String, String)],
        references: &[(String, i64)],
    ) {
        if let Some(open) = self.open.take() {
            if let Err(err) = open
                .client
                .close_request(open.request_id, result, properties, references)
                .await
            {
                error!(request_id = %open.request_id, error = %err, "Failed to close audit entry");
            }
        }
    }

    /// Close with `exception=<name>` and `result=Error`.
    pub async fn close_error(self, exception: &str) {
        let properties = [("exception".to_string(), exception.to_string())];
        self.close(LogResult::Error, &properties, &[]).await;
    }
}

impl Drop for AuditEntry {
    fn drop(&mut self) {
        if let Some(open) = self.open.take() {
            tokio::spawn(async move {
                let properties = [("exception".to_string(), "Cancelled".to_string())];
                if let Err(err) = open
                    .client
                    .close_request(open.request_id, LogResult::Error, &properties, &[])
                    .await
                {
                    error!(request_id = %open.request_id, error = %err, "Failed to close abandoned audit entry");
                }
            });
        }
    }
}
