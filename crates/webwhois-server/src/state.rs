//! Shared application state.

use std::sync::Arc;

use webwhois_core::Config;
use webwhois_registry::clients::{
    CdnskeyClient, FileManagerClient, PublicRequestClient, RecordStatementClient, WhoisClient,
};
use webwhois_registry::decode::TimestampFormatter;

use crate::audit::AuditLog;
use crate::captcha::CaptchaCounter;
use crate::correlation::CorrelationStore;
use crate::status_cache::StatusDescriptionCache;

/// Everything the request handlers can reach. Clients are trait objects
/// so tests can swap in the in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub whois: Arc<dyn WhoisClient>,
    pub public_request: Arc<dyn PublicRequestClient>,
    pub record_statement: Arc<dyn RecordStatementClient>,
    pub file_manager: Arc<dyn FileManagerClient>,
    /// Present only when a CDNSKEY scanner endpoint is configured.
    pub cdnskey: Option<Arc<dyn CdnskeyClient>>,
    pub audit: AuditLog,
    pub correlation: CorrelationStore,
    pub status_cache: StatusDescriptionCache,
    pub captcha: CaptchaCounter,
    pub timestamps: TimestampFormatter,
}
