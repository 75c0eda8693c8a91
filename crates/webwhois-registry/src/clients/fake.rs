//! In-memory fakes of the backend clients.
//!
//! Handlers hold the clients as trait objects, so tests substitute these
//! recorders for the HTTP implementations. Every fake records the calls
//! it served and can be loaded with records or error kinds per handle.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::logger::{LogRequestId, LogRequestType, LogResult, LogService, LoggerClient};
use super::{
    ByteStream, CdnskeyClient, FileManagerClient, PublicRequestClient, RecordStatementClient,
    WhoisClient,
};
use crate::error::RegistryError;
use crate::types::{
    ConfirmationMethod, Contact, Domain, FileInfo, Keyset, Language, LockRequestType, Nsset,
    ObjectType, Registrar, RegistrarCertification, RegistrarGroup, ScanResult, StatusDesc,
};

/// One call served by a fake, with the parameters it received.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub operation: String,
    pub params: serde_json::Value,
}

/// Wrap a byte buffer as a single-chunk body stream.
pub fn byte_stream(bytes: Vec<u8>) -> ByteStream {
    Box::pin(tokio_stream::once(Ok(Bytes::from(bytes))))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn error_for_kind(kind: &str) -> RegistryError {
    RegistryError::from_kind(kind).unwrap_or(RegistryError::Api {
        status: 500,
        message: kind.to_string(),
    })
}

// =========================================================================
// WHOIS
// =========================================================================

#[derive(Default)]
pub struct FakeWhoisClient {
    state: Mutex<WhoisState>,
}

#[derive(Default)]
struct WhoisState {
    contacts: HashMap<String, Contact>,
    domains: HashMap<String, Domain>,
    nssets: HashMap<String, Nsset>,
    keysets: HashMap<String, Keyset>,
    registrars: HashMap<String, Registrar>,
    groups: Vec<RegistrarGroup>,
    certifications: Vec<RegistrarCertification>,
    managed_zones: Vec<String>,
    status_descriptions: HashMap<(ObjectType, String), Vec<StatusDesc>>,
    errors: HashMap<(ObjectType, String), String>,
    status_description_calls: usize,
}

impl FakeWhoisClient {
    pub fn add_contact(&self, contact: Contact) {
        lock(&self.state)
            .contacts
            .insert(contact.handle.clone(), contact);
    }

    pub fn add_domain(&self, domain: Domain) {
        lock(&self.state)
            .domains
            .insert(domain.handle.clone(), domain);
    }

    pub fn add_nsset(&self, nsset: Nsset) {
        lock(&self.state).nssets.insert(nsset.handle.clone(), nsset);
    }

    pub fn add_keyset(&self, keyset: Keyset) {
        lock(&self.state)
            .keysets
            .insert(keyset.handle.clone(), keyset);
    }

    pub fn add_registrar(&self, registrar: Registrar) {
        lock(&self.state)
            .registrars
            .insert(registrar.handle.clone(), registrar);
    }

    pub fn add_group(&self, group: RegistrarGroup) {
        lock(&self.state).groups.push(group);
    }

    pub fn add_certification(&self, certification: RegistrarCertification) {
        lock(&self.state).certifications.push(certification);
    }

    pub fn set_managed_zones(&self, zones: Vec<String>) {
        lock(&self.state).managed_zones = zones;
    }

    pub fn add_status_description(
        &self,
        object_type: ObjectType,
        lang: &str,
        handle: &str,
        name: &str,
    ) {
        lock(&self.state)
            .status_descriptions
            .entry((object_type, lang.to_string()))
            .or_default()
            .push(StatusDesc {
                handle: handle.to_string(),
                name: name.to_string(),
            });
    }

    /// Make a lookup of `handle` fail with the given error kind.
    pub fn set_error(&self, object_type: ObjectType, handle: &str, kind: &str) {
        lock(&self.state)
            .errors
            .insert((object_type, handle.to_string()), kind.to_string());
    }

    /// How many times any status-description list was fetched.
    pub fn status_description_calls(&self) -> usize {
        lock(&self.state).status_description_calls
    }

    fn lookup<T: Clone>(
        &self,
        object_type: ObjectType,
        handle: &str,
        select: impl Fn(&WhoisState) -> Option<T>,
    ) -> Result<T, RegistryError> {
        let state = lock(&self.state);
        if let Some(kind) = state.errors.get(&(object_type, handle.to_string())) {
            return Err(error_for_kind(kind));
        }
        select(&state).ok_or(RegistryError::ObjectNotFound)
    }
}

#[async_trait]
impl WhoisClient for FakeWhoisClient {
    async fn get_contact_by_handle(&self, handle: &str) -> Result<Contact, RegistryError> {
        self.lookup(ObjectType::Contact, handle, |s| {
            s.contacts.get(handle).cloned()
        })
    }

    async fn get_domain_by_handle(&self, handle: &str) -> Result<Domain, RegistryError> {
        self.lookup(ObjectType::Domain, handle, |s| s.domains.get(handle).cloned())
    }

    async fn get_nsset_by_handle(&self, handle: &str) -> Result<Nsset, RegistryError> {
        self.lookup(ObjectType::Nsset, handle, |s| s.nssets.get(handle).cloned())
    }

    async fn get_keyset_by_handle(&self, handle: &str) -> Result<Keyset, RegistryError> {
        self.lookup(ObjectType::Keyset, handle, |s| s.keysets.get(handle).cloned())
    }

    async fn get_registrar_by_handle(&self, handle: &str) -> Result<Registrar, RegistryError> {
        self.lookup(ObjectType::Registrar, handle, |s| {
            s.registrars.get(handle).cloned()
        })
    }

    async fn get_registrars(&self) -> Result<Vec<Registrar>, RegistryError> {
        let mut registrars: Vec<Registrar> =
            lock(&self.state).registrars.values().cloned().collect();
        registrars.sort_by(|a, b| a.handle.cmp(&b.handle));
        Ok(registrars)
    }

    async fn get_registrar_groups(&self) -> Result<Vec<RegistrarGroup>, RegistryError> {
        Ok(lock(&self.state).groups.clone())
    }

    async fn get_registrar_certification_list(
        &self,
    ) -> Result<Vec<RegistrarCertification>, RegistryError> {
        Ok(lock(&self.state).certifications.clone())
    }

    async fn get_managed_zone_list(&self) -> Result<Vec<String>, RegistryError> {
        Ok(lock(&self.state).managed_zones.clone())
    }

    async fn get_status_descriptions(
        &self,
        object_type: ObjectType,
        lang: &str,
    ) -> Result<Vec<StatusDesc>, RegistryError> {
        let mut state = lock(&self.state);
        state.status_description_calls += 1;
        Ok(state
            .status_descriptions
            .get(&(object_type, lang.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

// =========================================================================
// Public requests
// =========================================================================

pub struct FakePublicRequestClient {
    state: Mutex<PublicRequestState>,
}

struct PublicRequestState {
    next_id: i64,
    error_kind: Option<String>,
    pdf_documents: HashMap<i64, Vec<u8>>,
    pdf_error_kind: Option<String>,
    calls: Vec<RecordedCall>,
}

impl Default for FakePublicRequestClient {
    fn default() -> Self {
        Self {
            state: Mutex::new(PublicRequestState {
                next_id: 1,
                error_kind: None,
                pdf_documents: HashMap::new(),
                pdf_error_kind: None,
                calls: Vec::new(),
            }),
        }
    }
}

impl FakePublicRequestClient {
    /// The id the next created request will get.
    pub fn set_next_response_id(&self, id: i64) {
        lock(&self.state).next_id = id;
    }

    /// Make every create operation fail with the given error kind.
    pub fn set_error(&self, kind: &str) {
        lock(&self.state).error_kind = Some(kind.to_string());
    }

    pub fn set_pdf(&self, public_request_id: i64, bytes: Vec<u8>) {
        lock(&self.state)
            .pdf_documents
            .insert(public_request_id, bytes);
    }

    pub fn set_pdf_error(&self, kind: &str) {
        lock(&self.state).pdf_error_kind = Some(kind.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.state).calls.clone()
    }

    fn create(&self, operation: &str, params: serde_json::Value) -> Result<i64, RegistryError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall {
            operation: operation.to_string(),
            params,
        });
        if let Some(kind) = &state.error_kind {
            return Err(error_for_kind(kind));
        }
        let id = state.next_id;
        state.next_id += 1;
        Ok(id)
    }
}

#[async_trait]
impl PublicRequestClient for FakePublicRequestClient {
    async fn create_authinfo_request_registry_email(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
    ) -> Result<i64, RegistryError> {
        self.create(
            "create_authinfo_request_registry_email",
            serde_json::json!({
                "object_type": object_type.as_str(),
                "handle": handle,
                "request_id": request_id.map(|id| id.0),
            }),
        )
    }

    async fn create_authinfo_request_non_registry_email(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        specified_email: &str,
    ) -> Result<i64, RegistryError> {
        self.create(
            "create_authinfo_request_non_registry_email",
            serde_json::json!({
                "object_type": object_type.as_str(),
                "handle": handle,
                "request_id": request_id.map(|id| id.0),
                "confirmation_method": confirmation_method.as_str(),
                "specified_email": specified_email,
            }),
        )
    }

    async fn create_block_unblock_request(
        &self,
        object_type: ObjectType,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        lock_request_type: LockRequestType,
    ) -> Result<i64, RegistryError> {
        self.create(
            "create_block_unblock_request",
            serde_json::json!({
                "object_type": object_type.as_str(),
                "handle": handle,
                "request_id": request_id.map(|id| id.0),
                "confirmation_method": confirmation_method.as_str(),
                "lock_request_type": lock_request_type.as_str(),
            }),
        )
    }

    async fn create_personal_info_request_registry_email(
        &self,
        handle: &str,
        request_id: Option<LogRequestId>,
    ) -> Result<i64, RegistryError> {
        self.create(
            "create_personal_info_request_registry_email",
            serde_json::json!({
                "handle": handle,
                "request_id": request_id.map(|id| id.0),
            }),
        )
    }

    async fn create_personal_info_request_non_registry_email(
        &self,
        handle: &str,
        request_id: Option<LogRequestId>,
        confirmation_method: ConfirmationMethod,
        specified_email: &str,
    ) -> Result<i64, RegistryError> {
        self.create(
            "create_personal_info_request_non_registry_email",
            serde_json::json!({
                "handle": handle,
                "request_id": request_id.map(|id| id.0),
                "confirmation_method": confirmation_method.as_str(),
                "specified_email": specified_email,
            }),
        )
    }

    async fn create_public_request_pdf(
        &self,
        public_request_id: i64,
        language: Language,
    ) -> Result<ByteStream, RegistryError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall {
            operation: "create_public_request_pdf".to_string(),
            params: serde_json::json!({
                "public_request_id": public_request_id,
                "language": language.as_str(),
            }),
        });
        if let Some(kind) = &state.pdf_error_kind {
            return Err(error_for_kind(kind));
        }
        state
            .pdf_documents
            .get(&public_request_id)
            .cloned()
            .map(byte_stream)
            .ok_or(RegistryError::ObjectNotFound)
    }
}

// =========================================================================
// Record statements
// =========================================================================

#[derive(Default)]
pub struct FakeRecordStatementClient {
    state: Mutex<RecordStatementState>,
}

#[derive(Default)]
struct RecordStatementState {
    documents: HashMap<(ObjectType, String), Vec<u8>>,
    errors: HashMap<(ObjectType, String), String>,
    calls: Vec<RecordedCall>,
}

impl FakeRecordStatementClient {
    pub fn set_document(&self, object_type: ObjectType, handle: &str, bytes: Vec<u8>) {
        lock(&self.state)
            .documents
            .insert((object_type, handle.to_string()), bytes);
    }

    pub fn set_error(&self, object_type: ObjectType, handle: &str, kind: &str) {
        lock(&self.state)
            .errors
            .insert((object_type, handle.to_string()), kind.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.state).calls.clone()
    }

    fn printout(
        &self,
        operation: &str,
        object_type: ObjectType,
        handle: &str,
        params: serde_json::Value,
    ) -> Result<ByteStream, RegistryError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall {
            operation: operation.to_string(),
            params,
        });
        if let Some(kind) = state.errors.get(&(object_type, handle.to_string())) {
            return Err(error_for_kind(kind));
        }
        state
            .documents
            .get(&(object_type, handle.to_string()))
            .cloned()
            .map(byte_stream)
            .ok_or(RegistryError::ObjectNotFound)
    }
}

#[async_trait]
impl RecordStatementClient for FakeRecordStatementClient {
    async fn domain_printout(
        &self,
        handle: &str,
        is_private_printout: bool,
    ) -> Result<ByteStream, RegistryError> {
        self.printout(
            "domain_printout",
            ObjectType::Domain,
            handle,
            serde_json::json!({ "handle": handle, "is_private_printout": is_private_printout }),
        )
    }

    async fn contact_printout(
        &self,
        handle: &str,
        is_private_printout: bool,
    ) -> Result<ByteStream, RegistryError> {
        self.printout(
            "contact_printout",
            ObjectType::Contact,
            handle,
            serde_json::json!({ "handle": handle, "is_private_printout": is_private_printout }),
        )
    }

    async fn nsset_printout(&self, handle: &str) -> Result<ByteStream, RegistryError> {
        self.printout(
            "nsset_printout",
            ObjectType::Nsset,
            handle,
            serde_json::json!({ "handle": handle }),
        )
    }

    async fn keyset_printout(&self, handle: &str) -> Result<ByteStream, RegistryError> {
        self.printout(
            "keyset_printout",
            ObjectType::Keyset,
            handle,
            serde_json::json!({ "handle": handle }),
        )
    }
}

// =========================================================================
// File manager
// =========================================================================

#[derive(Default)]
pub struct FakeFileManagerClient {
    state: Mutex<FileManagerState>,
}

#[derive(Default)]
struct FileManagerState {
    files: HashMap<i64, (FileInfo, Vec<u8>)>,
    calls: Vec<RecordedCall>,
}

impl FakeFileManagerClient {
    pub fn add_file(&self, info: FileInfo, bytes: Vec<u8>) {
        lock(&self.state).files.insert(info.id, (info, bytes));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.state).calls.clone()
    }
}

#[async_trait]
impl FileManagerClient for FakeFileManagerClient {
    async fn info(&self, file_id: i64) -> Result<FileInfo, RegistryError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall {
            operation: "info".to_string(),
            params: serde_json::json!({ "file_id": file_id }),
        });
        state
            .files
            .get(&file_id)
            .map(|(info, _)| info.clone())
            .ok_or(RegistryError::ObjectNotFound)
    }

    async fn load(&self, file_id: i64) -> Result<ByteStream, RegistryError> {
        let mut state = lock(&self.state);
        state.calls.push(RecordedCall {
            operation: "load".to_string(),
            params: serde_json::json!({ "file_id": file_id }),
        });
        state
            .files
            .get(&file_id)
            .map(|(_, bytes)| byte_stream(bytes.clone()))
            .ok_or(RegistryError::ObjectNotFound)
    }
}

// =========================================================================
// Audit logger
// =========================================================================

/// One audit entry opened through the fake logger.
#[derive(Debug, Clone)]
pub struct CreatedRequest {
    pub id: i64,
    pub source_ip: String,
    pub service: String,
    pub request_type: String,
    pub properties: Vec<(String, String)>,
}

/// One audit entry closed through the fake logger.
#[derive(Debug, Clone)]
pub struct ClosedRequest {
    pub id: i64,
    pub result: String,
    pub properties: Vec<(String, String)>,
    pub references: Vec<(String, i64)>,
}

#[derive(Default)]
pub struct FakeLoggerClient {
    state: Mutex<LoggerState>,
}

#[derive(Default)]
struct LoggerState {
    next_id: i64,
    created: Vec<CreatedRequest>,
    closed: Vec<ClosedRequest>,
    fail_create: bool,
}

impl FakeLoggerClient {
    pub fn created(&self) -> Vec<CreatedRequest> {
        lock(&self.state).created.clone()
    }

    pub fn closed(&self) -> Vec<ClosedRequest> {
        lock(&self.state).closed.clone()
    }

    pub fn set_fail_create(&self) {
        lock(&self.state).fail_create = true;
    }
}

#[async_trait]
impl LoggerClient for FakeLoggerClient {
    async fn create_request(
        &self,
        source_ip: &str,
        service: LogService,
        request_type: LogRequestType,
        properties: &[(String, String)],
    ) -> Result<LogRequestId, RegistryError> {
        let mut state = lock(&self.state);
        if state.fail_create {
            return Err(RegistryError::Api {
                status: 503,
                message: "logger unavailable".to_string(),
            });
        }
        state.next_id += 1;
        let id = state.next_id;
        state.created.push(CreatedRequest {
            id,
            source_ip: source_ip.to_string(),
            service: service.as_str().to_string(),
            request_type: request_type.as_str().to_string(),
            properties: properties.to_vec(),
        });
        Ok(LogRequestId(id))
    }

    async fn close_request(
        &self,
        request_id: LogRequestId,
        result: LogResult,
        properties: &[(String, String)],
        references: &[(String, i64)],
    ) -> Result<(), RegistryError> {
        lock(&self.state).closed.push(ClosedRequest {
            id: request_id.0,
            result: result.as_str().to_string(),
            properties: properties.to_vec(),
            references: references.to_vec(),
        });
        Ok(())
    }
}

// =========================================================================
// CDNSKEY scanner
// =========================================================================

#[derive(Default)]
pub struct FakeCdnskeyClient {
    state: Mutex<CdnskeyState>,
}

#[derive(Default)]
struct CdnskeyState {
    results: HashMap<String, Vec<ScanResult>>,
    errors: HashMap<String, String>,
}

impl FakeCdnskeyClient {
    pub fn set_results(&self, domain: &str, results: Vec<ScanResult>) {
        lock(&self.state).results.insert(domain.to_string(), results);
    }

    pub fn set_error(&self, domain: &str, kind: &str) {
        lock(&self.state)
            .errors
            .insert(domain.to_string(), kind.to_string());
    }
}

#[async_trait]
impl CdnskeyClient for FakeCdnskeyClient {
    async fn raw_scan_results(&self, domain: &str) -> Result<Vec<ScanResult>, RegistryError> {
        let state = lock(&self.state);
        if let Some(kind) = state.errors.get(domain) {
            return Err(error_for_kind(kind));
        }
        state
            .results
            .get(domain)
            .cloned()
            .ok_or(RegistryError::ObjectNotFound)
    }
}
