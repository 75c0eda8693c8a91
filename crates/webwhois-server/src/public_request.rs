//! The public-request form pages.
//!
//! Four forms file write-side requests with the registry: password
//! (authinfo) delivery, personal data delivery, and enabling or
//! disabling enhanced object security. Accepted requests are parked in
//! the correlation store and the visitor is redirected to a one-time
//! confirmation page.

use std::future::Future;

use axum::Form;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;

use webwhois_registry::clients::{LogRequestId, LogRequestType, LogResult, LogService};
use webwhois_registry::types::{ConfirmationMethod, LockRequestType};
use webwhois_registry::{ObjectType, RegistryError};

use crate::correlation::CorrelationStore;
use crate::error::WebwhoisError;
use crate::forms::FieldErrors;
use crate::forms::public_request::{
    BlockUnblockData, BlockUnblockForm, PersonalInfoData, PersonalInfoForm, SendPasswordData,
    SendPasswordForm, SendTo, effective_method,
};
use crate::public_response::{BlockAction, LockLevel, PublicResponse, ResponseKind};
use crate::request_info::client_ip;
use crate::state::AppState;
use crate::view::{View, redirect_found};

const SEND_PASSWORD_TEMPLATE: &str = "webwhois/form_send_password.html";
const PERSONAL_INFO_TEMPLATE: &str = "webwhois/form_personal_info.html";
const BLOCK_TEMPLATE: &str = "webwhois/form_block_object.html";
const UNBLOCK_TEMPLATE: &str = "webwhois/form_unblock_object.html";

const MSG_OBJECT_NOT_FOUND: &str =
    "Object not found. Check that you have correctly entered the Object type and Handle.";
const MSG_CONTACT_NOT_FOUND: &str =
    "Object not found. Check that you have correctly entered the contact handle.";
const MSG_TRANSFER_PROHIBITED: &str =
    "Transfer of object is prohibited. The request can not be accepted.";
const MSG_EMAIL_REJECTED: &str = "The email was not found or the address is not valid.";
const MSG_ALREADY_BLOCKED: &str =
    "This object is already blocked. The request can not be accepted.";
const MSG_NOT_BLOCKED: &str = "This object is not blocked. The request can not be accepted.";
const MSG_DIFFERENT_BLOCK: &str =
    "This object has another active blocking. The request can not be accepted.";
const MSG_OPERATION_PROHIBITED: &str =
    "Operation for this object is prohibited. The request can not be accepted.";

#[derive(Debug, Default, Deserialize)]
pub struct SendPasswordQuery {
    handle: Option<String>,
    object_type: Option<String>,
    send_to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockUnblockQuery {
    handle: Option<String>,
    object_type: Option<String>,
    lock_type: Option<String>,
}

/// `GET /send-password/`
pub async fn send_password_form(Query(query): Query<SendPasswordQuery>) -> Response {
    let send_to = query
        .send_to
        .as_deref()
        .and_then(SendTo::from_str)
        .unwrap_or(SendTo::EmailInRegistry);
    let form = SendPasswordForm {
        object_type: query.object_type.unwrap_or_default(),
        handle: query.handle.unwrap_or_default(),
        send_to: send_to.as_str().to_string(),
        ..SendPasswordForm::default()
    };
    send_password_view(&form, &FieldErrors::default()).into_response()
}

/// `POST /send-password/`
pub async fn send_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SendPasswordForm>,
) -> Result<Response, WebwhoisError> {
    let errors = match form.validate() {
        Ok(data) => match send_password_submit(&state, &client_ip(&headers), &data).await? {
            Submission::Accepted { public_key } => {
                return Ok(redirect_found(&delivery_response_path(
                    data.send_to,
                    data.chosen_method,
                    &public_key,
                )));
            }
            Submission::Refused { field, message } => FieldErrors::single(field, message),
        },
        Err(errors) => errors,
    };
    Ok(send_password_view(&form, &errors).into_response())
}

/// `GET /personal-info/`
pub async fn personal_info_form() -> Response {
    let form = PersonalInfoForm {
        send_to: SendTo::EmailInRegistry.as_str().to_string(),
        ..PersonalInfoForm::default()
    };
    personal_info_view(&form, &FieldErrors::default()).into_response()
}

/// `POST /personal-info/`
pub async fn personal_info(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<PersonalInfoForm>,
) -> Result<Response, WebwhoisError> {
    let errors = match form.validate() {
        Ok(data) => match personal_info_submit(&state, &client_ip(&headers), &data).await? {
            Submission::Accepted { public_key } => {
                return Ok(redirect_found(&delivery_response_path(
                    data.send_to,
                    data.chosen_method,
                    &public_key,
                )));
            }
            Submission::Refused { field, message } => FieldErrors::single(field, message),
        },
        Err(errors) => errors,
    };
    Ok(personal_info_view(&form, &errors).into_response())
}

/// `GET /block-object/`
pub async fn block_form(Query(query): Query<BlockUnblockQuery>) -> Response {
    block_unblock_view(BLOCK_TEMPLATE, &initial_block_form(query), &FieldErrors::default())
        .into_response()
}

/// `POST /block-object/`
pub async fn block(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<BlockUnblockForm>,
) -> Result<Response, WebwhoisError> {
    block_unblock(state, headers, form, BlockAction::Block, BLOCK_TEMPLATE).await
}

/// `GET /unblock-object/`
pub async fn unblock_form(Query(query): Query<BlockUnblockQuery>) -> Response {
    block_unblock_view(UNBLOCK_TEMPLATE, &initial_block_form(query), &FieldErrors::default())
        .into_response()
}

/// `POST /unblock-object/`
pub async fn unblock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<BlockUnblockForm>,
) -> Result<Response, WebwhoisError> {
    block_unblock(state, headers, form, BlockAction::Unblock, UNBLOCK_TEMPLATE).await
}

async fn block_unblock(
    state: AppState,
    headers: HeaderMap,
    form: BlockUnblockForm,
    action: BlockAction,
    template: &'static str,
) -> Result<Response, WebwhoisError> {
    let errors = match form.validate() {
        Ok(data) => {
            match block_unblock_submit(&state, &client_ip(&headers), action, &data).await? {
                Submission::Accepted { public_key } => {
                    return Ok(redirect_found(&confirmation_response_path(
                        data.chosen_method,
                        &public_key,
                    )));
                }
                Submission::Refused { field, message } => FieldErrors::single(field, message),
            }
        }
        Err(errors) => errors,
    };
    Ok(block_unblock_view(template, &form, &errors).into_response())
}

fn initial_block_form(query: BlockUnblockQuery) -> BlockUnblockForm {
    let lock_level = query
        .lock_type
        .as_deref()
        .and_then(LockLevel::from_str)
        .unwrap_or(LockLevel::Transfer);
    BlockUnblockForm {
        lock_type: lock_level.as_str().to_string(),
        object_type: query.object_type.unwrap_or_default(),
        handle: query.handle.unwrap_or_default(),
        ..BlockUnblockForm::default()
    }
}

fn send_password_view(form: &SendPasswordForm, errors: &FieldErrors) -> View {
    View::new(
        SEND_PASSWORD_TEMPLATE,
        json!({
            "form": {
                "object_type": form.object_type,
                "handle": form.handle,
                "send_to": form.send_to,
                "custom_email": form.custom_email,
                "confirmation_method": form.confirmation_method,
                "errors": errors,
            },
        }),
    )
}

fn personal_info_view(form: &PersonalInfoForm, errors: &FieldErrors) -> View {
    View::new(
        PERSONAL_INFO_TEMPLATE,
        json!({
            "form": {
                "handle": form.handle,
                "send_to": form.send_to,
                "custom_email": form.custom_email,
                "confirmation_method": form.confirmation_method,
                "errors": errors,
            },
        }),
    )
}

fn block_unblock_view(template: &'static str, form: &BlockUnblockForm, errors: &FieldErrors) -> View {
    View::new(
        template,
        json!({
            "form": {
                "lock_type": form.lock_type,
                "object_type": form.object_type,
                "handle": form.handle,
                "confirmation_method": form.confirmation_method,
                "errors": errors,
            },
        }),
    )
}

/// How an accepted or refused submission ends. Unexpected backend
/// failures leave through [`WebwhoisError`] instead.
enum Submission {
    Accepted { public_key: String },
    Refused { field: &'static str, message: &'static str },
}

/// Run one submission inside its audit bracket.
///
/// The bracket closes exactly once on every path: `Ok` with the
/// `publicrequest` reference, `Fail` with the refusal reason, or
/// `Error` with the exception name. Refusals are the backend errors the
/// form can explain to the visitor; `refusal` maps them to a field and
/// message, anything it does not map propagates.
async fn submit<C, Fut, R>(
    state: &AppState,
    source_ip: &str,
    request_type: LogRequestType,
    properties: Vec<(String, String)>,
    command: C,
    refusal: fn(&RegistryError) -> Option<(&'static str, &'static str)>,
    response: R,
) -> Result<Submission, WebwhoisError>
where
    C: FnOnce(Option<LogRequestId>) -> Fut,
    Fut: Future<Output = Result<i64, RegistryError>>,
    R: FnOnce(i64) -> PublicResponse,
{
    let public_key = CorrelationStore::new_public_key();
    let entry = state
        .audit
        .open(source_ip, LogService::PublicRequest, request_type, &properties)
        .await?;
    match command(entry.request_id()).await {
        Ok(public_request_id) => {
            state
                .correlation
                .store(public_key.clone(), response(public_request_id))
                .await;
            let references = [("publicrequest".to_string(), public_request_id)];
            entry.close(LogResult::Ok, &[], &references).await;
            Ok(Submission::Accepted { public_key })
        }
        Err(err) => match refusal(&err) {
            Some((field, message)) => {
                let reason = [("reason".to_string(), err.kind_name().to_string())];
                entry.close(LogResult::Fail, &reason, &[]).await;
                Ok(Submission::Refused { field, message })
            }
            None => {
                entry.close_error(err.kind_name()).await;
                Err(err.into())
            }
        },
    }
}

async fn send_password_submit(
    state: &AppState,
    source_ip: &str,
    data: &SendPasswordData,
) -> Result<Submission, WebwhoisError> {
    let properties = delivery_properties(
        &data.handle,
        data.object_type.as_str(),
        data.send_to,
        data.chosen_method,
        data.custom_email.as_deref(),
    );
    let today = state.timestamps.local_date(OffsetDateTime::now_utc());
    submit(
        state,
        source_ip,
        LogRequestType::AuthInfo,
        properties,
        |log_request_id| async move {
            match data.send_to {
                SendTo::CustomEmail => {
                    // Cross-field validation guarantees the email on this path.
                    let email = data.custom_email.as_deref().unwrap_or_default();
                    state
                        .public_request
                        .create_authinfo_request_non_registry_email(
                            data.object_type,
                            &data.handle,
                            log_request_id,
                            effective_method(data.chosen_method),
                            email,
                        )
                        .await
                }
                SendTo::EmailInRegistry => {
                    state
                        .public_request
                        .create_authinfo_request_registry_email(
                            data.object_type,
                            &data.handle,
                            log_request_id,
                        )
                        .await
                }
            }
        },
        password_refusal,
        |public_request_id| PublicResponse {
            object_type: data.object_type,
            public_request_id,
            request_type: LogRequestType::AuthInfo,
            handle: data.handle.clone(),
            confirmation_method: effective_method(data.chosen_method),
            create_date: today,
            kind: ResponseKind::SendPassword {
                custom_email: data.custom_email.clone(),
            },
        },
    )
    .await
}

async fn personal_info_submit(
    state: &AppState,
    source_ip: &str,
    data: &PersonalInfoData,
) -> Result<Submission, WebwhoisError> {
    let properties = delivery_properties(
        &data.handle,
        ObjectType::Contact.as_str(),
        data.send_to,
        data.chosen_method,
        data.custom_email.as_deref(),
    );
    let today = state.timestamps.local_date(OffsetDateTime::now_utc());
    submit(
        state,
        source_ip,
        LogRequestType::PersonalInfo,
        properties,
        |log_request_id| async move {
            match data.send_to {
                SendTo::CustomEmail => {
                    let email = data.custom_email.as_deref().unwrap_or_default();
                    state
                        .public_request
                        .create_personal_info_request_non_registry_email(
                            &data.handle,
                            log_request_id,
                            effective_method(data.chosen_method),
                            email,
                        )
                        .await
                }
                SendTo::EmailInRegistry => {
                    state
                        .public_request
                        .create_personal_info_request_registry_email(&data.handle, log_request_id)
                        .await
                }
            }
        },
        personal_info_refusal,
        |public_request_id| PublicResponse {
            object_type: ObjectType::Contact,
            public_request_id,
            request_type: LogRequestType::PersonalInfo,
            handle: data.handle.clone(),
            confirmation_method: effective_method(data.chosen_method),
            create_date: today,
            kind: ResponseKind::PersonalInfo {
                custom_email: data.custom_email.clone(),
            },
        },
    )
    .await
}

async fn block_unblock_submit(
    state: &AppState,
    source_ip: &str,
    action: BlockAction,
    data: &BlockUnblockData,
) -> Result<Submission, WebwhoisError> {
    let request_type = block_request_type(action, data.lock_level);
    let properties = block_properties(&data.handle, data.object_type.as_str(), data.chosen_method);
    let today = state.timestamps.local_date(OffsetDateTime::now_utc());
    submit(
        state,
        source_ip,
        request_type,
        properties,
        |log_request_id| async move {
            state
                .public_request
                .create_block_unblock_request(
                    data.object_type,
                    &data.handle,
                    log_request_id,
                    effective_method(data.chosen_method),
                    lock_request(action, data.lock_level),
                )
                .await
        },
        block_refusal,
        |public_request_id| PublicResponse {
            object_type: data.object_type,
            public_request_id,
            request_type,
            handle: data.handle.clone(),
            confirmation_method: effective_method(data.chosen_method),
            create_date: today,
            kind: ResponseKind::Block {
                action,
                lock_level: data.lock_level,
            },
        },
    )
    .await
}

/// Audit properties of a password or personal-data request. The
/// `confirmMethod` property is recorded only when the visitor picked a
/// method, `customEmail` only when the delivery goes to one.
fn delivery_properties(
    handle: &str,
    handle_type: &str,
    send_to: SendTo,
    chosen_method: Option<ConfirmationMethod>,
    custom_email: Option<&str>,
) -> Vec<(String, String)> {
    let mut properties = vec![
        ("handle".to_string(), handle.to_string()),
        ("handleType".to_string(), handle_type.to_string()),
        ("sendTo".to_string(), send_to.as_str().to_string()),
    ];
    if let Some(method) = chosen_method {
        properties.push(("confirmMethod".to_string(), method.as_str().to_string()));
    }
    if let Some(email) = custom_email {
        properties.push(("customEmail".to_string(), email.to_string()));
    }
    properties
}

fn block_properties(
    handle: &str,
    handle_type: &str,
    chosen_method: Option<ConfirmationMethod>,
) -> Vec<(String, String)> {
    let mut properties = vec![
        ("handle".to_string(), handle.to_string()),
        ("handleType".to_string(), handle_type.to_string()),
    ];
    if let Some(method) = chosen_method {
        properties.push(("confirmMethod".to_string(), method.as_str().to_string()));
    }
    properties
}

fn block_request_type(action: BlockAction, lock_level: LockLevel) -> LogRequestType {
    match (action, lock_level) {
        (BlockAction::Block, LockLevel::Transfer) => LogRequestType::BlockTransfer,
        (BlockAction::Block, LockLevel::All) => LogRequestType::BlockChanges,
        (BlockAction::Unblock, LockLevel::Transfer) => LogRequestType::UnblockTransfer,
        (BlockAction::Unblock, LockLevel::All) => LogRequestType::UnblockChanges,
    }
}

fn lock_request(action: BlockAction, lock_level: LockLevel) -> LockRequestType {
    match (action, lock_level) {
        (BlockAction::Block, LockLevel::Transfer) => LockRequestType::BlockTransfer,
        (BlockAction::Block, LockLevel::All) => LockRequestType::BlockTransferAndUpdate,
        (BlockAction::Unblock, LockLevel::Transfer) => LockRequestType::UnblockTransfer,
        (BlockAction::Unblock, LockLevel::All) => LockRequestType::UnblockTransferAndUpdate,
    }
}

fn delivery_response_path(
    send_to: SendTo,
    chosen_method: Option<ConfirmationMethod>,
    public_key: &str,
) -> String {
    match send_to {
        SendTo::EmailInRegistry => format!("/email-in-registry/{public_key}/"),
        SendTo::CustomEmail => confirmation_response_path(chosen_method, public_key),
    }
}

fn confirmation_response_path(
    chosen_method: Option<ConfirmationMethod>,
    public_key: &str,
) -> String {
    match effective_method(chosen_method) {
        ConfirmationMethod::SignedEmail => format!("/custom-email/{public_key}/"),
        ConfirmationMethod::NotarizedLetter => format!("/notarized-letter/{public_key}/"),
    }
}

fn password_refusal(err: &RegistryError) -> Option<(&'static str, &'static str)> {
    match err {
        RegistryError::ObjectNotFound => Some(("handle", MSG_OBJECT_NOT_FOUND)),
        RegistryError::ObjectTransferProhibited => Some(("handle", MSG_TRANSFER_PROHIBITED)),
        RegistryError::InvalidEmail => Some(("send_to", MSG_EMAIL_REJECTED)),
        _ => None,
    }
}

fn personal_info_refusal(err: &RegistryError) -> Option<(&'static str, &'static str)> {
    match err {
        RegistryError::ObjectNotFound => Some(("handle", MSG_CONTACT_NOT_FOUND)),
        RegistryError::InvalidEmail => Some(("send_to", MSG_EMAIL_REJECTED)),
        _ => None,
    }
}

fn block_refusal(err: &RegistryError) -> Option<(&'static str, &'static str)> {
    match err {
        RegistryError::ObjectNotFound => Some(("handle", MSG_OBJECT_NOT_FOUND)),
        RegistryError::ObjectAlreadyBlocked => Some(("handle", MSG_ALREADY_BLOCKED)),
        RegistryError::ObjectNotBlocked => Some(("handle", MSG_NOT_BLOCKED)),
        RegistryError::HasDifferentBlock => Some(("handle", MSG_DIFFERENT_BLOCK)),
        RegistryError::OperationProhibited => Some(("handle", MSG_OPERATION_PROHIBITED)),
        _ => None,
    }
}
