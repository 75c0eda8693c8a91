//! Confirmation pages for accepted public requests.
//!
//! After a form submission is accepted the visitor lands on one of
//! three pages keyed by the correlation token: a plain acknowledgement
//! when the email goes to the address in the registry, confirmation
//! instructions when it goes to a custom address, and printing
//! instructions when the request is confirmed by a notarized letter.
//! The page texts are selected by the request family and object type.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use webwhois_registry::ObjectType;
use webwhois_registry::decode::format_long_date;

use crate::error::WebwhoisError;
use crate::public_response::{BlockAction, LockLevel, PublicResponse, ResponseKind};
use crate::state::AppState;
use crate::view::View;

const RESPONSE_NOT_FOUND_TEMPLATE: &str = "webwhois/public_request_response_not_found.html";
const EMAIL_IN_REGISTRY_TEMPLATE: &str = "webwhois/public_request_email_in_registry.html";
const CUSTOM_EMAIL_TEMPLATE: &str = "webwhois/public_request_custom_email.html";
const NOTARIZED_LETTER_TEMPLATE: &str = "webwhois/public_request_notarized_letter.html";

/// `GET /response-not-found/{public_key}/`
pub async fn response_not_found(Path(public_key): Path<String>) -> Response {
    View::new(
        RESPONSE_NOT_FOUND_TEMPLATE,
        json!({ "public_key": public_key }),
    )
    .into_response()
}

/// `GET /email-in-registry/{public_key}/`
pub async fn email_in_registry(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> Result<Response, WebwhoisError> {
    let response = stored_response(&state, &public_key).await?;
    let (title, content) = email_in_registry_texts(&response)?;
    Ok(View::new(
        EMAIL_IN_REGISTRY_TEMPLATE,
        json!({
            "public_key": public_key,
            "text_title": title,
            "text_header": title,
            "text_content": content,
        }),
    )
    .into_response())
}

/// `GET /custom-email/{public_key}/`
pub async fn custom_email(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> Result<Response, WebwhoisError> {
    let response = stored_response(&state, &public_key).await?;
    let created_date = format_long_date(response.create_date)?;
    let company_website = state
        .config
        .ui
        .company_website
        .as_deref()
        .unwrap_or("the company website");
    let (title, subject, content) = custom_email_texts(
        &response,
        &state.config.ui.base_url,
        company_website,
        &created_date,
    )?;
    Ok(View::new(
        CUSTOM_EMAIL_TEMPLATE,
        json!({
            "public_key": public_key,
            "text_title": title,
            "text_header": title,
            "text_subject": subject,
            "text_content": content,
        }),
    )
    .into_response())
}

/// `GET /notarized-letter/{public_key}/`
pub async fn notarized_letter(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> Result<Response, WebwhoisError> {
    let response = stored_response(&state, &public_key).await?;
    let (title, pdf_name) = notarized_letter_texts(&response);
    Ok(View::new(
        NOTARIZED_LETTER_TEMPLATE,
        json!({
            "public_key": public_key,
            "text_title": title,
            "text_header": title,
            "pdf_name": pdf_name,
            "notarized_letter_pdf_url": format!("/pdf-notarized-letter/{public_key}/"),
        }),
    )
    .into_response())
}

async fn stored_response(
    state: &AppState,
    public_key: &str,
) -> Result<PublicResponse, WebwhoisError> {
    state
        .correlation
        .get(public_key)
        .await
        .ok_or_else(|| WebwhoisError::UnknownToken(public_key.to_string()))
}

/// The noun the confirmation texts use for an object type.
fn object_noun(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Contact => "contact",
        ObjectType::Domain => "domain name",
        ObjectType::Nsset => "nameserver set",
        ObjectType::Keyset => "keyset",
        ObjectType::Registrar => "registrar",
    }
}

/// Shorter noun used by the "email in registry" acknowledgements.
fn short_noun(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Domain => "domain",
        other => object_noun(other),
    }
}

/// Where the password email ends up for each object type.
fn delivery_target(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Domain => "the email address of domain holder and admin contacts.",
        ObjectType::Nsset => "the email addresses of the nameserver set's technical contacts.",
        ObjectType::Keyset => "the email addresses of the keyset's technical contacts.",
        _ => "the email address from the registry.",
    }
}

fn send_password_title(object_type: ObjectType, handle: &str) -> String {
    let noun = object_noun(object_type);
    format!("Request to send a password (authinfo) for transfer {noun} {handle}")
}

fn email_in_registry_texts(response: &PublicResponse) -> Result<(String, String), WebwhoisError> {
    let handle = &response.handle;
    match &response.kind {
        ResponseKind::SendPassword { .. } => {
            let noun = short_noun(response.object_type);
            let target = delivery_target(response.object_type);
            Ok((
                send_password_title(response.object_type, handle),
                format!(
                    "We received successfully your request for a password to change the \
                     {noun} {handle} sponsoring registrar. An email with the password will \
                     be sent to {target}"
                ),
            ))
        }
        ResponseKind::PersonalInfo { .. } => Ok((
            format!("Request for personal data of contact {handle}"),
            format!(
                "We received your request for personal data of the contact {handle} \
                 successfully. An email with the personal data will be sent to the email \
                 address from the registry."
            ),
        )),
        ResponseKind::Block { .. } => Err(WebwhoisError::MissingResponseKey("send_to")),
    }
}

fn custom_email_texts(
    response: &PublicResponse,
    base_url: &str,
    company_website: &str,
    created_date: &str,
) -> Result<(String, String, String), WebwhoisError> {
    let handle = &response.handle;
    let noun = object_noun(response.object_type);
    let response_id = response.public_request_id;
    match &response.kind {
        ResponseKind::SendPassword { custom_email } => {
            let custom_email = custom_email
                .as_deref()
                .ok_or(WebwhoisError::MissingResponseKey("custom_email"))?;
            let form_url = form_url(base_url, "/send-password/");
            Ok((
                send_password_title(response.object_type, handle),
                format!(
                    "Subject: Request to send a password (authinfo) for transfer \
                     {noun} {handle}:"
                ),
                format!(
                    "I hereby confirm my request to get the password for {noun} {handle}, \
                     submitted through the web form at {form_url} on {created_date}, \
                     assigned id number {response_id}. Please send the password to \
                     {custom_email}."
                ),
            ))
        }
        ResponseKind::PersonalInfo { custom_email } => {
            let custom_email = custom_email
                .as_deref()
                .ok_or(WebwhoisError::MissingResponseKey("custom_email"))?;
            let form_url = form_url(base_url, "/personal-info/");
            Ok((
                format!("Request to send personal information of contact {handle}"),
                format!("Request to send personal information of contact {handle}:"),
                format!(
                    "I hereby confirm my request for personal data of the contact {handle}, \
                     submitted through the web form on {form_url} on {created_date}, \
                     assigned the id number {response_id}. Please send the data to \
                     {custom_email}."
                ),
            ))
        }
        ResponseKind::Block { action, lock_level } => {
            let verb = security_verb(*action);
            let form_url = form_url(base_url, block_form_route(*action));
            let content = match (*action, *lock_level) {
                (BlockAction::Block, LockLevel::Transfer) => format!(
                    "I hereby confirm the request to block any change of the sponsoring \
                     registrar for the {noun} {handle} submitted through the web form on \
                     the web site {form_url} on {created_date} with the assigned \
                     identification number {response_id}, and I request the activation of \
                     the specified blocking option. I agree that, regarding the particular \
                     {noun} {handle}, no change of the sponsoring registrar will be \
                     possible until I cancel the blocking option through the applicable \
                     form on {company_website}."
                ),
                (BlockAction::Block, LockLevel::All) => format!(
                    "I hereby confirm the request to block all changes made to \
                     {noun} {handle} submitted through the web form on the web site \
                     {form_url} on {created_date} with the assigned identification number \
                     {response_id}, and I request the activation of the specified blocking \
                     option. I agree that, with respect to the particular {noun} {handle}, \
                     no change will be possible until I cancel the blocking option through \
                     the applicable form on {company_website}."
                ),
                (BlockAction::Unblock, LockLevel::Transfer) => format!(
                    "I hereby confirm the request to cancel the blocking of the sponsoring \
                     registrar change for the {noun} {handle} submitted through the web \
                     form on {form_url} on {created_date} with the assigned identification \
                     number {response_id}."
                ),
                (BlockAction::Unblock, LockLevel::All) => format!(
                    "I hereby confirm the request to cancel the blocking of all changes \
                     for the {noun} {handle} submitted through the web form on {form_url} \
                     on {created_date} with the assigned identification number \
                     {response_id}."
                ),
            };
            Ok((
                format!("Request to {verb} enhanced object security of {noun} {handle}"),
                format!(
                    "Subject: Confirmation of the request to {verb} enhanced object \
                     security of {noun} {handle}:"
                ),
                content,
            ))
        }
    }
}

fn notarized_letter_texts(response: &PublicResponse) -> (String, &'static str) {
    let handle = &response.handle;
    let noun = object_noun(response.object_type);
    match &response.kind {
        ResponseKind::SendPassword { .. } => (
            send_password_title(response.object_type, handle),
            "Password (authinfo) request",
        ),
        ResponseKind::PersonalInfo { .. } => (
            format!("Request to send personal information of contact {handle}"),
            "Request to personal information",
        ),
        ResponseKind::Block { action, .. } => {
            let verb = security_verb(*action);
            let pdf_name = match action {
                BlockAction::Block => "Enabling enhanced object security Request",
                BlockAction::Unblock => "Disabling enhanced object security Request",
            };
            (
                format!("Request to {verb} enhanced object security of {noun} {handle}"),
                pdf_name,
            )
        }
    }
}

fn security_verb(action: BlockAction) -> &'static str {
    match action {
        BlockAction::Block => "enable",
        BlockAction::Unblock => "disable",
    }
}

fn block_form_route(action: BlockAction) -> &'static str {
    match action {
        BlockAction::Block => "/block-object/",
        BlockAction::Unblock => "/unblock-object/",
    }
}

fn form_url(base_url: &str, route: &str) -> String {
    format!("{}{route}", base_url.trim_end_matches('/'))
}
