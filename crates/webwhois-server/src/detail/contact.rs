//! Contact detail page.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use regex::Regex;
use serde_json::{Value, json};
use webwhois_core::config::UiConfig;
use webwhois_registry::decode::{TimestampFormatter, decode_birthday};
use webwhois_registry::status::{
    MOJEID_EXCLUDED_STATUSES, STATUS_DELETE_CANDIDATE, STATUS_LINKED, is_verification_status,
    verification_status_icon,
};
use webwhois_registry::types::Contact;
use webwhois_registry::{ObjectType, RegistryError};

use super::{Detail, audited_detail, captcha_gate, exception_view, invalid_handle, not_found};
use crate::error::WebwhoisError;
use crate::request_info::{client_ip, negotiate_lang};
use crate::state::AppState;
use crate::view::View;

pub(crate) const TEMPLATE: &str = "webwhois/contact.html";

static MOJEID_HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](-?[A-Za-z0-9])*$").expect("fixed pattern compiles")
});

/// `GET /contact/{handle}/`
pub async fn detail(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let source_ip = client_ip(&headers);
    if let Some(diverted) = captcha_gate(&state, &source_ip, &handle).await {
        return Ok(diverted);
    }
    let lang = negotiate_lang(&headers, &state.config.ui);
    let load = load_contact(&state, &handle, &lang);
    audited_detail(&state, &source_ip, &handle, "contact", load).await
}

async fn load_contact(
    state: &AppState,
    handle: &str,
    lang: &str,
) -> Result<Detail, RegistryError> {
    let contact = match state.whois.get_contact_by_handle(handle).await {
        Ok(contact) => contact,
        Err(RegistryError::ObjectNotFound) => {
            let exception = not_found(
                "Contact not found",
                format!("No contact matches {handle} handle."),
            );
            return Ok(Detail::Missing {
                reason: None,
                view: exception_view(handle, exception),
            });
        }
        Err(RegistryError::InvalidHandle) => {
            return Ok(Detail::Missing {
                reason: Some("INVALID_HANDLE"),
                view: exception_view(handle, invalid_handle(handle, "INVALID_HANDLE")),
            });
        }
        Err(err) => return Err(err),
    };
    let view = contact_page(state, handle, &contact, lang).await?;
    Ok(Detail::Object {
        found_type: "contact",
        view,
    })
}

async fn contact_page(
    state: &AppState,
    handle: &str,
    contact: &Contact,
    lang: &str,
) -> Result<View, RegistryError> {
    let descriptions = state
        .status_cache
        .get(state.whois.as_ref(), ObjectType::Contact, lang)
        .await?;
    let mut general = Vec::new();
    let mut verification = Vec::new();
    for status in &contact.statuses {
        let label = descriptions
            .get(status)
            .cloned()
            .unwrap_or_else(|| status.clone());
        if is_verification_status(status) {
            verification.push(json!({
                "code": status,
                "label": label,
                "icon": verification_status_icon(status),
            }));
        } else {
            general.push(label);
        }
    }

    let birthday = contact
        .identification
        .disclosed()
        .filter(|identification| identification.kind == "BIRTHDAY")
        .map(|identification| decode_birthday(&identification.value));

    let mut data = json!({
        "detail": contact_value(contact, &state.timestamps)?,
        "label": "Contact",
        "birthday": birthday,
        "status_descriptions": general,
        "verification_status": verification,
        "is_linked": contact.statuses.iter().any(|s| s == STATUS_LINKED),
    });
    if !contact.creating_registrar_handle.is_empty() {
        let registrar = state
            .whois
            .get_registrar_by_handle(&contact.creating_registrar_handle)
            .await?;
        data["creating_registrar"] = json!(registrar);
    }
    if !contact.sponsoring_registrar_handle.is_empty() {
        let registrar = state
            .whois
            .get_registrar_by_handle(&contact.sponsoring_registrar_handle)
            .await?;
        data["sponsoring_registrar"] = json!(registrar);
    }
    if let Some(mojeid) = mojeid_affordance(&state.config.ui, contact) {
        data["mojeid"] = mojeid;
    }

    Ok(View::new(
        TEMPLATE,
        json!({
            "handle": handle,
            "registry_objects": { "contact": data },
            "object_delete_candidate":
                contact.statuses.iter().any(|s| s == STATUS_DELETE_CANDIDATE),
        }),
    ))
}

/// MojeID actions are offered only for plain, unrestricted contacts and
/// only when the endpoints are configured.
fn mojeid_affordance(ui: &UiConfig, contact: &Contact) -> Option<Value> {
    let registry_endpoint = ui.mojeid_registry_endpoint.as_deref()?;
    let transfer_endpoint = ui.mojeid_transfer_endpoint.as_deref()?;
    if !MOJEID_HANDLE.is_match(&contact.handle) {
        return None;
    }
    let excluded = contact
        .statuses
        .iter()
        .any(|status| MOJEID_EXCLUDED_STATUSES.contains(&status.as_str()));
    if excluded {
        return None;
    }
    let mut value = json!({
        "registry_endpoint": registry_endpoint,
        "transfer_endpoint": transfer_endpoint,
    });
    if let Some(why) = &ui.mojeid_link_why {
        value["link_why"] = json!(why);
    }
    Some(value)
}

/// Serialized form of one contact, shared with the pages that embed
/// contacts as related objects.
pub(crate) fn contact_value(
    contact: &Contact,
    times: &TimestampFormatter,
) -> Result<Value, RegistryError> {
    Ok(json!({
        "handle": contact.handle,
        "organization": contact.organization,
        "name": contact.name,
        "address": contact.address,
        "phone": contact.phone,
        "fax": contact.fax,
        "email": contact.email,
        "notify_email": contact.notify_email,
        "vat_number": contact.vat_number,
        "identification": contact.identification,
        "creating_registrar_handle": contact.creating_registrar_handle,
        "sponsoring_registrar_handle": contact.sponsoring_registrar_handle,
        "created": times.datetime(contact.created)?,
        "changed": times.datetime_opt(contact.changed)?,
        "last_transfer": times.datetime_opt(contact.last_transfer)?,
        "statuses": contact.statuses,
    }))
}
