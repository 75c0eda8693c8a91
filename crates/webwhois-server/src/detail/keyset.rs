//! Key set detail page.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::{Value, json};
use webwhois_registry::dnskey::{algorithm_label, flag_labels};
use webwhois_registry::status::STATUS_DELETE_CANDIDATE;
use webwhois_registry::types::Keyset;
use webwhois_registry::{ObjectType, RegistryError};

use super::contact::contact_value;
use super::{
    Detail, audited_detail, captcha_gate, exception_view, invalid_handle, not_found,
    status_descriptions,
};
use crate::error::WebwhoisError;
use crate::request_info::{client_ip, negotiate_lang};
use crate::state::AppState;
use crate::view::View;

pub(crate) const TEMPLATE: &str = "webwhois/keyset.html";

/// `GET /keyset/{handle}/`
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
    let load = load_keyset(&state, &handle, &lang);
    audited_detail(&state, &source_ip, &handle, "keyset", load).await
}

async fn load_keyset(state: &AppState, handle: &str, lang: &str) -> Result<Detail, RegistryError> {
    let keyset = match state.whois.get_keyset_by_handle(handle).await {
        Ok(keyset) => keyset,
        Err(RegistryError::ObjectNotFound) => {
            let exception = not_found(
                "Key server set not found",
                format!("No key set matches {handle} handle."),
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

    let mut data = json!({
        "detail": keyset_value(state, &keyset)?,
        "label": "Keyset",
    });
    append_related(state, &mut data, &keyset, lang).await?;

    let view = View::new(
        TEMPLATE,
        json!({
            "handle": handle,
            "registry_objects": { "keyset": data },
            "object_delete_candidate":
                keyset.statuses.iter().any(|s| s == STATUS_DELETE_CANDIDATE),
        }),
    );
    Ok(Detail::Object {
        found_type: "keyset",
        view,
    })
}

/// Serialized form of one key set. DNSKEY records carry their algorithm
/// and flag labels so the page does not interpret raw numbers.
pub(crate) fn keyset_value(state: &AppState, keyset: &Keyset) -> Result<Value, RegistryError> {
    let dns_keys: Vec<Value> = keyset
        .dns_keys
        .iter()
        .map(|key| {
            json!({
                "flags": key.flags,
                "protocol": key.protocol,
                "alg": key.alg,
                "key": key.key,
                "alg_label": algorithm_label(key.alg),
                "flag_labels": flag_labels(key.flags),
            })
        })
        .collect();
    Ok(json!({
        "handle": keyset.handle,
        "dns_keys": dns_keys,
        "tech_contact_handles": keyset.tech_contact_handles,
        "registrar_handle": keyset.registrar_handle,
        "created": state.timestamps.datetime(keyset.created)?,
        "changed": state.timestamps.datetime_opt(keyset.changed)?,
        "last_transfer": state.timestamps.datetime_opt(keyset.last_transfer)?,
        "statuses": keyset.statuses,
    }))
}

/// Load the technical contacts, the sponsoring registrar and the status
/// descriptions into a keyset context. Shared with the domain page.
pub(crate) async fn append_related(
    state: &AppState,
    data: &mut Value,
    keyset: &Keyset,
    lang: &str,
) -> Result<(), RegistryError> {
    let mut admins = Vec::new();
    for handle in &keyset.tech_contact_handles {
        let contact = state.whois.get_contact_by_handle(handle).await?;
        admins.push(contact_value(&contact, &state.timestamps)?);
    }
    let registrar = state
        .whois
        .get_registrar_by_handle(&keyset.registrar_handle)
        .await?;
    data["admins"] = json!(admins);
    data["registrar"] = json!(registrar);
    data["status_descriptions"] =
        json!(status_descriptions(state, ObjectType::Keyset, lang, &keyset.statuses).await?);
    Ok(())
}
