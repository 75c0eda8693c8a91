//! Name server set detail page.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use serde_json::{Value, json};
use webwhois_registry::status::STATUS_DELETE_CANDIDATE;
use webwhois_registry::types::Nsset;
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

pub(crate) const TEMPLATE: &str = "webwhois/nsset.html";

/// `GET /nsset/{handle}/`
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
    let load = load_nsset(&state, &handle, &lang);
    audited_detail(&state, &source_ip, &handle, "nsset", load).await
}

async fn load_nsset(state: &AppState, handle: &str, lang: &str) -> Result<Detail, RegistryError> {
    let nsset = match state.whois.get_nsset_by_handle(handle).await {
        Ok(nsset) => nsset,
        Err(RegistryError::ObjectNotFound) => {
            let exception = not_found(
                "Name server set not found",
                format!("No name server set matches {handle} handle."),
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
        "detail": nsset_value(state, &nsset)?,
        "label": "Nsset",
    });
    append_related(state, &mut data, &nsset, lang).await?;

    let view = View::new(
        TEMPLATE,
        json!({
            "handle": handle,
            "registry_objects": { "nsset": data },
            "object_delete_candidate":
                nsset.statuses.iter().any(|s| s == STATUS_DELETE_CANDIDATE),
        }),
    );
    Ok(Detail::Object {
        found_type: "nsset",
        view,
    })
}

/// Serialized form of one name server set.
pub(crate) fn nsset_value(state: &AppState, nsset: &Nsset) -> Result<Value, RegistryError> {
    Ok(json!({
        "handle": nsset.handle,
        "name_servers": nsset.name_servers,
        "tech_contact_handles": nsset.tech_contact_handles,
        "registrar_handle": nsset.registrar_handle,
        "created": state.timestamps.datetime(nsset.created)?,
        "changed": state.timestamps.datetime_opt(nsset.changed)?,
        "last_transfer": state.timestamps.datetime_opt(nsset.last_transfer)?,
        "statuses": nsset.statuses,
    }))
}

/// Load the technical contacts, the sponsoring registrar and the status
/// descriptions into an nsset context. Shared with the domain page.
pub(crate) async fn append_related(
    state: &AppState,
    data: &mut Value,
    nsset: &Nsset,
    lang: &str,
) -> Result<(), RegistryError> {
    let mut admins = Vec::new();
    for handle in &nsset.tech_contact_handles {
        let contact = state.whois.get_contact_by_handle(handle).await?;
        admins.push(contact_value(&contact, &state.timestamps)?);
    }
    let registrar = state
        .whois
        .get_registrar_by_handle(&nsset.registrar_handle)
        .await?;
    data["admins"] = json!(admins);
    data["registrar"] = json!(registrar);
    data["status_descriptions"] =
        json!(status_descriptions(state, ObjectType::Nsset, lang, &nsset.statuses).await?);
    Ok(())
}
