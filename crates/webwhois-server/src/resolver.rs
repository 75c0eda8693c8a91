//! The search form and the type-resolving lookup behind it.
//!
//! One handle can name several registry objects at once, so the lookup
//! probes every type and either redirects straight to the single match
//! or renders a disambiguation page.

use axum::Form;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use webwhois_registry::clients::{LogRequestType, LogResult, LogService};
use webwhois_registry::{ObjectType, RegistryError};

use crate::detail::domain::{self, DomainQuery};
use crate::detail::{captcha_gate, exception_view, invalid_handle};
use crate::error::WebwhoisError;
use crate::forms::FieldErrors;
use crate::forms::whois::WhoisForm;
use crate::request_info::client_ip;
use crate::state::AppState;
use crate::urls::{object_detail_path, resolver_path};
use crate::view::View;
use crate::view::redirect_found;

const FORM_TEMPLATE: &str = "webwhois/form_whois.html";
const MULTIPLE_ENTRIES_TEMPLATE: &str = "webwhois/multiple_entries.html";

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    handle: Option<String>,
}

/// `GET /form/`
pub async fn search_form(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let source_ip = client_ip(&headers);
    let captcha = captcha_required(&state, &source_ip).await;
    let zones = state.whois.get_managed_zone_list().await?;
    Ok(form_view(
        &state,
        query.handle.as_deref().unwrap_or_default(),
        &FieldErrors::default(),
        captcha,
        &zones,
    )
    .into_response())
}

/// `POST /form/`
pub async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<WhoisForm>,
) -> Result<Response, WebwhoisError> {
    let source_ip = client_ip(&headers);
    match form.validate() {
        Ok(handle) => {
            // A successful submission opens the gate again for this
            // address, otherwise the redirect below would bounce back.
            state.captcha.reset(&source_ip).await;
            Ok(redirect_found(&resolver_path(&handle)))
        }
        Err(errors) => {
            let captcha = captcha_required(&state, &source_ip).await;
            let zones = state.whois.get_managed_zone_list().await?;
            Ok(form_view(&state, &form.handle, &errors, captcha, &zones).into_response())
        }
    }
}

async fn captcha_required(state: &AppState, source_ip: &str) -> bool {
    match state.config.ui.captcha_max_requests {
        Some(limit) => state.captcha.count(source_ip).await >= limit,
        None => false,
    }
}

fn form_view(
    state: &AppState,
    handle: &str,
    errors: &FieldErrors,
    captcha_required: bool,
    managed_zone_list: &[String],
) -> View {
    View::new(
        FORM_TEMPLATE,
        json!({
            "form": { "handle": handle, "errors": errors },
            "search_engines": state.config.ui.search_engines,
            "managed_zone_list": managed_zone_list,
            "captcha_required": captcha_required,
        }),
    )
}

/// `GET /object/{handle}/`
pub async fn resolve(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let source_ip = client_ip(&headers);
    if let Some(diverted) = captcha_gate(&state, &source_ip, &handle).await {
        return Ok(diverted);
    }

    let entry = state
        .audit
        .open(
            &source_ip,
            LogService::WebWhois,
            LogRequestType::Info,
            &[
                ("handle".to_string(), handle.clone()),
                ("handleType".to_string(), "multiple".to_string()),
            ],
        )
        .await?;

    if domain::idna_encode(&handle).is_none() {
        entry
            .close(
                LogResult::NotFound,
                &[("reason".to_string(), "IDNAError".to_string())],
                &[],
            )
            .await;
        return Ok(exception_view(&handle, invalid_handle(&handle, "IDNAError")).into_response());
    }

    let probed = match probe_all(&state, &handle).await {
        Ok(probed) => probed,
        Err(err) => {
            entry.close_error(err.kind_name()).await;
            return Err(err.into());
        }
    };

    if probed.hits.is_empty() {
        let zones = match state.whois.get_managed_zone_list().await {
            Ok(zones) => zones,
            Err(err) => {
                entry.close_error(err.kind_name()).await;
                return Err(err.into());
            }
        };
        entry.close(LogResult::NotFound, &[], &[]).await;
        let exception = json!({
            "code": "OBJECT_NOT_FOUND",
            "title": "Record not found",
            "message": format!("{handle} does not match any record."),
            "object_not_found": true,
        });
        let mut view =
            exception_view(&handle, exception).with("managed_zone_list", json!(zones));
        if probed.domain_free {
            if let Some(link) = &state.config.ui.how_to_register {
                view = view.with("how_to_register", json!(link));
            }
        }
        return Ok(view.into_response());
    }

    let properties: Vec<(String, String)> = probed
        .hits
        .iter()
        .map(|hit| ("foundType".to_string(), hit.as_str().to_string()))
        .collect();
    entry.close(LogResult::Ok, &properties, &[]).await;

    if let [only] = probed.hits.as_slice() {
        return Ok(redirect_found(&object_detail_path(*only, &handle)));
    }

    let entries: Vec<Value> = probed
        .hits
        .iter()
        .map(|hit| {
            json!({
                "object_type": hit.as_str(),
                "label": type_label(*hit),
                "url": object_detail_path(*hit, &handle),
            })
        })
        .collect();
    let view = View::new(
        MULTIPLE_ENTRIES_TEMPLATE,
        json!({ "handle": handle, "entries": entries }),
    );
    Ok(view.into_response())
}

struct Probed {
    /// Object types that answered, in probing order.
    hits: Vec<ObjectType>,
    /// The domain probe recognized a managed zone with nothing
    /// registered under the name.
    domain_free: bool,
}

async fn probe_all(state: &AppState, handle: &str) -> Result<Probed, RegistryError> {
    let mut hits = Vec::new();
    if is_hit(state.whois.get_contact_by_handle(handle).await)? {
        hits.push(ObjectType::Contact);
    }
    if is_hit(state.whois.get_nsset_by_handle(handle).await)? {
        hits.push(ObjectType::Nsset);
    }
    if is_hit(state.whois.get_keyset_by_handle(handle).await)? {
        hits.push(ObjectType::Keyset);
    }
    if is_hit(state.whois.get_registrar_by_handle(handle).await)? {
        hits.push(ObjectType::Registrar);
    }

    let mut domain_free = false;
    match domain::query_domain(state.whois.as_ref(), handle).await? {
        DomainQuery::Found(_) | DomainQuery::DeleteCandidate => hits.push(ObjectType::Domain),
        DomainQuery::Free => domain_free = true,
        DomainQuery::UnmanagedZone
        | DomainQuery::InvalidLabel
        | DomainQuery::TooManyLabels
        | DomainQuery::NotIdna => {}
    }
    Ok(Probed { hits, domain_free })
}

/// A handle that is syntactically impossible for one type can still
/// name another, so an invalid-handle answer counts as a plain miss.
fn is_hit<T>(result: Result<T, RegistryError>) -> Result<bool, RegistryError> {
    match result {
        Ok(_) => Ok(true),
        Err(RegistryError::ObjectNotFound | RegistryError::InvalidHandle) => Ok(false),
        Err(err) => Err(err),
    }
}

fn type_label(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Contact => "Contact",
        ObjectType::Nsset => "Nsset",
        ObjectType::Keyset => "Keyset",
        ObjectType::Registrar => "Registrar",
        ObjectType::Domain => "Domain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_mapping_tolerates_type_mismatches() {
        assert!(is_hit(Ok(())).unwrap());
        assert!(!is_hit::<()>(Err(RegistryError::ObjectNotFound)).unwrap());
        assert!(!is_hit::<()>(Err(RegistryError::InvalidHandle)).unwrap());
        assert!(is_hit::<()>(Err(RegistryError::Decode("bad payload".to_string()))).is_err());
    }
}
