//! Registrar detail page, the retail and wholesale listings and the
//! certification evaluation file download.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use rand::seq::SliceRandom;
use serde_json::{Value, json};
use webwhois_registry::RegistryError;
use webwhois_registry::types::{Registrar, RegistrarCertification, RegistrarGroup};

use super::{Detail, audited_detail, captcha_gate, exception_view, invalid_handle, not_found};
use crate::error::WebwhoisError;
use crate::request_info::{client_ip, negotiate_lang};
use crate::state::AppState;
use crate::view::View;

pub(crate) const TEMPLATE: &str = "webwhois/registrar.html";
const LIST_TEMPLATE: &str = "webwhois/registrar_list.html";

/// `GET /registrar/{handle}/`
pub async fn detail(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let source_ip = client_ip(&headers);
    if let Some(diverted) = captcha_gate(&state, &source_ip, &handle).await {
        return Ok(diverted);
    }
    let load = load_registrar(&state, &handle);
    audited_detail(&state, &source_ip, &handle, "registrar", load).await
}

async fn load_registrar(state: &AppState, handle: &str) -> Result<Detail, RegistryError> {
    match state.whois.get_registrar_by_handle(handle).await {
        Ok(registrar) => {
            let view = View::new(
                TEMPLATE,
                json!({
                    "handle": handle,
                    "registry_objects": {
                        "registrar": {
                            "detail": registrar_value(&registrar),
                            "label": "Registrar",
                        },
                    },
                    "object_delete_candidate": false,
                }),
            );
            Ok(Detail::Object {
                found_type: "registrar",
                view,
            })
        }
        Err(RegistryError::ObjectNotFound) => Ok(Detail::Missing {
            reason: None,
            view: exception_view(
                handle,
                not_found(
                    "Registrar not found",
                    format!("No registrar matches {handle} handle."),
                ),
            ),
        }),
        Err(RegistryError::InvalidHandle) => Ok(Detail::Missing {
            reason: Some("INVALID_HANDLE"),
            view: exception_view(handle, invalid_handle(handle, "INVALID_HANDLE")),
        }),
        Err(err) => Err(err),
    }
}

/// Serialized registrar with a usable web address.
pub(crate) fn registrar_value(registrar: &Registrar) -> Value {
    let mut value = json!(registrar);
    value["url"] = Value::String(add_scheme(&registrar.url));
    value
}

/// Add the scheme when the registry stores a bare host name.
fn add_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}

/// `GET /registrars/`
pub async fn retail_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    list(&state, &headers, true).await
}

/// `GET /registrars/wholesale/`
pub async fn wholesale_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    list(&state, &headers, false).await
}

/// One row of the registrar listing, kept typed until the scores have
/// decided the order.
struct RegistrarRow {
    registrar: Registrar,
    cert: Option<RegistrarCertification>,
    score: u8,
}

async fn list(state: &AppState, headers: &HeaderMap, retail: bool) -> Result<Response, WebwhoisError> {
    let groups = state.whois.get_registrar_groups().await?;
    let group_names: &[String] = if retail {
        &state.config.registrars.certified_groups
    } else {
        &state.config.registrars.uncertified_groups
    };
    let members = group_members(&groups, group_names);

    let certifications = state.whois.get_registrar_certification_list().await?;
    let mut rows: Vec<RegistrarRow> = state
        .whois
        .get_registrars()
        .await?
        .into_iter()
        .filter(|registrar| members.contains(&registrar.handle.as_str()))
        .map(|registrar| {
            let cert = certifications
                .iter()
                .find(|cert| cert.registrar_handle == registrar.handle)
                .cloned();
            let score = cert.as_ref().map_or(0, |cert| cert.score);
            RegistrarRow {
                registrar,
                cert,
                score,
            }
        })
        .collect();
    sort_rows(&mut rows);

    let mut view = View::new(
        LIST_TEMPLATE,
        json!({
            "groups": groups
                .iter()
                .map(|group| (group.name.clone(), json!(group)))
                .collect::<serde_json::Map<_, _>>(),
            "registrars": rows.iter().map(row_value).collect::<Vec<_>>(),
            "is_retail": retail,
        }),
    );
    if retail {
        if let Some(pattern) = &state.config.registrars.manual_url_pattern {
            let lang = negotiate_lang(headers, &state.config.ui);
            view = view.with("dobradomena", manual_links(pattern, &lang, &rows));
        }
    }
    Ok(view.into_response())
}

fn group_members<'a>(groups: &'a [RegistrarGroup], names: &[String]) -> Vec<&'a str> {
    let mut members = Vec::new();
    for group in groups {
        if names.contains(&group.name) {
            members.extend(group.members.iter().map(String::as_str));
        }
    }
    members
}

/// Registrars with equal certification scores appear in a random order,
/// better-certified ones always come first.
fn sort_rows(rows: &mut [RegistrarRow]) {
    rows.shuffle(&mut rand::rng());
    rows.sort_by(|a, b| b.score.cmp(&a.score));
}

fn row_value(row: &RegistrarRow) -> Value {
    json!({
        "registrar": registrar_value(&row.registrar),
        "cert": row.cert,
        "score": row.score,
        "stars": row.score,
    })
}

/// Links to the per-registrar manuals, keyed by registrar handle.
fn manual_links(pattern: &str, lang: &str, rows: &[RegistrarRow]) -> Value {
    let mut links = serde_json::Map::new();
    for row in rows {
        let handle = &row.registrar.handle;
        let name = handle.strip_prefix("REG-").unwrap_or(handle).to_lowercase();
        let url = pattern.replace("{handle}", &name).replace("{lang}", lang);
        links.insert(handle.clone(), Value::String(url));
    }
    Value::Object(links)
}

/// `GET /registrar-download-evaluation-file/{handle}/`
pub async fn download_evaluation_file(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Response, WebwhoisError> {
    let certifications = state.whois.get_registrar_certification_list().await?;
    let file_id = certifications
        .iter()
        .find(|cert| cert.registrar_handle == handle)
        .and_then(|cert| cert.evaluation_file_id)
        .ok_or(WebwhoisError::NotFound)?;

    let info = state.file_manager.info(file_id).await?;
    let stream = state.file_manager.load(info.id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, info.mimetype),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", info.name),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
