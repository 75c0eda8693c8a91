//! Object detail pages.
//!
//! One module per object type. Every page follows the same frame: divert
//! over-quota addresses, open an audit entry, load the object and what it
//! references, close the entry with the outcome and render either the
//! detail view or the exception view.

pub mod contact;
pub mod domain;
pub mod keyset;
pub mod nsset;
pub mod registrar;

use std::future::Future;

use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use webwhois_registry::clients::{LogRequestType, LogResult, LogService};
use webwhois_registry::{ObjectType, RegistryError};

use crate::error::WebwhoisError;
use crate::state::AppState;
use crate::urls::form_path_with_handle;
use crate::view::{View, redirect_found};

pub(crate) const SERVER_EXCEPTION_TEMPLATE: &str = "webwhois/server_exception.html";

/// Outcome of loading one detail page.
pub(crate) enum Detail {
    /// The object exists; render its page.
    Object {
        found_type: &'static str,
        view: View,
    },
    /// A well-understood miss; render the exception page.
    Missing {
        reason: Option<&'static str>,
        view: View,
    },
}

/// Divert addresses over the lookup quota back to the search form before
/// anything touches the registry. Every attempt counts toward the window,
/// diverted ones included.
pub(crate) async fn captcha_gate(
    state: &AppState,
    source_ip: &str,
    handle: &str,
) -> Option<Response> {
    let limit = state.config.ui.captcha_max_requests?;
    if state.captcha.record(source_ip).await > limit {
        return Some(redirect_found(&form_path_with_handle(handle)));
    }
    None
}

/// Run one detail lookup inside its audit bracket.
pub(crate) async fn audited_detail<F>(
    state: &AppState,
    source_ip: &str,
    handle: &str,
    handle_type: &'static str,
    load: F,
) -> Result<Response, WebwhoisError>
where
    F: Future<Output = Result<Detail, RegistryError>>,
{
    let entry = state
        .audit
        .open(
            source_ip,
            LogService::WebWhois,
            LogRequestType::Info,
            &[
                ("handle".to_string(), handle.to_string()),
                ("handleType".to_string(), handle_type.to_string()),
            ],
        )
        .await?;
    match load.await {
        Ok(Detail::Object { found_type, view }) => {
            entry
                .close(
                    LogResult::Ok,
                    &[("foundType".to_string(), found_type.to_string())],
                    &[],
                )
                .await;
            Ok(view.into_response())
        }
        Ok(Detail::Missing { reason, view }) => {
            let properties: Vec<(String, String)> = reason
                .map(|code| vec![("reason".to_string(), code.to_string())])
                .unwrap_or_default();
            entry.close(LogResult::NotFound, &properties, &[]).await;
            Ok(view.into_response())
        }
        Err(err) => {
            entry.close_error(err.kind_name()).await;
            Err(err.into())
        }
    }
}

/// The exception page for one handle.
pub(crate) fn exception_view(handle: &str, server_exception: Value) -> View {
    View::new(
        SERVER_EXCEPTION_TEMPLATE,
        json!({
            "handle": handle,
            "server_exception": server_exception,
        }),
    )
}

/// Exception context for a syntactically unacceptable handle.
pub(crate) fn invalid_handle(handle: &str, code: &'static str) -> Value {
    json!({
        "code": code,
        "title": "Invalid handle",
        "message": format!("{handle} is not a valid handle."),
    })
}

/// Exception context for a plain miss. Carries no code, so the audit
/// entry closes without a reason.
pub(crate) fn not_found(title: &'static str, message: String) -> Value {
    json!({
        "title": title,
        "message": message,
    })
}

/// Resolve status codes into display descriptions for the current
/// language. Codes the registry has no description for stay verbatim.
pub(crate) async fn status_descriptions(
    state: &AppState,
    object_type: ObjectType,
    lang: &str,
    statuses: &[String],
) -> Result<Vec<String>, RegistryError> {
    let descriptions = state
        .status_cache
        .get(state.whois.as_ref(), object_type, lang)
        .await?;
    Ok(statuses
        .iter()
        .map(|status| {
            descriptions
                .get(status)
                .cloned()
                .unwrap_or_else(|| status.clone())
        })
        .collect())
}
