//! CDNSKEY scan results for a domain.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use time::OffsetDateTime;

use webwhois_registry::RegistryError;
use webwhois_registry::clients::{LogRequestType, LogResult, LogService};
use webwhois_registry::dnskey::{algorithm_label, flag_labels};
use webwhois_registry::types::ScanResult;

use crate::detail::domain::idna_encode;
use crate::error::WebwhoisError;
use crate::request_info::client_ip;
use crate::state::AppState;
use crate::view::View;

const SCAN_RESULTS_TEMPLATE: &str = "webwhois/scan_results.html";

/// `GET /domain/{handle}/scan-results/`
///
/// Served only when a scanner endpoint is configured. Results older than
/// the domain's registration are dropped; when the registration instant
/// cannot be established the whole history is shown.
pub async fn scan_results(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let Some(cdnskey) = state.cdnskey.clone() else {
        return Err(WebwhoisError::NotFound);
    };

    let entry = state
        .audit
        .open(
            &client_ip(&headers),
            LogService::WebWhois,
            LogRequestType::ScanResults,
            &[("domain".to_string(), handle.clone())],
        )
        .await?;

    let outcome = async {
        let mut results = cdnskey.raw_scan_results(&handle).await?;
        if let Some(registered) = domain_registered(&state, &handle).await {
            results.retain(|result| result.scan_at >= registered);
        }
        results.sort_by_key(|result| result.scan_at);
        scan_rows(&state, results)
    }
    .await;

    match outcome {
        Ok(rows) => {
            entry.close(LogResult::Ok, &[], &[]).await;
            Ok(View::new(
                SCAN_RESULTS_TEMPLATE,
                json!({ "handle": handle, "scan_results": rows }),
            )
            .into_response())
        }
        Err(RegistryError::ObjectNotFound) => {
            entry.close(LogResult::NotFound, &[], &[]).await;
            Err(WebwhoisError::NotFound)
        }
        Err(err) => {
            entry.close_error(err.kind_name()).await;
            Err(err.into())
        }
    }
}

/// The domain's registration instant, or `None` when the handle does not
/// encode or the registry cannot answer. A `None` disables filtering.
async fn domain_registered(state: &AppState, handle: &str) -> Option<OffsetDateTime> {
    let ascii = idna_encode(handle)?;
    match state.whois.get_domain_by_handle(&ascii).await {
        Ok(domain) => Some(domain.registered),
        Err(_) => None,
    }
}

fn scan_rows(state: &AppState, results: Vec<ScanResult>) -> Result<Vec<Value>, RegistryError> {
    results
        .into_iter()
        .map(|result| {
            Ok(json!({
                "worker_name": result.worker_name,
                "scan_at": state.timestamps.datetime(result.scan_at)?,
                "nameserver": result.nameserver,
                "nameserver_ip": result.nameserver_ip,
                "cdnskey": {
                    "status": result.cdnskey_status,
                    "flags": result.flags,
                    "protocol": result.protocol,
                    "alg": result.alg,
                    "public_key": result.public_key,
                    "alg_label": algorithm_label(result.alg),
                    "flag_labels": flag_labels(result.flags),
                },
            }))
        })
        .collect()
}
