//! PDF streaming endpoints.
//!
//! Two documents leave the gateway as PDF: the notarized-letter form a
//! visitor prints and signs to confirm a public request, and the
//! verified record statement of a registry object. Both are produced
//! by the backends and streamed through without buffering.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::error;

use webwhois_registry::clients::{ByteStream, LogRequestType, LogResult, LogService};
use webwhois_registry::types::Language;
use webwhois_registry::{ObjectType, RegistryError};

use crate::error::WebwhoisError;
use crate::request_info::{client_ip, negotiate_lang};
use crate::state::AppState;

/// `GET /pdf-notarized-letter/{public_key}/`
pub async fn notarized_letter_pdf(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let Some(response) = state.correlation.get(&public_key).await else {
        return Err(WebwhoisError::NotFound);
    };
    let language = Language::from_ui_lang(&negotiate_lang(&headers, &state.config.ui));
    let lang_code = language.as_str();

    let mut properties = vec![
        ("handle".to_string(), response.handle.clone()),
        (
            "objectType".to_string(),
            response.object_type.as_str().to_string(),
        ),
        ("pdfLangCode".to_string(), lang_code.to_string()),
        (
            "documentType".to_string(),
            response.request_type.as_str().to_string(),
        ),
    ];
    if let Some(email) = response.custom_email() {
        properties.push(("customEmail".to_string(), email.to_string()));
    }

    let entry = state
        .audit
        .open(
            &client_ip(&headers),
            LogService::PublicRequest,
            LogRequestType::NotarizedLetterPdf,
            &properties,
        )
        .await?;
    match state
        .public_request
        .create_public_request_pdf(response.public_request_id, language)
        .await
    {
        Ok(stream) => {
            let references = [("publicrequest".to_string(), response.public_request_id)];
            entry.close(LogResult::Ok, &[], &references).await;
            Ok(pdf_response(
                stream,
                &format!("notarized-letter-{lang_code}.pdf"),
            ))
        }
        Err(err @ RegistryError::ObjectNotFound) => {
            error!(
                public_request_id = response.public_request_id,
                "Public request behind the notarized letter no longer exists"
            );
            let reason = [("reason".to_string(), err.kind_name().to_string())];
            entry.close(LogResult::Fail, &reason, &[]).await;
            Err(WebwhoisError::NotFound)
        }
        Err(err) => {
            entry.close_error(err.kind_name()).await;
            Err(err.into())
        }
    }
}

/// `GET /record-statement/{object_type}/{handle}/`
pub async fn record_statement(
    State(state): State<AppState>,
    Path((object_type, handle)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let object_type = ObjectType::from_str(&object_type)
        .filter(|t| *t != ObjectType::Registrar)
        .ok_or(WebwhoisError::NotFound)?;

    let properties = [
        ("handle".to_string(), handle.clone()),
        ("objectType".to_string(), object_type.as_str().to_string()),
        ("documentType".to_string(), "public".to_string()),
    ];
    let entry = state
        .audit
        .open(
            &client_ip(&headers),
            LogService::WebWhois,
            LogRequestType::RecordStatement,
            &properties,
        )
        .await?;
    match printout(&state, object_type, &handle).await {
        Ok(stream) => {
            entry.close(LogResult::Ok, &[], &[]).await;
            Ok(pdf_response(
                stream,
                &format!("record-statement-{}-{handle}.pdf", object_type.as_str()),
            ))
        }
        Err(err @ (RegistryError::ObjectNotFound | RegistryError::ObjectDeleteCandidate)) => {
            let reason = [("reason".to_string(), err.kind_name().to_string())];
            entry.close(LogResult::NotFound, &reason, &[]).await;
            Err(WebwhoisError::NotFound)
        }
        Err(err) => {
            entry.close_error(err.kind_name()).await;
            Err(err.into())
        }
    }
}

async fn printout(
    state: &AppState,
    object_type: ObjectType,
    handle: &str,
) -> Result<ByteStream, RegistryError> {
    match object_type {
        ObjectType::Domain => state.record_statement.domain_printout(handle, false).await,
        ObjectType::Contact => state.record_statement.contact_printout(handle, false).await,
        ObjectType::Nsset => state.record_statement.nsset_printout(handle).await,
        ObjectType::Keyset => state.record_statement.keyset_printout(handle).await,
        // Registrars have no printout; the route never admits them.
        ObjectType::Registrar => Err(RegistryError::ObjectNotFound),
    }
}

fn pdf_response(stream: ByteStream, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
