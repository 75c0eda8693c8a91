//! Handler-level failures and their HTTP mapping.
//!
//! Most errors in this gateway are not errors at all: unknown handles,
//! unmanaged zones and malformed input render regular pages with an
//! error context. This type covers the rest, the outcomes that end a
//! request without such a page.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;
use webwhois_registry::RegistryError;

use crate::view::redirect_found;

/// Failures a handler can bail out with.
#[derive(Debug, Error)]
pub enum WebwhoisError {
    /// A backend call failed in a way no page accounts for.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The requested resource does not exist and there is no richer
    /// page to explain it.
    #[error("not found")]
    NotFound,

    /// No stored public response lives under the token. The client is
    /// sent to the response-not-found page instead.
    #[error("no public response stored under the token")]
    UnknownToken(String),

    /// A stored public response does not carry the entry the page
    /// rendering it expects. Reaching a presenter with a response of
    /// the wrong kind is a routing bug, not a user mistake.
    #[error("stored public response has no {0:?} entry")]
    MissingResponseKey(&'static str),
}

impl IntoResponse for WebwhoisError {
    fn into_response(self) -> Response {
        match self {
            Self::Registry(err) => {
                error!(error = %err, "Backend request failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::UnknownToken(token) => {
                redirect_found(&format!("/response-not-found/{token}/"))
            }
            Self::MissingResponseKey(key) => {
                error!(key, "Stored public response does not fit the page");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use webwhois_registry::RegistryError;

    use super::*;

    #[test]
    fn backend_failure_maps_to_server_error() {
        let err = WebwhoisError::from(RegistryError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_token_redirects_to_response_not_found() {
        let response = WebwhoisError::UnknownToken("a".repeat(64)).into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[header::LOCATION],
            format!("/response-not-found/{}/", "a".repeat(64))
        );
    }

    #[test]
    fn missing_resource_is_a_bare_not_found() {
        assert_eq!(
            WebwhoisError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
