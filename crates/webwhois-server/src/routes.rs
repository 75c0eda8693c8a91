//! The route table.
//!
//! Trailing slashes are significant; redirects and form actions are
//! built with them throughout.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{detail, pdf, public_request, resolver, response_page, scan_results};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/form/", get(resolver::search_form).post(resolver::search))
        .route("/object/{handle}/", get(resolver::resolve))
        .route("/contact/{handle}/", get(detail::contact::detail))
        .route("/nsset/{handle}/", get(detail::nsset::detail))
        .route("/keyset/{handle}/", get(detail::keyset::detail))
        .route("/domain/{handle}/", get(detail::domain::detail))
        .route(
            "/domain/{handle}/scan-results/",
            get(scan_results::scan_results),
        )
        .route("/registrar/{handle}/", get(detail::registrar::detail))
        .route("/registrars/", get(detail::registrar::retail_list))
        .route(
            "/registrars/wholesale/",
            get(detail::registrar::wholesale_list),
        )
        .route(
            "/registrar-download-evaluation-file/{handle}/",
            get(detail::registrar::download_evaluation_file),
        )
        .route(
            "/send-password/",
            get(public_request::send_password_form).post(public_request::send_password),
        )
        .route(
            "/personal-info/",
            get(public_request::personal_info_form).post(public_request::personal_info),
        )
        .route(
            "/block-object/",
            get(public_request::block_form).post(public_request::block),
        )
        .route(
            "/unblock-object/",
            get(public_request::unblock_form).post(public_request::unblock),
        )
        .route(
            "/response-not-found/{public_key}/",
            get(response_page::response_not_found),
        )
        .route(
            "/email-in-registry/{public_key}/",
            get(response_page::email_in_registry),
        )
        .route("/custom-email/{public_key}/", get(response_page::custom_email))
        .route(
            "/notarized-letter/{public_key}/",
            get(response_page::notarized_letter),
        )
        .route(
            "/pdf-notarized-letter/{public_key}/",
            get(pdf::notarized_letter_pdf),
        )
        .route(
            "/record-statement/{object_type}/{handle}/",
            get(pdf::record_statement),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
