//! Rendering contract between the gateway and its presentation layer.
//!
//! Handlers do not render HTML. Each page resolves to a [`View`]: a template
//! name plus a JSON context, which a downstream presentation tier turns into
//! markup. Tests assert on the context instead of scraping markup.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// A resolved page: template name plus rendering context.
#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub template: &'static str,
    pub context: Value,
}

impl View {
    pub fn new(template: &'static str, context: Value) -> Self {
        Self { template, context }
    }

    /// Insert an additional key into the context object.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.context {
            map.insert(key.to_string(), value);
        }
        self
    }

    /// Borrow the context as an object map.
    pub fn context_object(&self) -> Option<&Map<String, Value>> {
        self.context.as_object()
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        Json(json!({
            "template": self.template,
            "context": self.context,
        }))
        .into_response()
    }
}

/// A [`View`] served with a non-200 status, for error pages.
#[derive(Debug, Clone)]
pub struct StatusView {
    pub status: StatusCode,
    pub view: View,
}

impl StatusView {
    pub fn new(status: StatusCode, view: View) -> Self {
        Self { status, view }
    }
}

impl IntoResponse for StatusView {
    fn into_response(self) -> Response {
        (self.status, self.view).into_response()
    }
}

/// A plain `302 Found` redirect. [`axum::response::Redirect`] only emits
/// 303/307/308, while this site answers with `Found` throughout.
pub fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
        (),
    )
        .into_response()
}
