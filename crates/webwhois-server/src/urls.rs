//! Site-relative URL building.
//!
//! Handles flow into redirect targets and query strings verbatim, so
//! every URL is assembled through [`url::Url`] and comes out with the
//! unsafe characters percent-encoded.

use url::Url;
use webwhois_registry::ObjectType;

// Only anchors relative URL building, never leaves the process.
const INTERNAL_BASE: &str = "http://webwhois.invalid/";

fn base() -> Url {
    Url::parse(INTERNAL_BASE).expect("fixed base URL parses")
}

fn encoded_path(segments: &[&str]) -> String {
    let mut url = base();
    if let Ok(mut path) = url.path_segments_mut() {
        path.extend(segments).push("");
    }
    url.path().to_string()
}

/// Detail page of one registry object, `/{type}/{handle}/`.
pub fn object_detail_path(object_type: ObjectType, handle: &str) -> String {
    encoded_path(&[object_type.as_str(), handle])
}

/// The type-resolving lookup, `/object/{handle}/`.
pub fn resolver_path(handle: &str) -> String {
    encoded_path(&["object", handle])
}

/// The search form with the handle prefilled, `/form/?handle={handle}`.
pub fn form_path_with_handle(handle: &str) -> String {
    let mut url = base();
    url.set_path("/form/");
    url.query_pairs_mut().append_pair("handle", handle);
    match url.query() {
        Some(query) => format!("/form/?{query}"),
        None => "/form/".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_path_is_percent_encoded() {
        assert_eq!(
            object_detail_path(ObjectType::Domain, "fréd.cz"),
            "/domain/fr%C3%A9d.cz/"
        );
        assert_eq!(
            object_detail_path(ObjectType::Contact, "KOCHQ"),
            "/contact/KOCHQ/"
        );
    }

    #[test]
    fn resolver_path_keeps_plain_handles_untouched() {
        assert_eq!(resolver_path("mycontact"), "/object/mycontact/");
    }

    #[test]
    fn form_path_encodes_the_query_value() {
        assert_eq!(
            form_path_with_handle("fréd cz"),
            "/form/?handle=fr%C3%A9d+cz"
        );
    }
}
