//! Per-request metadata: client address and negotiated UI language.

use axum::http::HeaderMap;
use webwhois_core::config::UiConfig;

/// Client address as reported by the front proxy.
///
/// The gateway always sits behind a reverse proxy, so the forwarded
/// headers are authoritative. Without them the loopback placeholder is
/// used rather than failing the request.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "127.0.0.1".to_string()
}

/// Negotiate the UI language from `Accept-Language` against the configured
/// language list. Only primary subtags are considered; the first configured
/// language wins as the fallback.
pub fn negotiate_lang(headers: &HeaderMap, ui: &UiConfig) -> String {
    let fallback = ui
        .languages
        .first()
        .cloned()
        .unwrap_or_else(|| "en".to_string());

    let Some(accept) = headers.get("accept-language").and_then(|v| v.to_str().ok()) else {
        return fallback;
    };

    for entry in accept.split(',') {
        let tag = entry.split(';').next().unwrap_or("").trim();
        let primary = tag.split('-').next().unwrap_or("").to_ascii_lowercase();
        if primary.is_empty() {
            continue;
        }
        if ui.languages.iter().any(|lang| *lang == primary) {
            return primary;
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn forwarded_for_takes_first_hop() {
        let headers = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn real_ip_is_a_fallback() {
        let headers = headers(&[("x-real-ip", "198.51.100.3")]);
        assert_eq!(client_ip(&headers), "198.51.100.3");
    }

    #[test]
    fn missing_proxy_headers_fall_back_to_loopback() {
        assert_eq!(client_ip(&HeaderMap::new()), "127.0.0.1");
    }

    #[test]
    fn negotiates_configured_language() {
        let ui = UiConfig::default();
        let headers = headers(&[("accept-language", "cs-CZ,cs;q=0.9,en;q=0.8")]);
        assert_eq!(negotiate_lang(&headers, &ui), "cs");
    }

    #[test]
    fn unknown_language_falls_back_to_first_configured() {
        let ui = UiConfig::default();
        let headers = headers(&[("accept-language", "de-DE,de;q=0.9")]);
        assert_eq!(negotiate_lang(&headers, &ui), "en");
    }

    #[test]
    fn missing_header_falls_back() {
        let ui = UiConfig::default();
        assert_eq!(negotiate_lang(&HeaderMap::new(), &ui), "en");
    }
}
