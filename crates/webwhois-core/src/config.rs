//! Configuration resolution for webwhois.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Config file (`--config` or `WEBWHOIS_CONFIG`)
//! 3. Environment variables
//! 4. CLI arguments (highest priority)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Complete webwhois configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub registrars: RegistrarConfig,
    #[serde(default)]
    pub cdnskey: CdnskeyConfig,
    #[serde(default)]
    pub datetime: DateTimeConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Registry backend endpoints.
///
/// Each backend service is addressed by its own base URL; operation names
/// are appended by the clients. The audit logger and the CDNSKEY scanner
/// are optional deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub whois_url: String,
    pub public_request_url: String,
    pub record_statement_url: String,
    pub file_manager_url: String,
    pub logger_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            whois_url: "http://localhost:8400/whois".to_string(),
            public_request_url: "http://localhost:8400/public-request".to_string(),
            record_statement_url: "http://localhost:8400/record-statement".to_string(),
            file_manager_url: "http://localhost:8400/file-manager".to_string(),
            logger_url: None,
            timeout_secs: 5,
        }
    }
}

/// Public UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Languages offered to visitors; the first entry is the fallback.
    pub languages: Vec<String>,
    /// Absolute base URL of this gateway, used to build links placed into
    /// confirmation texts (e.g. the public-request form URL).
    pub base_url: String,
    pub dnssec_url: Option<String>,
    /// Company site referenced from blocking confirmation texts.
    pub company_website: Option<String>,
    /// External whois services offered on the search form.
    pub search_engines: Vec<SearchEngine>,
    /// Link shown on "domain not found" and "unmanaged zone" pages.
    pub how_to_register: Option<Link>,
    pub mojeid_registry_endpoint: Option<String>,
    pub mojeid_transfer_endpoint: Option<String>,
    pub mojeid_link_why: Option<String>,
    /// Object lookups allowed per client address in a 24h window before the
    /// captcha gate kicks in. `None` disables the gate.
    pub captcha_max_requests: Option<u32>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "cs".to_string()],
            base_url: "http://localhost:8080".to_string(),
            dnssec_url: None,
            company_website: None,
            search_engines: vec![
                SearchEngine {
                    label: "WHOIS.COM Lookup".to_string(),
                    href: "http://www.whois.com/whois/".to_string(),
                },
                SearchEngine {
                    label: "IANA WHOIS Service".to_string(),
                    href: "http://www.iana.org/whois".to_string(),
                },
            ],
            how_to_register: None,
            mojeid_registry_endpoint: None,
            mojeid_transfer_endpoint: None,
            mojeid_link_why: None,
            captcha_max_requests: None,
        }
    }
}

/// An external whois lookup service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEngine {
    pub label: String,
    pub href: String,
}

/// A labelled hyperlink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub label: String,
}

/// Registrar list configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Membership in any of these groups puts a registrar on the retail list.
    pub certified_groups: Vec<String>,
    /// Membership in any of these groups puts a registrar on the wholesale list.
    pub uncertified_groups: Vec<String>,
    /// URL pattern for per-registrar registration manuals, with `{handle}`
    /// and `{lang}` placeholders. `None` omits manual links from the retail
    /// registrar list.
    pub manual_url_pattern: Option<String>,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            certified_groups: vec!["certified".to_string()],
            uncertified_groups: vec!["uncertified".to_string()],
            manual_url_pattern: None,
        }
    }
}

/// CDNSKEY scanner endpoint. The scan-results pages are served only when
/// the URL is set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CdnskeyConfig {
    pub url: Option<String>,
}

/// Timestamp presentation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DateTimeConfig {
    /// When `true`, timestamps are presented zone-aware in the configured
    /// offset. When `false`, they are converted to the offset and the zone
    /// information is dropped.
    pub use_timezone: bool,
    /// Fixed UTC offset of the presentation zone, e.g. `"+02:00"`.
    pub timezone_offset: String,
}

impl Default for DateTimeConfig {
    fn default() -> Self {
        Self {
            use_timezone: true,
            timezone_offset: "+00:00".to_string(),
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    // Load the config file from the explicit path or WEBWHOIS_CONFIG
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("WEBWHOIS_CONFIG").ok().map(PathBuf::from));
    if let Some(path) = path {
        let overlay = load_config_file(&path)?;
        merge_config(&mut config, overlay);
    }

    // Apply environment overrides
    apply_env_overrides(&mut config);

    Ok(config)
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    // Merge server config
    base.server.listen = overlay.server.listen;

    // Merge backend config
    base.backend.whois_url = overlay.backend.whois_url;
    base.backend.public_request_url = overlay.backend.public_request_url;
    base.backend.record_statement_url = overlay.backend.record_statement_url;
    base.backend.file_manager_url = overlay.backend.file_manager_url;
    if overlay.backend.logger_url.is_some() {
        base.backend.logger_url = overlay.backend.logger_url;
    }
    base.backend.timeout_secs = overlay.backend.timeout_secs;

    // Merge UI config
    base.ui = overlay.ui;

    // Merge registrar config
    base.registrars = overlay.registrars;

    // Merge CDNSKEY config
    if overlay.cdnskey.url.is_some() {
        base.cdnskey.url = overlay.cdnskey.url;
    }

    // Merge datetime config
    base.datetime = overlay.datetime;
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("WEBWHOIS_LISTEN") {
        config.server.listen = val;
    }
    if let Ok(val) = std::env::var("WEBWHOIS_CAPTCHA_MAX_REQUESTS") {
        if let Ok(n) = val.parse() {
            config.ui.captcha_max_requests = Some(n);
        }
    }
    if let Ok(val) = std::env::var("WEBWHOIS_LOGGER_URL") {
        config.backend.logger_url = Some(val);
    }
    if let Ok(val) = std::env::var("WEBWHOIS_CDNSKEY_URL") {
        config.cdnskey.url = Some(val);
    }
    if let Ok(val) = std::env::var("WEBWHOIS_BACKEND_TIMEOUT_SECS") {
        if let Ok(n) = val.parse() {
            config.backend.timeout_secs = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_serves_both_languages() {
        let config = Config::default();
        assert_eq!(config.ui.languages, vec!["en", "cs"]);
    }

    #[test]
    fn default_config_has_no_optional_backends() {
        let config = Config::default();
        assert!(config.backend.logger_url.is_none());
        assert!(config.cdnskey.url.is_none());
        assert!(config.ui.captcha_max_requests.is_none());
    }

    #[test]
    fn default_config_offers_external_search_engines() {
        let config = Config::default();
        let labels: Vec<&str> = config
            .ui
            .search_engines
            .iter()
            .map(|engine| engine.label.as_str())
            .collect();
        assert_eq!(labels, vec!["WHOIS.COM Lookup", "IANA WHOIS Service"]);
    }

    #[test]
    fn default_config_presents_zone_aware_utc() {
        let config = Config::default();
        assert!(config.datetime.use_timezone);
        assert_eq!(config.datetime.timezone_offset, "+00:00");
    }

    #[test]
    fn config_file_overlays_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"server": {{"listen": "127.0.0.1:9000"}}, "backend": {{"logger_url": "http://localhost:8401/logger"}}}}"#
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(
            config.backend.logger_url.as_deref(),
            Some("http://localhost:8401/logger")
        );
        // Untouched sections keep their defaults
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.ui.base_url, "http://localhost:8080");
    }

    #[test]
    fn missing_explicit_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-file.json");
        assert!(load_config(Some(&path)).is_err());
    }
}
