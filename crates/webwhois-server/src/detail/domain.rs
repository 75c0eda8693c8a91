//! Domain detail page.
//!
//! Domain handles arrive in Unicode or ASCII form; the registry only
//! speaks the ASCII (punycode) form, so every lookup goes through IDNA
//! first and the page presents both spellings.

use std::sync::LazyLock;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use regex::Regex;
use serde_json::{Value, json};
use webwhois_registry::clients::WhoisClient;
use webwhois_registry::decode::format_date;
use webwhois_registry::status::STATUS_DELETE_CANDIDATE;
use webwhois_registry::types::Domain;
use webwhois_registry::{ObjectType, RegistryError};

use super::contact::contact_value;
use super::{
    Detail, audited_detail, captcha_gate, exception_view, invalid_handle, keyset, nsset,
    status_descriptions,
};
use crate::error::WebwhoisError;
use crate::request_info::{client_ip, negotiate_lang};
use crate::state::AppState;
use crate::view::View;

pub(crate) const TEMPLATE: &str = "webwhois/domain.html";

// A name with too many labels is shortened to its rightmost two for the
// re-search offer, 'www.sub.domain.cz' -> 'domain.cz'. Domain names with
// more labels can still be valid, e.g. '0.2.4.e164.arpa'.
static EXAMPLE_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([^.]+\.\w+)\.?$").expect("fixed pattern compiles"));

/// Outcome of asking the registry for one domain.
pub(crate) enum DomainQuery {
    Found(Box<Domain>),
    /// The registry refused the lookup because the domain is scheduled
    /// for deletion.
    DeleteCandidate,
    /// Valid name in a managed zone with nothing registered under it.
    Free,
    UnmanagedZone,
    InvalidLabel,
    TooManyLabels,
    /// The handle does not survive IDNA conversion.
    NotIdna,
}

/// UTS-46 conversion to the ASCII form, strict enough to reject the
/// inputs the registry would never accept (leading dots, stray hyphens,
/// non-DNS characters).
pub(crate) fn idna_encode(handle: &str) -> Option<String> {
    idna::domain_to_ascii_strict(handle).ok()
}

pub(crate) async fn query_domain(
    whois: &dyn WhoisClient,
    handle: &str,
) -> Result<DomainQuery, RegistryError> {
    let Some(ascii) = idna_encode(handle) else {
        return Ok(DomainQuery::NotIdna);
    };
    match whois.get_domain_by_handle(&ascii).await {
        Ok(domain) => Ok(DomainQuery::Found(Box::new(domain))),
        Err(RegistryError::ObjectDeleteCandidate) => Ok(DomainQuery::DeleteCandidate),
        Err(RegistryError::ObjectNotFound) => Ok(DomainQuery::Free),
        Err(RegistryError::UnmanagedZone) => Ok(DomainQuery::UnmanagedZone),
        Err(RegistryError::InvalidLabel) => Ok(DomainQuery::InvalidLabel),
        Err(RegistryError::TooManyLabels) => Ok(DomainQuery::TooManyLabels),
        Err(err) => Err(err),
    }
}

/// `GET /domain/{handle}/`
pub async fn detail(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Result<Response, WebwhoisError> {
    let source_ip = client_ip(&headers);
    if let Some(diverted) = captcha_gate(&state, &source_ip, &handle).await {
        return Ok(diverted);
    }
    let lang = negotiate_lang(&headers, &state.config.ui);
    let load = load_domain(&state, &handle, &lang);
    audited_detail(&state, &source_ip, &handle, "domain", load).await
}

async fn load_domain(state: &AppState, handle: &str, lang: &str) -> Result<Detail, RegistryError> {
    match query_domain(state.whois.as_ref(), handle).await? {
        DomainQuery::Found(domain) => domain_page(state, handle, &domain, lang).await,
        DomainQuery::DeleteCandidate => {
            let view = View::new(
                TEMPLATE,
                json!({
                    "handle": handle,
                    "registry_objects": { "domain": Value::Null },
                    "object_delete_candidate": true,
                }),
            );
            Ok(Detail::Object {
                found_type: "domain",
                view,
            })
        }
        DomainQuery::Free => {
            let exception = json!({
                "title": "Domain not found",
                "message": format!("No domain matches {handle} handle."),
                "handle_is_in_zone": true,
            });
            Ok(Detail::Missing {
                reason: None,
                view: exception_view(handle, exception),
            })
        }
        DomainQuery::UnmanagedZone => {
            let zones = state.whois.get_managed_zone_list().await?;
            let exception = json!({
                "code": "UNMANAGED_ZONE",
                "title": "Unmanaged zone",
                "message": format!(
                    "Domain {handle} cannot be found in the registry. \
                     You can search for domains in the these zones only:"
                ),
                "unmanaged_zone": true,
            });
            Ok(Detail::Missing {
                reason: Some("UNMANAGED_ZONE"),
                view: exception_view(handle, exception)
                    .with("managed_zone_list", json!(zones)),
            })
        }
        DomainQuery::InvalidLabel => Ok(Detail::Missing {
            reason: Some("INVALID_LABEL"),
            view: exception_view(handle, invalid_handle(handle, "INVALID_LABEL")),
        }),
        DomainQuery::NotIdna => Ok(Detail::Missing {
            reason: Some("IDNAError"),
            view: exception_view(handle, invalid_handle(handle, "IDNAError")),
        }),
        DomainQuery::TooManyLabels => {
            let exception = json!({
                "code": "TOO_MANY_LABELS",
                "title": "Incorrect input",
                "too_many_parts_in_domain_name": true,
            });
            let mut view = exception_view(handle, exception);
            if let Some(example) = example_domain_name(handle) {
                view = view.with("example_domain_name", json!(example));
            }
            Ok(Detail::Missing {
                reason: Some("TOO_MANY_LABELS"),
                view,
            })
        }
    }
}

async fn domain_page(
    state: &AppState,
    handle: &str,
    domain: &Domain,
    lang: &str,
) -> Result<Detail, RegistryError> {
    let mut data = json!({
        "detail": domain_value(state, domain)?,
        "label": "Domain",
        "status_descriptions":
            status_descriptions(state, ObjectType::Domain, lang, &domain.statuses).await?,
    });

    let delete_candidate = domain.statuses.iter().any(|s| s == STATUS_DELETE_CANDIDATE);
    if !delete_candidate {
        let registrant = state
            .whois
            .get_contact_by_handle(&domain.registrant_handle)
            .await?;
        data["registrant"] = contact_value(&registrant, &state.timestamps)?;
        let registrar = state
            .whois
            .get_registrar_by_handle(&domain.registrar_handle)
            .await?;
        data["registrar"] = json!(registrar);

        let mut admins = Vec::new();
        for admin_handle in &domain.admin_contact_handles {
            let admin = state.whois.get_contact_by_handle(admin_handle).await?;
            admins.push(contact_value(&admin, &state.timestamps)?);
        }
        data["admins"] = json!(admins);

        if let Some(nsset_handle) = &domain.nsset_handle {
            let nsset = state.whois.get_nsset_by_handle(nsset_handle).await?;
            let mut nsset_data = json!({ "detail": nsset::nsset_value(state, &nsset)? });
            nsset::append_related(state, &mut nsset_data, &nsset, lang).await?;
            data["nsset"] = nsset_data;
        }
        if let Some(keyset_handle) = &domain.keyset_handle {
            let keyset = state.whois.get_keyset_by_handle(keyset_handle).await?;
            let mut keyset_data = json!({ "detail": keyset::keyset_value(state, &keyset)? });
            keyset::append_related(state, &mut keyset_data, &keyset, lang).await?;
            data["keyset"] = keyset_data;
        }
    }

    let view = View::new(
        TEMPLATE,
        json!({
            "handle": handle,
            "registry_objects": { "domain": data },
            "object_delete_candidate": delete_candidate,
            "dnssec_url": state.config.ui.dnssec_url,
        }),
    );
    Ok(Detail::Object {
        found_type: "domain",
        view,
    })
}

/// Serialized form of one domain, in both spellings.
pub(crate) fn domain_value(state: &AppState, domain: &Domain) -> Result<Value, RegistryError> {
    let (unicode_handle, _) = idna::domain_to_unicode(&domain.handle);
    Ok(json!({
        "handle": domain.handle,
        "unicode_handle": unicode_handle,
        "registrant_handle": domain.registrant_handle,
        "admin_contact_handles": domain.admin_contact_handles,
        "nsset_handle": domain.nsset_handle,
        "keyset_handle": domain.keyset_handle,
        "registrar_handle": domain.registrar_handle,
        "statuses": domain.statuses,
        "registered": state.timestamps.datetime(domain.registered)?,
        "changed": state.timestamps.datetime_opt(domain.changed)?,
        "last_transfer": state.timestamps.datetime_opt(domain.last_transfer)?,
        "expire": format_date(domain.expire)?,
        "validated_to": domain.validated_to.map(format_date).transpose()?,
    }))
}

fn example_domain_name(handle: &str) -> Option<String> {
    EXAMPLE_DOMAIN
        .captures(handle)
        .and_then(|captures| captures.get(1))
        .map(|example| example.as_str().to_string())
}
