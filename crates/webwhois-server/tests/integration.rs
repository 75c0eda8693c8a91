//! End-to-end tests through the full route table.
//!
//! Every backend is replaced by its in-memory fake, so the tests drive
//! real HTTP requests and then assert on the rendered view contexts,
//! the backend calls and the audit trail.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::Value;
use time::macros::{date, datetime};
use tower::ServiceExt;

use webwhois_core::Config;
use webwhois_core::config::{DateTimeConfig, Link};
use webwhois_registry::ObjectType;
use webwhois_registry::clients::CdnskeyClient;
use webwhois_registry::clients::fake::{
    FakeCdnskeyClient, FakeFileManagerClient, FakeLoggerClient, FakePublicRequestClient,
    FakeRecordStatementClient, FakeWhoisClient,
};
use webwhois_registry::decode::TimestampFormatter;
use webwhois_registry::types::{
    Address, Contact, Disclosable, DnsKey, Domain, FileInfo, Identification, Keyset, NameServer,
    Nsset, Registrar, RegistrarCertification, RegistrarGroup, ScanResult,
};
use webwhois_server::audit::AuditLog;
use webwhois_server::captcha::CaptchaCounter;
use webwhois_server::correlation::{CorrelationConfig, CorrelationStore};
use webwhois_server::routes::build_router;
use webwhois_server::state::AppState;
use webwhois_server::status_cache::StatusDescriptionCache;

struct TestGateway {
    app: Router,
    whois: Arc<FakeWhoisClient>,
    public_request: Arc<FakePublicRequestClient>,
    record_statement: Arc<FakeRecordStatementClient>,
    file_manager: Arc<FakeFileManagerClient>,
    cdnskey: Arc<FakeCdnskeyClient>,
    logger: Arc<FakeLoggerClient>,
}

fn gateway() -> TestGateway {
    gateway_with(test_config())
}

/// Base configuration shared by the tests. The base URL matches the
/// server name quoted in the confirmation text assertions.
fn test_config() -> Config {
    let mut config = Config::default();
    config.ui.base_url = "http://testserver/".to_string();
    config
}

fn gateway_with(config: Config) -> TestGateway {
    gateway_inner(config, false)
}

/// A gateway with the CDNSKEY scanner configured.
fn gateway_with_scanner() -> TestGateway {
    gateway_inner(test_config(), true)
}

fn gateway_inner(config: Config, with_scanner: bool) -> TestGateway {
    let whois = Arc::new(FakeWhoisClient::default());
    let public_request = Arc::new(FakePublicRequestClient::default());
    let record_statement = Arc::new(FakeRecordStatementClient::default());
    let file_manager = Arc::new(FakeFileManagerClient::default());
    let cdnskey = Arc::new(FakeCdnskeyClient::default());
    let logger = Arc::new(FakeLoggerClient::default());

    let scanner: Option<Arc<dyn CdnskeyClient>> = if with_scanner {
        Some(cdnskey.clone())
    } else {
        None
    };
    let state = AppState {
        config: Arc::new(config),
        whois: whois.clone(),
        public_request: public_request.clone(),
        record_statement: record_statement.clone(),
        file_manager: file_manager.clone(),
        cdnskey: scanner,
        audit: AuditLog::new(Some(logger.clone())),
        correlation: CorrelationStore::new(CorrelationConfig::default()),
        status_cache: StatusDescriptionCache::new(),
        captcha: CaptchaCounter::new(Duration::from_secs(60 * 60 * 24)),
        timestamps: TimestampFormatter::from_config(&DateTimeConfig::default()).unwrap(),
    };

    TestGateway {
        app: build_router(state),
        whois,
        public_request,
        record_statement,
        file_manager,
        cdnskey,
        logger,
    }
}

async fn get(gw: &TestGateway, uri: &str) -> Response {
    gw.app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(gw: &TestGateway, uri: &str, body: &str) -> Response {
    gw.app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// Decode a rendered view, `{"template": ..., "context": ...}`.
async fn view_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn location(response: &Response) -> String {
    response.headers()[header::LOCATION]
        .to_str()
        .unwrap()
        .to_string()
}

// =========================================================================
// Fixtures
// =========================================================================

fn contact(handle: &str) -> Contact {
    Contact {
        handle: handle.to_string(),
        organization: Disclosable::public(String::new()),
        name: Disclosable::public("Kryten 2X4B".to_string()),
        address: Disclosable::public(Address {
            street1: "Deck 16".to_string(),
            city: "Prague".to_string(),
            postalcode: "11000".to_string(),
            country_code: "CZ".to_string(),
            ..Address::default()
        }),
        phone: Disclosable::private("+420.123456789".to_string()),
        fax: Disclosable::private(String::new()),
        email: Disclosable::private("kryten@example.cz".to_string()),
        notify_email: Disclosable::private(String::new()),
        vat_number: Disclosable::private(String::new()),
        identification: Disclosable::private(Identification {
            kind: "OP".to_string(),
            value: "12345".to_string(),
        }),
        creating_registrar_handle: "REG-FRED_A".to_string(),
        sponsoring_registrar_handle: "REG-FRED_A".to_string(),
        created: datetime!(2015-12-15 07:56:24 UTC),
        changed: None,
        last_transfer: None,
        statuses: vec!["linked".to_string()],
    }
}

fn domain(handle: &str) -> Domain {
    Domain {
        handle: handle.to_string(),
        registrant_handle: "KOCHQ".to_string(),
        admin_contact_handles: Vec::new(),
        nsset_handle: None,
        keyset_handle: None,
        registrar_handle: "REG-FRED_A".to_string(),
        statuses: Vec::new(),
        registered: datetime!(2019-12-09 16:00 UTC),
        changed: None,
        last_transfer: None,
        expire: date!(2023 - 12 - 09),
        validated_to: None,
    }
}

fn nsset(handle: &str) -> Nsset {
    Nsset {
        handle: handle.to_string(),
        name_servers: vec![NameServer {
            name: "ns.example.cz".to_string(),
            ip_addresses: Vec::new(),
        }],
        tech_contact_handles: vec!["KOCHQ".to_string()],
        registrar_handle: "REG-FRED_A".to_string(),
        created: datetime!(2015-12-15 07:56:24 UTC),
        changed: None,
        last_transfer: None,
        statuses: Vec::new(),
    }
}

fn keyset(handle: &str) -> Keyset {
    Keyset {
        handle: handle.to_string(),
        dns_keys: vec![DnsKey {
            flags: 257,
            protocol: 3,
            alg: 13,
            key: "AwEAAddt2AkLfYGKgiEZB5SmIF8E".to_string(),
        }],
        tech_contact_handles: vec!["KOCHQ".to_string()],
        registrar_handle: "REG-FRED_A".to_string(),
        created: datetime!(2015-12-15 07:56:24 UTC),
        changed: None,
        last_transfer: None,
        statuses: Vec::new(),
    }
}

fn registrar(handle: &str) -> Registrar {
    Registrar {
        handle: handle.to_string(),
        name: "Company A".to_string(),
        organization: "Company A L.t.d.".to_string(),
        url: "www.example.cz".to_string(),
        phone: String::new(),
        fax: String::new(),
        address: Address::default(),
    }
}

/// A domain with its referenced records, enough for the detail page.
fn load_domain_world(gw: &TestGateway, handle: &str) {
    gw.whois.add_domain(domain(handle));
    gw.whois.add_contact(contact("KOCHQ"));
    gw.whois.add_registrar(registrar("REG-FRED_A"));
}

fn scan_result(scan_at: time::OffsetDateTime) -> ScanResult {
    ScanResult {
        worker_name: "kryten".to_string(),
        nameserver: "example.net".to_string(),
        nameserver_ip: "10.0.0.1".to_string(),
        cdnskey_status: "insecure-key".to_string(),
        flags: 256,
        protocol: 3,
        alg: 13,
        public_key: "Quagaars!".to_string(),
        scan_at,
    }
}

// =========================================================================
// Handle resolution
// =========================================================================

#[tokio::test]
async fn ambiguous_handle_offers_every_matching_type() {
    let gw = gateway();
    gw.whois.add_contact(contact("testhandle.cz"));
    gw.whois.add_nsset(nsset("testhandle.cz"));
    gw.whois.add_keyset(keyset("testhandle.cz"));
    gw.whois.add_registrar(registrar("testhandle.cz"));
    gw.whois.add_domain(domain("testhandle.cz"));

    let response = get(&gw, "/object/testhandle.cz/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["template"], "webwhois/multiple_entries.html");
    let entries = body["context"]["entries"].as_array().unwrap();
    let listed: Vec<(&str, &str)> = entries
        .iter()
        .map(|entry| {
            (
                entry["object_type"].as_str().unwrap(),
                entry["url"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        listed,
        vec![
            ("contact", "/contact/testhandle.cz/"),
            ("nsset", "/nsset/testhandle.cz/"),
            ("keyset", "/keyset/testhandle.cz/"),
            ("registrar", "/registrar/testhandle.cz/"),
            ("domain", "/domain/testhandle.cz/"),
        ]
    );

    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "Ok");
    assert_eq!(
        closed[0].properties,
        vec![
            ("foundType".to_string(), "contact".to_string()),
            ("foundType".to_string(), "nsset".to_string()),
            ("foundType".to_string(), "keyset".to_string()),
            ("foundType".to_string(), "registrar".to_string()),
            ("foundType".to_string(), "domain".to_string()),
        ]
    );
}

#[tokio::test]
async fn unique_handle_redirects_to_its_detail() {
    let gw = gateway();
    gw.whois.add_contact(contact("KOCHQ"));

    let response = get(&gw, "/object/KOCHQ/").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/contact/KOCHQ/");

    let created = gw.logger.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].service, "Web whois");
    assert_eq!(created[0].request_type, "Info");
    assert_eq!(
        created[0].properties,
        vec![
            ("handle".to_string(), "KOCHQ".to_string()),
            ("handleType".to_string(), "multiple".to_string()),
        ]
    );
}

#[tokio::test]
async fn unknown_handle_renders_not_found_with_the_zone_list() {
    let mut config = test_config();
    config.ui.how_to_register = Some(Link {
        href: "http://www.nic.cz/how/".to_string(),
        label: "How to register".to_string(),
    });
    let gw = gateway_with(config);
    gw.whois
        .set_managed_zones(vec!["cz".to_string(), "0.2.4.e164.arpa".to_string()]);

    let response = get(&gw, "/object/freedom.cz/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["template"], "webwhois/server_exception.html");
    let context = &body["context"];
    assert_eq!(context["server_exception"]["code"], "OBJECT_NOT_FOUND");
    assert_eq!(
        context["managed_zone_list"],
        serde_json::json!(["cz", "0.2.4.e164.arpa"])
    );
    // The name sits in a managed zone with nothing registered under it,
    // so the page offers the registration link.
    assert_eq!(context["how_to_register"]["href"], "http://www.nic.cz/how/");

    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "NotFound");
    assert!(closed[0].properties.is_empty());
}

#[tokio::test]
async fn malformed_name_is_rejected_without_backend_probes() {
    let gw = gateway();

    let response = get(&gw, "/object/%2E%2Eexample.cz/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["context"]["server_exception"]["code"], "IDNAError");

    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "NotFound");
    assert_eq!(
        closed[0].properties,
        vec![("reason".to_string(), "IDNAError".to_string())]
    );
}

// =========================================================================
// IDN domains
// =========================================================================

#[tokio::test]
async fn idn_lookup_resolves_through_the_ascii_spelling() {
    let gw = gateway();
    load_domain_world(&gw, "xn--frd-cma.cz");

    let response = get(&gw, "/object/fr%C3%A9d.cz/").await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/domain/fr%C3%A9d.cz/");
}

#[tokio::test]
async fn idn_domain_detail_serves_both_spellings() {
    let gw = gateway();
    load_domain_world(&gw, "xn--frd-cma.cz");

    for uri in ["/domain/fr%C3%A9d.cz/", "/domain/xn--frd-cma.cz/"] {
        let response = get(&gw, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "uri: {uri}");
        let body = view_body(response).await;
        assert_eq!(body["template"], "webwhois/domain.html");
        let detail = &body["context"]["registry_objects"]["domain"]["detail"];
        assert_eq!(detail["handle"], "xn--frd-cma.cz");
        assert_eq!(detail["unicode_handle"], "fréd.cz");
    }

    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 2);
    assert!(closed.iter().all(|entry| entry.result == "Ok"));
}

// =========================================================================
// Privacy
// =========================================================================

#[tokio::test]
async fn hidden_contact_fields_never_reach_the_page_context() {
    let gw = gateway();
    gw.whois.add_contact(contact("KOCHQ"));
    gw.whois.add_registrar(registrar("REG-FRED_A"));

    let response = get(&gw, "/contact/KOCHQ/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    let detail = &body["context"]["registry_objects"]["contact"]["detail"];

    assert_eq!(detail["name"]["disclose"], true);
    assert_eq!(detail["name"]["value"], "Kryten 2X4B");
    assert_eq!(detail["email"]["disclose"], false);
    assert!(detail["email"].get("value").is_none());
    assert!(detail["phone"].get("value").is_none());
}

// =========================================================================
// Status descriptions
// =========================================================================

#[tokio::test]
async fn status_descriptions_are_fetched_once_per_language() {
    let gw = gateway();
    gw.whois.add_contact(contact("KOCHQ"));
    gw.whois.add_registrar(registrar("REG-FRED_A"));
    gw.whois.add_status_description(
        ObjectType::Contact,
        "en",
        "linked",
        "Has relation to other records in the registry",
    );

    let first = get(&gw, "/contact/KOCHQ/").await;
    let body = view_body(first).await;
    assert_eq!(
        body["context"]["registry_objects"]["contact"]["status_descriptions"],
        serde_json::json!(["Has relation to other records in the registry"])
    );

    get(&gw, "/contact/KOCHQ/").await;
    assert_eq!(gw.whois.status_description_calls(), 1);
}

// =========================================================================
// Public request forms
// =========================================================================

#[tokio::test]
async fn send_password_to_custom_email_confirmed_by_letter() {
    let gw = gateway();
    gw.public_request.set_next_response_id(24);

    let response = post_form(
        &gw,
        "/send-password/",
        "object_type=domain&handle=foo.cz&send_to=custom_email\
         &custom_email=foo%40foo.off&confirmation_method=notarized_letter",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    assert!(location.starts_with("/notarized-letter/"), "{location}");
    let token = location
        .trim_start_matches("/notarized-letter/")
        .trim_end_matches('/');
    assert_eq!(token.len(), 64);

    let calls = gw.public_request.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].operation,
        "create_authinfo_request_non_registry_email"
    );
    assert_eq!(calls[0].params["confirmation_method"], "notarized_letter");
    assert_eq!(calls[0].params["specified_email"], "foo@foo.off");
    assert_eq!(calls[0].params["request_id"], 1);

    let created = gw.logger.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].service, "Public Request");
    assert_eq!(created[0].request_type, "AuthInfo");
    assert_eq!(
        created[0].properties,
        vec![
            ("handle".to_string(), "foo.cz".to_string()),
            ("handleType".to_string(), "domain".to_string()),
            ("sendTo".to_string(), "custom_email".to_string()),
            ("confirmMethod".to_string(), "notarized_letter".to_string()),
            ("customEmail".to_string(), "foo@foo.off".to_string()),
        ]
    );
    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "Ok");
    assert!(closed[0].properties.is_empty());
    assert_eq!(
        closed[0].references,
        vec![("publicrequest".to_string(), 24)]
    );

    // The confirmation page names the document waiting behind the token.
    let page = get(&gw, &location).await;
    assert_eq!(page.status(), StatusCode::OK);
    let body = view_body(page).await;
    assert_eq!(
        body["template"],
        "webwhois/public_request_notarized_letter.html"
    );
    assert_eq!(body["context"]["pdf_name"], "Password (authinfo) request");
    assert_eq!(
        body["context"]["notarized_letter_pdf_url"],
        format!("/pdf-notarized-letter/{token}/")
    );
}

#[tokio::test]
async fn contradictory_delivery_choices_never_reach_the_registry() {
    let gw = gateway();

    let response = post_form(
        &gw,
        "/send-password/",
        "object_type=domain&handle=foo.cz&send_to=email_in_registry\
         &custom_email=foo%40foo.off",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["template"], "webwhois/form_send_password.html");
    let errors = &body["context"]["form"]["errors"];
    assert_eq!(
        errors["__all__"][0],
        "Option \"Send to email in registry\" is incompatible with custom email. \
         Please choose one of the two options."
    );

    assert!(gw.public_request.calls().is_empty());
    assert!(gw.logger.created().is_empty());
}

#[tokio::test]
async fn notarized_letter_to_registry_email_is_refused() {
    let gw = gateway();

    let response = post_form(
        &gw,
        "/send-password/",
        "object_type=domain&handle=foo.cz&send_to=email_in_registry\
         &confirmation_method=notarized_letter",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["template"], "webwhois/form_send_password.html");
    assert_eq!(
        body["context"]["form"]["errors"]["__all__"][0],
        "Letter with officially verified signature can be sent only to the custom email. \
         Please select \"Send to custom email\" and enter it."
    );

    assert!(gw.public_request.calls().is_empty());
    assert!(gw.logger.created().is_empty());
}

#[tokio::test]
async fn personal_info_request_lands_on_the_registry_email_page() {
    let gw = gateway();
    gw.public_request.set_next_response_id(24);

    let response = post_form(
        &gw,
        "/personal-info/",
        "handle=KOCHQ&send_to=email_in_registry",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    assert!(location.starts_with("/email-in-registry/"), "{location}");

    let created = gw.logger.created();
    assert_eq!(created[0].request_type, "PersonalInfo");
    assert_eq!(
        created[0].properties,
        vec![
            ("handle".to_string(), "KOCHQ".to_string()),
            ("handleType".to_string(), "contact".to_string()),
            ("sendTo".to_string(), "email_in_registry".to_string()),
        ]
    );

    let page = get(&gw, &location).await;
    let body = view_body(page).await;
    assert_eq!(
        body["template"],
        "webwhois/public_request_email_in_registry.html"
    );
    assert_eq!(
        body["context"]["text_title"],
        "Request for personal data of contact KOCHQ"
    );
}

#[tokio::test]
async fn block_all_changes_lands_on_the_confirmation_text() {
    let gw = gateway();
    gw.public_request.set_next_response_id(25);

    let response = post_form(
        &gw,
        "/block-object/",
        "lock_type=all&object_type=nsset&handle=NSSET-1&confirmation_method=signed_email",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    let location = location(&response);
    assert!(location.starts_with("/custom-email/"), "{location}");

    let calls = gw.public_request.calls();
    assert_eq!(calls[0].operation, "create_block_unblock_request");
    assert_eq!(
        calls[0].params["lock_request_type"],
        "block_transfer_and_update"
    );

    let created = gw.logger.created();
    assert_eq!(created[0].request_type, "BlockChanges");
    assert_eq!(
        created[0].properties,
        vec![
            ("handle".to_string(), "NSSET-1".to_string()),
            ("handleType".to_string(), "nsset".to_string()),
            ("confirmMethod".to_string(), "signed_email".to_string()),
        ]
    );

    let page = get(&gw, &location).await;
    let body = view_body(page).await;
    let content = body["context"]["text_content"].as_str().unwrap();
    assert!(content.starts_with("I hereby confirm the request to block all changes made to"));
    assert!(content.contains("nameserver set NSSET-1"));
    assert!(content.contains("http://testserver/block-object/"));
}

#[tokio::test]
async fn blocking_an_already_blocked_object_explains_on_the_form() {
    let gw = gateway();
    gw.public_request.set_error("OBJECT_ALREADY_BLOCKED");

    let response = post_form(
        &gw,
        "/block-object/",
        "lock_type=transfer&object_type=domain&handle=blocked.cz",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["template"], "webwhois/form_block_object.html");
    assert_eq!(
        body["context"]["form"]["errors"]["handle"][0],
        "This object is already blocked. The request can not be accepted."
    );

    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "Fail");
    assert_eq!(
        closed[0].properties,
        vec![(
            "reason".to_string(),
            "OBJECT_ALREADY_BLOCKED".to_string()
        )]
    );
    assert!(closed[0].references.is_empty());
}

#[tokio::test]
async fn unexplained_backend_refusal_is_a_server_error() {
    let gw = gateway();
    // The password form has no message for blocking errors; they are
    // not part of its conversation with the visitor.
    gw.public_request.set_error("OBJECT_ALREADY_BLOCKED");

    let response = post_form(
        &gw,
        "/send-password/",
        "object_type=domain&handle=blocked.cz&send_to=email_in_registry",
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "Error");
    assert_eq!(
        closed[0].properties,
        vec![(
            "exception".to_string(),
            "OBJECT_ALREADY_BLOCKED".to_string()
        )]
    );
}

// =========================================================================
// Confirmation pages and tokens
// =========================================================================

#[tokio::test]
async fn unknown_confirmation_token_redirects_to_response_not_found() {
    let gw = gateway();
    let token = "a".repeat(64);

    let response = get(&gw, &format!("/custom-email/{token}/")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), format!("/response-not-found/{token}/"));

    let page = get(&gw, &format!("/response-not-found/{token}/")).await;
    assert_eq!(page.status(), StatusCode::OK);
    let body = view_body(page).await;
    assert_eq!(
        body["template"],
        "webwhois/public_request_response_not_found.html"
    );
    assert_eq!(body["context"]["public_key"], token);
}

// =========================================================================
// PDF streaming
// =========================================================================

#[tokio::test]
async fn notarized_letter_pdf_streams_for_a_stored_response() {
    let gw = gateway();
    gw.public_request.set_next_response_id(24);
    gw.public_request.set_pdf(24, b"%PDF-1.4 letter".to_vec());

    let response = post_form(
        &gw,
        "/send-password/",
        "object_type=domain&handle=foo.cz&send_to=custom_email\
         &custom_email=foo%40foo.off&confirmation_method=notarized_letter",
    )
    .await;
    let token = location(&response)
        .trim_start_matches("/notarized-letter/")
        .trim_end_matches('/')
        .to_string();

    let pdf = get(&gw, &format!("/pdf-notarized-letter/{token}/")).await;
    assert_eq!(pdf.status(), StatusCode::OK);
    assert_eq!(pdf.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        pdf.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"notarized-letter-en.pdf\""
    );
    let bytes = axum::body::to_bytes(pdf.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 letter");

    let created = gw.logger.created();
    assert_eq!(created.len(), 2);
    assert_eq!(created[1].service, "Public Request");
    assert_eq!(created[1].request_type, "NotarizedLetterPdf");
    assert_eq!(
        created[1].properties,
        vec![
            ("handle".to_string(), "foo.cz".to_string()),
            ("objectType".to_string(), "domain".to_string()),
            ("pdfLangCode".to_string(), "en".to_string()),
            ("documentType".to_string(), "AuthInfo".to_string()),
            ("customEmail".to_string(), "foo@foo.off".to_string()),
        ]
    );
    let closed = gw.logger.closed();
    assert_eq!(closed[1].result, "Ok");
    assert_eq!(
        closed[1].references,
        vec![("publicrequest".to_string(), 24)]
    );
}

#[tokio::test]
async fn unknown_pdf_token_is_refused_before_any_backend_call() {
    let gw = gateway();

    let response = get(&gw, &format!("/pdf-notarized-letter/{}/", "a".repeat(64))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(gw.public_request.calls().is_empty());
    assert!(gw.logger.created().is_empty());
}

#[tokio::test]
async fn record_statement_streams_a_public_printout() {
    let gw = gateway();
    gw.record_statement
        .set_document(ObjectType::Domain, "fred.cz", b"%PDF-1.4 statement".to_vec());

    let response = get(&gw, "/record-statement/domain/fred.cz/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"record-statement-domain-fred.cz.pdf\""
    );

    let calls = gw.record_statement.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, "domain_printout");
    assert_eq!(calls[0].params["is_private_printout"], false);

    let created = gw.logger.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].service, "Web whois");
    assert_eq!(created[0].request_type, "RecordStatement");
    assert_eq!(
        created[0].properties,
        vec![
            ("handle".to_string(), "fred.cz".to_string()),
            ("objectType".to_string(), "domain".to_string()),
            ("documentType".to_string(), "public".to_string()),
        ]
    );
    let closed = gw.logger.closed();
    assert_eq!(closed[0].result, "Ok");
    assert!(closed[0].references.is_empty());
}

#[tokio::test]
async fn record_statement_rejects_types_without_printouts() {
    let gw = gateway();

    let response = get(&gw, "/record-statement/registrar/REG-FRED_A/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(gw.logger.created().is_empty());

    let missing = get(&gw, "/record-statement/domain/unknown.cz/").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let closed = gw.logger.closed();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].result, "NotFound");
    assert_eq!(
        closed[0].properties,
        vec![("reason".to_string(), "OBJECT_NOT_FOUND".to_string())]
    );
}

// =========================================================================
// Scan results
// =========================================================================

#[tokio::test]
async fn scan_results_are_truncated_to_the_registration_and_sorted() {
    let gw = gateway_with_scanner();
    load_domain_world(&gw, "fred.cz");
    gw.cdnskey.set_results(
        "fred.cz",
        vec![
            scan_result(datetime!(2020-03-03 13:00 UTC)),
            scan_result(datetime!(2020-03-02 13:00 UTC)),
            // Before the domain was registered, dropped from the page.
            scan_result(datetime!(2019-03-01 13:00 UTC)),
        ],
    );

    let response = get(&gw, "/domain/fred.cz/scan-results/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    assert_eq!(body["template"], "webwhois/scan_results.html");
    let results = body["context"]["scan_results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let first = results[0]["scan_at"].as_str().unwrap();
    let second = results[1]["scan_at"].as_str().unwrap();
    assert!(first < second, "{first} vs {second}");
    assert_eq!(
        results[0]["cdnskey"]["alg_label"],
        "ECDSA Curve P-256 with SHA-256"
    );

    let created = gw.logger.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].service, "Web whois");
    assert_eq!(created[0].request_type, "ScanResults");
    assert_eq!(
        created[0].properties,
        vec![("domain".to_string(), "fred.cz".to_string())]
    );
}

#[tokio::test]
async fn scan_results_without_a_scanner_are_not_served() {
    let gw = gateway();

    let response = get(&gw, "/domain/fred.cz/scan-results/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(gw.logger.created().is_empty());
}

// =========================================================================
// Registrar lists
// =========================================================================

#[tokio::test]
async fn retail_list_carries_only_certified_registrars() {
    let gw = gateway();
    gw.whois.add_registrar(registrar("REG-FRED_A"));
    gw.whois.add_registrar(registrar("REG-FRED_B"));
    gw.whois.add_group(RegistrarGroup {
        name: "certified".to_string(),
        members: vec!["REG-FRED_A".to_string()],
    });
    gw.whois.add_group(RegistrarGroup {
        name: "uncertified".to_string(),
        members: vec!["REG-FRED_B".to_string()],
    });
    gw.whois.add_certification(RegistrarCertification {
        registrar_handle: "REG-FRED_A".to_string(),
        score: 2,
        evaluation_file_id: Some(42),
    });

    let response = get(&gw, "/registrars/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = view_body(response).await;
    let rows = body["context"]["registrars"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["registrar"]["handle"], "REG-FRED_A");
    assert_eq!(rows[0]["stars"], 2);

    let wholesale = get(&gw, "/registrars/wholesale/").await;
    let body = view_body(wholesale).await;
    let rows = body["context"]["registrars"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["registrar"]["handle"], "REG-FRED_B");
}

#[tokio::test]
async fn evaluation_file_download_streams_from_the_file_manager() {
    let gw = gateway();
    gw.whois.add_certification(RegistrarCertification {
        registrar_handle: "REG-FRED_A".to_string(),
        score: 2,
        evaluation_file_id: Some(42),
    });
    gw.file_manager.add_file(
        FileInfo {
            id: 42,
            name: "hodnoceni.pdf".to_string(),
            mimetype: "application/pdf".to_string(),
            size: 8,
        },
        b"%PDF-1.4".to_vec(),
    );

    let response = get(&gw, "/registrar-download-evaluation-file/REG-FRED_A/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"hodnoceni.pdf\""
    );

    let missing = get(&gw, "/registrar-download-evaluation-file/REG-FRED_B/").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// =========================================================================
// Captcha gate
// =========================================================================

#[tokio::test]
async fn over_quota_lookups_divert_to_the_search_form() {
    let mut config = test_config();
    config.ui.captcha_max_requests = Some(1);
    let gw = gateway_with(config);
    gw.whois.add_contact(contact("KOCHQ"));
    gw.whois.add_registrar(registrar("REG-FRED_A"));

    let first = get(&gw, "/contact/KOCHQ/").await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = get(&gw, "/contact/KOCHQ/").await;
    assert_eq!(second.status(), StatusCode::FOUND);
    assert_eq!(location(&second), "/form/?handle=KOCHQ");
    // The diverted lookup never reached the registry or the audit log.
    assert_eq!(gw.logger.created().len(), 1);

    // The form announces the widget for this address now.
    let form = get(&gw, "/form/").await;
    let body = view_body(form).await;
    assert_eq!(body["context"]["captcha_required"], true);

    // Passing the form resets the counter.
    let submit = post_form(&gw, "/form/", "handle=KOCHQ").await;
    assert_eq!(submit.status(), StatusCode::FOUND);
    assert_eq!(location(&submit), "/object/KOCHQ/");
    let again = get(&gw, "/contact/KOCHQ/").await;
    assert_eq!(again.status(), StatusCode::OK);
}
