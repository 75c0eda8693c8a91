//! Webwhois Server Library
//!
//! The HTTP layer of the whois gateway:
//! - Handle resolution and object detail pages
//! - Public request forms, confirmation pages and PDF streaming
//! - Audit bracketing around every registry operation
//! - Correlation store for accepted requests and captcha gating

pub mod audit;
pub mod captcha;
pub mod correlation;
pub mod detail;
pub mod error;
pub mod forms;
pub mod pdf;
pub mod public_request;
pub mod public_response;
pub mod request_info;
pub mod resolver;
pub mod response_page;
pub mod routes;
pub mod scan_results;
pub mod state;
pub mod status_cache;
pub mod urls;
pub mod view;
