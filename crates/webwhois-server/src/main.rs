//! Webwhois Server
//!
//! Public web whois gateway over the registry backends.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use webwhois_core::config::load_config;
use webwhois_core::tracing_init::init_tracing;
use webwhois_registry::clients::{
    CdnskeyClient, FileManagerClient, HttpCdnskeyClient, HttpFileManagerClient, HttpLoggerClient,
    HttpPublicRequestClient, HttpRecordStatementClient, HttpWhoisClient, PublicRequestClient,
    RecordStatementClient, WhoisClient,
};
use webwhois_registry::decode::TimestampFormatter;

use webwhois_server::audit::AuditLog;
use webwhois_server::captcha::CaptchaCounter;
use webwhois_server::correlation::{CorrelationConfig, CorrelationStore};
use webwhois_server::routes::build_router;
use webwhois_server::state::AppState;
use webwhois_server::status_cache::StatusDescriptionCache;

#[derive(Parser, Debug)]
#[command(name = "webwhois-server")]
#[command(version, about = "Public whois gateway over the registry backends")]
struct Args {
    /// Path to JSON configuration file.
    #[arg(long, env = "WEBWHOIS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on. Overrides the configured value.
    #[arg(long)]
    listen: Option<String>,

    /// Log level filter for the gateway (e.g. "info", "debug", "warn").
    #[arg(long, default_value = "info", env = "WEBWHOIS_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "WEBWHOIS_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = &args.log_level;
    let log_filter = format!("webwhois_server={level},tower_http={level}");
    init_tracing(&log_filter, args.log_json);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.server.listen = listen;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen,
        "Starting webwhois-server"
    );

    let timeout = Duration::from_secs(config.backend.timeout_secs);
    let whois: Arc<dyn WhoisClient> =
        Arc::new(HttpWhoisClient::new(&config.backend.whois_url, timeout)?);
    let public_request: Arc<dyn PublicRequestClient> = Arc::new(HttpPublicRequestClient::new(
        &config.backend.public_request_url,
        timeout,
    )?);
    let record_statement: Arc<dyn RecordStatementClient> = Arc::new(
        HttpRecordStatementClient::new(&config.backend.record_statement_url, timeout)?,
    );
    let file_manager: Arc<dyn FileManagerClient> = Arc::new(HttpFileManagerClient::new(
        &config.backend.file_manager_url,
        timeout,
    )?);
    let cdnskey: Option<Arc<dyn CdnskeyClient>> = match &config.cdnskey.url {
        Some(url) => {
            info!(url = %url, "CDNSKEY scan results enabled");
            Some(Arc::new(HttpCdnskeyClient::new(url, timeout)?))
        }
        None => None,
    };
    let audit = match &config.backend.logger_url {
        Some(url) => AuditLog::new(Some(Arc::new(HttpLoggerClient::new(url, timeout)?))),
        None => {
            warn!("No audit logger configured, requests will not be recorded");
            AuditLog::disabled()
        }
    };

    let timestamps = TimestampFormatter::from_config(&config.datetime)?;
    let correlation = CorrelationStore::new(CorrelationConfig::default());
    let listen = config.server.listen.clone();

    let state = AppState {
        config: Arc::new(config),
        whois,
        public_request,
        record_statement,
        file_manager,
        cdnskey,
        audit,
        correlation: correlation.clone(),
        status_cache: StatusDescriptionCache::new(),
        captcha: CaptchaCounter::new(Duration::from_secs(60 * 60 * 24)),
        timestamps,
    };

    // Drop public responses nobody retrieved within the TTL (hourly)
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(correlation.config().cleanup_interval);
        interval.tick().await; // Skip first immediate tick
        loop {
            interval.tick().await;
            let expired = correlation.cleanup_expired().await;
            if !expired.is_empty() {
                info!(expired = expired.len(), "Expired public responses dropped");
            }
        }
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen.as_str()).await?;
    info!(addr = %listen, "Webwhois server listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Webwhois server stopped");
    Ok(())
}
