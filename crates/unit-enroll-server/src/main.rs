// crates/unit-enroll-server/src/main.rs
// ============================================================================
// Module: Unit Enroll Entry Point
// Description: Startup wiring for the unit enrolment service.
// Purpose: Resolve the environment once, build the store and workflow, and
//          serve the HTTP surface.
// Dependencies: aws-config, axum, clap, tokio, tracing-subscriber
// ============================================================================

//! ## Overview
//! Startup runs the environment resolution sequence in order: region,
//! caller identity, stage secret, database DSN, and access token. Any
//! configuration failure here is fatal; the process does not start on an
//! unknown stage or unresolved credentials. After that the health probe
//! is spawned and the router serves until shutdown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use unit_enroll_core::EnrollError;
use unit_enroll_core::ProvisioningService;
use unit_enroll_env::EnvContext;
use unit_enroll_env::SecretResolver;
use unit_enroll_env::SsmParameterStore;
use unit_enroll_env::StsCallerIdentity;
use unit_enroll_env::context::default_region;
use unit_enroll_server::AppState;
use unit_enroll_server::AuthPolicy;
use unit_enroll_server::HealthGauge;
use unit_enroll_server::HealthProbe;
use unit_enroll_server::ServerConfig;
use unit_enroll_server::probe::PING_POLLING_FREQ;
use unit_enroll_server::router;
use unit_enroll_store_mysql::MySqlScriptRunner;
use unit_enroll_store_mysql::MySqlStagingStore;
use unit_enroll_store_mysql::MySqlStoreConfig;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Unit enrolment service.
#[derive(Debug, Parser)]
#[command(name = "unit-enroll", about = "Provisions and disables unit records")]
struct Args {
    /// Directory holding the enrolment scripts.
    #[arg(long, default_value = "sql")]
    scripts_dir: PathBuf,
    /// Listen address; defaults to 0.0.0.0 with the PORT env variable.
    #[arg(long)]
    bind: Option<String>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Parses flags, initializes logging, and runs the service.
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    // A managed stage means structured logs and an enforced bearer guard.
    let managed = std::env::var("UP_STAGE").is_ok_and(|stage| !stage.is_empty());
    init_tracing(managed);

    match run(args, managed).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "startup failed");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber; JSON output on managed stages.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves the environment, wires the workflow, and serves requests.
async fn run(args: Args, managed: bool) -> Result<(), EnrollError> {
    let region = default_region();
    tracing::info!(region = %region, "resolved region");
    let sdk = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.clone()))
        .load()
        .await;

    let resolver = SecretResolver::new(Arc::new(SsmParameterStore::new(&sdk)));
    let identity = StsCallerIdentity::new(&sdk);
    let env = EnvContext::load(region, &resolver, &identity).await?;
    env.require_known_stage()?;

    let dsn = env.mysql_dsn(&resolver).await?;
    let api_access_token = resolver.resolve("API_ACCESS_TOKEN").await;

    let config = ServerConfig {
        bind: args.bind.unwrap_or_else(default_bind),
        scripts_dir: args.scripts_dir,
        api_access_token,
        require_auth: managed,
        commit: std::env::var("UP_COMMIT").unwrap_or_default(),
    };
    config.validate()?;

    let store = MySqlStagingStore::connect(&MySqlStoreConfig::new(dsn))?;
    let runner = MySqlScriptRunner::new(store.pool(), &config.scripts_dir, env.code);
    let service = ProvisioningService::new(Arc::new(store.clone()), Arc::new(runner));

    let gauge = Arc::new(HealthGauge::new(config.commit.clone()));
    let probe = HealthProbe::new(Arc::new(store), Arc::clone(&gauge));
    tokio::spawn(probe.run(PING_POLLING_FREQ));

    let auth = if config.require_auth {
        AuthPolicy::Bearer(config.api_access_token.clone())
    } else {
        AuthPolicy::Open
    };
    let app = router(Arc::new(AppState {
        service,
        gauge,
        auth,
    }));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .map_err(|err| EnrollError::configuration(format!("bind {}: {err}", config.bind)))?;
    tracing::info!(bind = %config.bind, stage = %env.code, "listening");
    axum::serve(listener, app)
        .await
        .map_err(|err| EnrollError::dependency(format!("server failed: {err}")))
}

/// Default listen address from the PORT env variable.
fn default_bind() -> String {
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    format!("0.0.0.0:{port}")
}
