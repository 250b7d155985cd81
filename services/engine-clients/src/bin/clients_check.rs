//! Clients Check
//!
//! Dry-run planner for the client broker. Reads a security context from the
//! `OS_*` environment (or a JSON context record) and reports how each
//! service client would be authenticated. Never contacts a service.
//!
//! # Usage
//! ```bash
//! # Context from the environment
//! OS_AUTH_URL=http://identity:5000/v2.0 OS_USERNAME=demo OS_PASSWORD=... \
//!     OS_TENANT_NAME=demo clients-check
//!
//! # Context from a record file, storage only, machine-readable
//! clients-check --context context.json --service storage --json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use engine_clients::{
    Capabilities, ClientError, ComputeArgs, ComputeOptions, ContextRecord, Credentials,
    IdentityArgs, NetworkArgs, SecurityContext, ServiceKind, StorageArgs,
    DEFAULT_COMPUTE_SERVICE_TYPE, OBJECT_STORE_SERVICE_TYPE,
};

// ============================================================
// CLI Definition
// ============================================================

#[derive(Parser)]
#[command(name = "clients-check")]
#[command(about = "Report how engine service clients would authenticate", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON context record; replaces the individual credential options
    #[arg(long)]
    context: Option<PathBuf>,

    /// Identity service URL
    #[arg(long, env = "OS_AUTH_URL")]
    auth_url: Option<String>,

    #[arg(long, env = "OS_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "OS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[arg(long, env = "OS_TENANT_NAME")]
    tenant: Option<String>,

    #[arg(long, env = "OS_TENANT_ID")]
    tenant_id: Option<String>,

    /// Delegated token, used when no password is given
    #[arg(long, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Engine service account presenting the delegated token
    #[arg(long, env = "OS_SERVICE_USER")]
    service_user: Option<String>,

    #[arg(long, env = "OS_SERVICE_PASSWORD", hide_env_values = true)]
    service_password: Option<String>,

    #[arg(long, env = "OS_SERVICE_TENANT")]
    service_tenant: Option<String>,

    /// Only report this service
    #[arg(long, value_enum)]
    service: Option<Service>,

    /// Compute API service type
    #[arg(long, default_value = DEFAULT_COMPUTE_SERVICE_TYPE)]
    compute_service_type: String,

    /// Print the report (and logs) as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Service {
    Identity,
    Compute,
    Storage,
    Network,
}

impl From<Service> for ServiceKind {
    fn from(service: Service) -> Self {
        match service {
            Service::Identity => ServiceKind::Identity,
            Service::Compute => ServiceKind::Compute,
            Service::Storage => ServiceKind::Storage,
            Service::Network => ServiceKind::Network,
        }
    }
}

impl Cli {
    fn context_record(&self) -> Result<ContextRecord> {
        if let Some(path) = &self.context {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read context record {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("Invalid context record {}", path.display()));
        }

        Ok(ContextRecord {
            auth_url: self.auth_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            tenant: self.tenant.clone(),
            tenant_id: self.tenant_id.clone(),
            auth_token: self.auth_token.clone(),
            service_user: self.service_user.clone(),
            service_password: self.service_password.clone(),
            service_tenant: self.service_tenant.clone(),
        })
    }
}

// ============================================================
// Plan
// ============================================================

#[derive(Debug, Serialize)]
struct ServicePlan {
    service: ServiceKind,
    available: bool,
    strategy: &'static str,
    /// Debug rendering of the argument set; secrets print redacted
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServicePlan {
    fn new(service: ServiceKind, available: bool, strategy: &'static str) -> Self {
        Self {
            service,
            available,
            strategy,
            args: None,
            note: None,
            error: None,
        }
    }

    fn with_args<A: std::fmt::Debug>(mut self, args: Result<A, ClientError>) -> Self {
        match args {
            Ok(args) => self.args = Some(format!("{:?}", args)),
            Err(err) => self.error = Some(err.to_string()),
        }
        self
    }

    fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn plan(
    service: ServiceKind,
    context: &SecurityContext,
    capabilities: Capabilities,
    compute_service_type: &str,
) -> ServicePlan {
    let available = capabilities.is_available(service);
    let plan = ServicePlan::new(service, available, context.credentials().strategy());

    if !available {
        let err = ClientError::CapabilityUnavailable { service };
        return ServicePlan {
            error: Some(err.to_string()),
            ..plan
        };
    }

    match service {
        ServiceKind::Identity => plan.with_args(IdentityArgs::from_context(context)),
        ServiceKind::Compute => {
            let plan = plan.with_args(ComputeArgs::from_context(context, compute_service_type));
            let options = ComputeOptions::no_cache();
            ServicePlan {
                note: Some(format!(
                    "requests {:?}, retried without it if the SDK rejects the option",
                    options
                )),
                ..plan
            }
        }
        ServiceKind::Storage => match context.credentials() {
            Credentials::Password(creds) => {
                plan.with_args(Ok(StorageArgs::with_password(context.auth_url(), creds)))
            }
            Credentials::Token(_) => ServicePlan {
                note: Some(format!(
                    "preauth URL discovered from the identity catalog ({} public endpoint)",
                    OBJECT_STORE_SERVICE_TYPE
                )),
                ..plan
            },
            Credentials::None => {
                plan.with_args::<StorageArgs>(Err(ClientError::MissingCredentials { service }))
            }
        },
        ServiceKind::Network => plan.with_args(NetworkArgs::from_context(context)),
    }
}

fn print_plan(plan: &ServicePlan) {
    let mark = if plan.is_ok() { "✅" } else { "❌" };
    println!("{} {:<9} strategy={}", mark, plan.service, plan.strategy);
    if let Some(args) = &plan.args {
        println!("    args:  {}", args);
    }
    if let Some(note) = &plan.note {
        println!("    note:  {}", note);
    }
    if let Some(error) = &plan.error {
        println!("    error: {}", error);
    }
}

// ============================================================
// Main Entry Point
// ============================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let record = cli.context_record()?;
    let context = SecurityContext::try_from(record).context("Incomplete security context")?;
    let capabilities = Capabilities::detect();

    info!(
        auth_url = %context.auth_url(),
        strategy = context.credentials().strategy(),
        "🔐 Security context loaded"
    );
    debug!(?capabilities, "Optional services in this build");

    let services: Vec<ServiceKind> = match cli.service {
        Some(service) => vec![service.into()],
        None => ServiceKind::ALL.to_vec(),
    };

    let plans: Vec<ServicePlan> = services
        .into_iter()
        .map(|service| plan(service, &context, capabilities, &cli.compute_service_type))
        .collect();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        plans.iter().for_each(print_plan);
    }

    let failed = plans.iter().filter(|plan| !plan.is_ok()).count();
    if failed > 0 {
        warn!(failed, "Some service clients cannot be authenticated");
        anyhow::bail!("{} of {} services cannot be authenticated", failed, plans.len());
    }

    info!("✅ All requested service clients can be authenticated");
    Ok(())
}
