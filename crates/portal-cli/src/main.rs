//! Portal CLI - access-control and session tooling for the school portal
//!
//! # Configuration
//!
//! Configuration is loaded from multiple sources with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PORTAL_*`)
//! 3. Project config (`.portal/config.toml` in current directory)
//! 4. Global config (`~/.portal/config.toml`)
//! 5. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `PORTAL_DEBUG`: Enable debug mode (`true`/`false`)
//! - `PORTAL_URL`: Hosted backend URL
//! - `PORTAL_IDLE_TIMEOUT_SECS`: Inactivity window in seconds
//! - `PORTAL_LOGIN_PATH`: Redirect target after logout
//! - `PORTAL_LOG_LEVEL`: Default log filter
//! - `PORTAL_PUBLIC_KEY`: Public backend key (never printed)
//! - `PORTAL_SERVICE_ROLE_KEY`: Service-role key for privileged feeds (never printed)

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use portal_runtime::{ConfigLoader, ConfigResolver, PortalConfig};
use portal_types::{ClassId, Collection, Operation, ProfileId};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Portal CLI - access policy, privileged feeds and session lifecycle
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate configuration and report which keys are present
    CheckConfig,

    /// Evaluate one request against the access policy and print the decision
    Authorize(AuthorizeArgs),

    /// Run a whitelisted privileged read against a JSON fixture
    Feeds(FeedsArgs),

    /// Run an interactive session: each stdin line is an activity event
    Session(SessionArgs),
}

#[derive(clap::Args, Debug)]
struct AuthorizeArgs {
    /// Role of the principal (admin, teacher, student, anonymous)
    #[arg(long)]
    role: String,

    /// Teacher status as stored in the profile (e.g. "active", "on leave")
    #[arg(long)]
    status: Option<String>,

    /// Profile id (random when omitted)
    #[arg(long)]
    id: Option<ProfileId>,

    /// Assigned or enrolled classes
    #[arg(long, value_delimiter = ',')]
    classes: Vec<ClassId>,

    #[arg(long)]
    collection: Collection,

    #[arg(long)]
    operation: Operation,

    /// Target row attribute for writes, as column=value (repeatable)
    #[arg(long = "row", value_name = "COLUMN=VALUE", value_parser = parse_row_pair)]
    row: Vec<(String, String)>,
}

#[derive(clap::Args, Debug)]
struct FeedsArgs {
    /// JSON fixture of the form { "<collection>": [rows...] }
    #[arg(long)]
    data: PathBuf,

    feed: Feed,

    /// Maximum rows for news and gallery
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Feed {
    Terms,
    News,
    Gallery,
}

#[derive(clap::Args, Debug)]
struct SessionArgs {
    /// Inactivity window in seconds (overrides config)
    #[arg(long)]
    idle_secs: Option<u64>,

    /// Role of the demo principal
    #[arg(long, default_value = "teacher")]
    role: String,

    /// Teacher status of the demo principal
    #[arg(long)]
    status: Option<String>,
}

fn parse_row_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected COLUMN=VALUE, got '{raw}'")),
    }
}

/// CLI-based configuration resolver.
///
/// Applies CLI argument overrides as the highest-priority layer on top
/// of the file/env config from [`ConfigLoader`].
struct CliConfigResolver {
    project_root: PathBuf,
    debug: bool,
    idle_secs: Option<u64>,
}

impl CliConfigResolver {
    fn from_args(args: &Args) -> Self {
        let project_root = args.project.clone().unwrap_or_else(|| {
            std::env::current_dir().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to get current directory, using '.'");
                PathBuf::from(".")
            })
        });

        let idle_secs = match &args.command {
            Command::Session(session) => session.idle_secs,
            _ => None,
        };

        Self {
            project_root,
            debug: args.debug,
            idle_secs,
        }
    }

    fn resolve(&self) -> Result<PortalConfig, portal_runtime::ConfigError> {
        let mut config = ConfigLoader::new()
            .with_project_root(&self.project_root)
            .load()?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl ConfigResolver for CliConfigResolver {
    fn apply(&self, config: &mut PortalConfig) {
        if self.debug {
            config.debug = true;
        }
        if let Some(secs) = self.idle_secs {
            config.session.idle_timeout_secs = secs;
        }
    }
}

/// Terminal filter: --debug > --verbose > RUST_LOG env > config level.
fn terminal_filter(args: &Args, config: &PortalConfig) -> EnvFilter {
    if args.debug || config.debug {
        EnvFilter::new("debug")
    } else if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = CliConfigResolver::from_args(&args);

    let config = resolver
        .resolve()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;

    // Logs go to stderr so stdout stays machine-readable.
    let terminal_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(terminal_layer.with_filter(terminal_filter(&args, &config)))
        .init();

    debug!(path = %resolver.project_root.display(), "Project root");

    match args.command {
        Command::CheckConfig => commands::check_config(&config),
        Command::Authorize(a) => commands::authorize(&a),
        Command::Feeds(f) => commands::feeds(config, &f),
        Command::Session(s) => commands::session(&config, &s).await,
    }
}
