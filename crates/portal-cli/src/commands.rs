//! Subcommand implementations.

use crate::{AuthorizeArgs, Feed, FeedsArgs, SessionArgs};
use anyhow::{Context, Result};
use portal_auth::{AccessPolicy, RowContext};
use portal_runtime::auth::{IdentityResolver, ProfileRecord};
use portal_runtime::config::{Credentials, PUBLIC_KEY_VAR, SERVICE_KEY_VAR};
use portal_runtime::memory::{MemoryAuth, MemoryConnector, MemoryDirectory, MemoryStore};
use portal_runtime::session::{
    ActivityEvent, Appearance, ClientSurface, RedirectTarget, SessionManager, SessionPorts,
    SystemClock, TokioScheduler,
};
use portal_runtime::{DefaultPolicy, PortalConfig, TrustedServer};
use portal_types::{Principal, ProfileId};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tracing::info;

/// `portal check-config`
///
/// Prints presence only. Fails when either key is missing.
pub(crate) fn check_config(config: &PortalConfig) -> Result<()> {
    let credentials = Credentials::from_env();

    println!("config: ok");
    println!(
        "backend: {}",
        config.backend.url.as_deref().unwrap_or("(unset)")
    );
    println!("idle timeout: {}s", config.session.idle_timeout_secs);
    println!("{PUBLIC_KEY_VAR}: {}", presence(credentials.has_public_key()));
    println!("{SERVICE_KEY_VAR}: {}", presence(credentials.has_service_key()));

    credentials.require_public_key()?;
    credentials.require_service_key()?;
    Ok(())
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "missing"
    }
}

fn principal_from(
    role: &str,
    status: Option<&str>,
    id: ProfileId,
    classes: &[portal_types::ClassId],
) -> Principal {
    let mut record = ProfileRecord::new(id, role).with_classes(classes.iter().copied());
    if let Some(status) = status {
        record = record.with_status(status);
    }
    IdentityResolver.resolve(&record)
}

/// `portal authorize`
pub(crate) fn authorize(args: &AuthorizeArgs) -> Result<()> {
    let principal = principal_from(
        &args.role,
        args.status.as_deref(),
        args.id.unwrap_or_default(),
        &args.classes,
    );
    let row = args
        .row
        .iter()
        .fold(RowContext::new(), |row, (column, value)| row.with(column.as_str(), value));

    let decision = DefaultPolicy.authorize(&principal, args.collection, args.operation, &row);

    let output = json!({
        "principal": principal,
        "collection": args.collection,
        "operation": args.operation,
        "allow": decision.is_allowed(),
        "result": decision,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// `portal feeds`
pub(crate) fn feeds(config: PortalConfig, args: &FeedsArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.data)
        .with_context(|| format!("failed to read fixture '{}'", args.data.display()))?;
    let fixture: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse fixture '{}'", args.data.display()))?;
    let store = MemoryStore::from_fixture(&fixture).map_err(|e| anyhow::anyhow!(e))?;

    let connector = MemoryConnector::new(Arc::new(store));
    let server = TrustedServer::start(config, &Credentials::from_env(), &connector)?;

    let rows = match args.feed {
        Feed::Terms => server.list_terms()?,
        Feed::News => server.news_feed(args.limit)?,
        Feed::Gallery => server.spotlight_gallery(args.limit)?,
    };
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

/// Prints surface calls and wakes the input loop on redirect.
struct ConsoleSurface {
    ended: Arc<Notify>,
}

impl ClientSurface for ConsoleSurface {
    fn apply_appearance(&self, appearance: Appearance) {
        println!("appearance: {appearance}");
    }

    fn redirect(&self, target: &RedirectTarget) {
        println!("redirect: {target}");
        self.ended.notify_one();
    }
}

/// `portal session`
pub(crate) async fn session(config: &PortalConfig, args: &SessionArgs) -> Result<()> {
    let ended = Arc::new(Notify::new());
    let ports = SessionPorts {
        auth: Arc::new(MemoryAuth::new()),
        directory: Arc::new(MemoryDirectory::new()),
        surface: Arc::new(ConsoleSurface {
            ended: Arc::clone(&ended),
        }),
        store: Arc::new(MemoryStore::new()),
        policy: Arc::new(DefaultPolicy),
    };
    let manager = SessionManager::new(
        &config.session,
        ports,
        Arc::new(SystemClock),
        Arc::new(TokioScheduler::new(tokio::runtime::Handle::current())),
    );

    let principal = principal_from(&args.role, args.status.as_deref(), ProfileId::new(), &[]);
    manager.start(principal.clone())?;
    println!(
        "session started: {principal} (idle timeout {}s)",
        manager.idle_timeout().as_secs()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            // A redirect ends the loop before any further input is read.
            biased;
            () = ended.notified() => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    manager.stop();
                    println!("session detached");
                    break;
                };
                match line.trim() {
                    "" => {}
                    "logout" => manager.logout(),
                    "status" => println!("{}", serde_json::to_string(&manager.snapshot())?),
                    other => match other.parse::<ActivityEvent>() {
                        Ok(event) => {
                            manager.record_activity(event);
                            info!(event = %event, "activity recorded");
                        }
                        Err(err) => eprintln!("{err}"),
                    },
                }
            }
        }
    }

    println!("state: {}", manager.state());
    Ok(())
}
