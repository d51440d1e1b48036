use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tintbar_context::platform::StaticPlatform;
use tintbar_events::EventBus;
use tintbar_prefs::{InMemoryPreferenceStore, PreferenceStoreRef, SqlitePreferenceStore};
use tintbar_service::{ServicePlatform, StatusService};
use tracing_subscriber::EnvFilter;

use crate::scenario::{Scenario, ScenarioListener, Step};

mod scenario;

#[derive(Parser, Debug)]
#[command(name = "tintbar-replay", version, about = "Replay an event scenario through the status service")]
struct Args {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Keep preferences (and the color cache) in this SQLite database
    #[arg(long)]
    db: Option<PathBuf>,

    /// Pretty-print emitted messages
    #[arg(long)]
    pretty: bool,
}

/// Prints every emitted message to stdout as one JSON object.
struct StdoutEventBus {
    pretty: bool,
    out: Mutex<std::io::Stdout>,
}

impl EventBus for StdoutEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        let message = serde_json::json!({ "topic": topic, "payload": payload });
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&message)
        } else {
            serde_json::to_string(&message)
        };

        match (rendered, self.out.lock()) {
            (Ok(line), Ok(mut out)) => {
                if let Err(e) = writeln!(out, "{line}") {
                    tracing::warn!(error = %e, "failed to write message");
                }
            }
            (Err(e), _) => tracing::warn!(topic, error = %e, "failed to render message"),
            (_, Err(_)) => tracing::warn!(topic, "stdout lock poisoned"),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tintbar=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        tracing::error!("{e:?}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(args: Args) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading {}", args.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", args.scenario.display()))?;

    let prefs: PreferenceStoreRef = match &args.db {
        Some(path) => Arc::new(
            SqlitePreferenceStore::open(path)
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Arc::new(InMemoryPreferenceStore::new()),
    };
    for entry in &scenario.preferences {
        prefs
            .put(entry.key, entry.app.as_ref(), entry.value)
            .with_context(|| format!("storing preference {}", entry.key.name()))?;
    }

    let platform = Arc::new(StaticPlatform::new(scenario.platform.clone()));
    let listener = scenario.listener.clone().map(|l| Arc::new(ScenarioListener::new(l)));

    let mut wiring = ServicePlatform::from_static(platform.clone());
    if let Some(listener) = &listener {
        wiring = wiring.with_notifications(listener.clone());
    }

    let bus = Arc::new(StdoutEventBus {
        pretty: args.pretty,
        out: Mutex::new(std::io::stdout()),
    });
    let service = StatusService::new(scenario.host.clone(), prefs, bus, wiring);

    tracing::info!(
        steps = scenario.steps.len(),
        packages = scenario.platform.packages.len(),
        listener = listener.is_some(),
        "replaying scenario"
    );

    for (index, step) in scenario.steps.into_iter().enumerate() {
        tracing::debug!(index, ?step, "step");
        match step {
            Step::Event { event } => service.handle_event(event).await,
            Step::Command { command } => service.handle_command(command),
            Step::ListenerConnected => service.on_listener_connected(),
            Step::ListenerDisconnected => service.on_listener_disconnected(),
            Step::ListenerPosted { record } => {
                if let Some(listener) = &listener {
                    listener.posted(&record);
                }
                service.on_listener_posted(record);
            }
            Step::ListenerRemoved { key } => {
                if let Some(listener) = &listener {
                    listener.removed(&key);
                }
                service.on_listener_removed(&key);
            }
            Step::AppUpdated {
                package_name,
                theme,
            } => platform.update(
                &package_name,
                theme.map(|t| (t.theme, t.attribute, t.color)),
            ),
            Step::Wait { ms } => tokio::time::sleep(std::time::Duration::from_millis(ms)).await,
        }
    }

    if service.is_volume_pending() {
        let window = service.host().volume_debounce();
        tracing::debug!(?window, "waiting for volume debounce");
        tokio::time::sleep(window + std::time::Duration::from_millis(50)).await;
    }

    tracing::info!(
        notifications = service.notifications().len(),
        last = ?service.last_resolved().map(|s| s.source),
        "scenario complete"
    );
    Ok(())
}
