//! # reachly
//!
//! Command-line front end: ingest profiles, infer personas and generate outreach.
//! Generated text goes to stdout; logs go to stderr.

#![deny(unsafe_code)]

mod compose;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use reachly_core::{
    Channel, FollowUpStage, GenerationClient, Persona, ProfileSource, Prospect, ProspectId,
    StoredMessage,
};
use reachly_engine::{EngineConfig, RawTextSource, Reachly, WebProfileSource};
use reachly_llm::{OllamaClient, OllamaConfig};
use reachly_settings::ReachlySettings;
use reachly_store::{ContextStore, SqliteStore};
use reachly_telemetry::{init_telemetry, TelemetryConfig};

const PREVIEW_CHARS: usize = 120;

/// Personalized cold outreach from public profiles.
#[derive(Parser, Debug)]
#[command(name = "reachly", version, about)]
struct Cli {
    /// Settings file (defaults to `~/.reachly/settings.json`).
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the generation endpoint is reachable and the model is installed.
    Health,
    /// Fetch a profile URL (LinkedIn or any web page), infer a persona and save it.
    Add { url: String },
    /// Read pasted profile text from a file or stdin, infer a persona and save it.
    AddText {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List stored prospects, newest first.
    List,
    /// Show a prospect and the latest message per label.
    Show { id: String },
    /// Generate and store one message per channel.
    Generate { id: String },
    /// Generate and store follow-ups for every channel already contacted.
    Followup {
        id: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
        stage: u8,
    },
    /// Every stored message for a prospect, oldest first.
    History { id: String },
    /// Print a Gmail compose link for the latest email to a prospect.
    Compose {
        id: String,
        #[arg(long, default_value = "")]
        to: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => reachly_settings::load_settings_from_path(path),
        None => reachly_settings::load_settings(),
    }
    .context("failed to load settings")?;

    let _ = init_telemetry(TelemetryConfig::from_level_name(
        &settings.logging.level,
        settings.logging.json,
    ));

    let db_path = settings.storage.database_path();
    let store = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("failed to open database {}", db_path.display()))?,
    );
    tracing::debug!(path = %db_path.display(), "database ready");

    match cli.command {
        Command::Health => health(&settings).await,
        Command::Add { url } => {
            let source = WebProfileSource::for_url(&settings.scraping, &url)?;
            add(&settings, store, &source, &url).await
        }
        Command::AddText { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?,
            };
            add(&settings, store, &RawTextSource, &text).await
        }
        Command::List => list(store.as_ref()),
        Command::Show { id } => show(store.as_ref(), &ProspectId::from_raw(id)),
        Command::Generate { id } => {
            let app = engine(&settings, store).await?;
            let saved = app.generate_outreach(&ProspectId::from_raw(id)).await?;
            print_messages(saved.values());
            Ok(())
        }
        Command::Followup { id, stage } => {
            let stage = FollowUpStage::try_from(stage).map_err(anyhow::Error::msg)?;
            let app = engine(&settings, store).await?;
            let saved = app.generate_followups(&ProspectId::from_raw(id), stage).await?;
            if saved.is_empty() {
                println!("No previous messages to follow up on.");
            }
            print_messages(saved.values());
            Ok(())
        }
        Command::History { id } => history(store.as_ref(), &ProspectId::from_raw(id)),
        Command::Compose { id, to } => compose_latest(store.as_ref(), &ProspectId::from_raw(id), &to),
    }
}

fn ollama(settings: &ReachlySettings) -> Result<Arc<OllamaClient>> {
    let client = OllamaClient::new(OllamaConfig::from(&settings.ollama))
        .context("failed to build generation client")?;
    Ok(Arc::new(client))
}

async fn engine(settings: &ReachlySettings, store: Arc<SqliteStore>) -> Result<Reachly> {
    let app = Reachly::new(ollama(settings)?, store, EngineConfig::from_settings(settings))
        .await
        .context("Ollama is not running or the model is missing")?;
    Ok(app)
}

async fn health(settings: &ReachlySettings) -> Result<()> {
    let client = ollama(settings)?;
    client
        .health()
        .await
        .with_context(|| format!("generation endpoint {} not ready", settings.ollama.base_url))?;
    println!("ok: {} serving {}", settings.ollama.base_url, client.model());
    Ok(())
}

async fn add(
    settings: &ReachlySettings,
    store: Arc<SqliteStore>,
    source: &dyn ProfileSource,
    locator: &str,
) -> Result<()> {
    let app = engine(settings, store).await?;
    let ingested = app.ingest(source, locator).await?;
    if let Some(path) = &ingested.archived {
        tracing::info!(path = %path.display(), "raw profile archived");
    }
    let persona = app.analyze_persona(&ingested.text).await?;
    let id = app.save_persona(&persona, &ingested.text, ingested.source)?;
    print_persona(&id, &persona);
    Ok(())
}

fn list(store: &dyn ContextStore) -> Result<()> {
    let prospects = store.list_prospects()?;
    if prospects.is_empty() {
        println!("No prospects yet.");
    }
    for p in prospects {
        println!("{}  {}  {}", p.id, p.created_at, p.short_label());
    }
    Ok(())
}

fn show(store: &dyn ContextStore, id: &ProspectId) -> Result<()> {
    let prospect = require_prospect(store, id)?;
    println!("{}", prospect.short_label());
    println!("id: {}  source: {}  added: {}", prospect.id, prospect.source, prospect.created_at);
    println!("\nSUMMARY:\n{}\n\nSTYLE:\n{}", prospect.summary, prospect.style);

    let latest = store.get_messages_for_prospect(id)?;
    for (label, content) in latest {
        println!("\n=== {label} ===\n{content}");
    }
    Ok(())
}

fn history(store: &dyn ContextStore, id: &ProspectId) -> Result<()> {
    require_prospect(store, id)?;
    for message in store.message_history(id)? {
        println!(
            "{}  {:<26} {}",
            message.created_at,
            message.label.to_string(),
            message.preview(PREVIEW_CHARS).replace('\n', " ")
        );
    }
    Ok(())
}

fn compose_latest(store: &dyn ContextStore, id: &ProspectId, to: &str) -> Result<()> {
    require_prospect(store, id)?;
    let latest = store.latest_per_channel(id)?;
    let Some(email) = latest.get(&Channel::Email) else {
        bail!("no email has been generated for {id} yet");
    };
    let url = if email.label.is_follow_up() {
        compose::gmail_compose_url(to, compose::FOLLOW_UP_SUBJECT, &email.content)
    } else {
        compose::compose_email(to, &email.content)
    };
    println!("{url}");
    Ok(())
}

fn require_prospect(store: &dyn ContextStore, id: &ProspectId) -> Result<Prospect> {
    store
        .get_prospect(id)?
        .with_context(|| format!("prospect not found: {id}"))
}

fn print_persona(id: &ProspectId, persona: &Persona) {
    println!("Saved prospect {id}");
    println!("\nSUMMARY:\n{}\n\nSTYLE:\n{}", persona.summary(), persona.style());
}

fn print_messages<'a>(messages: impl Iterator<Item = &'a StoredMessage>) {
    for message in messages {
        println!("\n=== {} ===\n{}", message.label, message.content);
    }
}
