use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use record_detail::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "record-detail",
    version,
    about = "Inspect and edit tax lot / property detail records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the display fields of a record
    Show(SourceArgs),
    /// Apply field edits and save them through an in-memory store
    Edit(EditArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Record kind: taxlot or property
    #[arg(long, default_value = "taxlot", value_parser = parse_kind)]
    pub kind: RecordKind,

    /// JSON file holding the record payload
    #[arg(long)]
    pub record: PathBuf,

    /// JSON file holding the column schema
    #[arg(long)]
    pub columns: PathBuf,

    /// JSON file holding the organization's labels
    #[arg(long)]
    pub labels: Option<PathBuf>,

    /// JSON file holding session configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show every column instead of the default subset
    #[arg(long)]
    pub all_columns: bool,
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Field assignment, `name=value`; values are read as JSON when they parse
    #[arg(long = "set", value_parser = parse_assignment)]
    pub set: Vec<(String, JsonValue)>,

    /// Same as --set, but writes into extra_data
    #[arg(long = "set-extra", value_parser = parse_assignment)]
    pub set_extra: Vec<(String, JsonValue)>,
}

#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub name: String,
    pub label: String,
    pub value: DisplayValue,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub heading: String,
    pub mode: String,
    pub fields: Vec<FieldReport>,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn parse_kind(value: &str) -> Result<RecordKind, String> {
    RecordKind::parse(value).ok_or_else(|| format!("unknown record kind '{value}'"))
}

fn parse_assignment(value: &str) -> Result<(String, JsonValue), String> {
    let (name, raw) = value
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{value}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{value}'"));
    }
    let parsed = serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()));
    Ok((name.to_string(), parsed))
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

async fn open_session(source: &SourceArgs) -> anyhow::Result<RecordDetailSession> {
    let record: Record = load_json(&source.record)?;
    let schema = ColumnSchema::load(&source.columns)
        .with_context(|| format!("loading columns from {}", source.columns.display()))?;
    let labels: Vec<Label> = match &source.labels {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    let config = match &source.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SessionConfig::default(),
    };

    let store = Arc::new(InMemoryRecordStore::new());
    store.insert(&source.kind, record.clone()).await;

    let loader = SessionLoader::new(
        store,
        Arc::new(StaticColumnSchema::new().with_schema(&source.kind, schema)),
    )
    .labels(Arc::new(StaticLabels::new().with_labels(&source.kind, labels)))
    .config(config);

    let mut session = loader.open(source.kind, record.id, record.cycle.id).await?;
    if source.all_columns {
        session.show_all_columns();
    }
    Ok(session)
}

fn report(session: &RecordDetailSession) -> Report {
    Report {
        heading: session.heading(),
        mode: session.mode().to_string(),
        fields: session
            .display_fields()
            .into_iter()
            .map(|field| FieldReport {
                label: field.column.label().to_string(),
                name: field.column.name,
                value: field.value,
            })
            .collect(),
        labels: session
            .applied_labels()
            .into_iter()
            .map(|label| label.name.clone())
            .collect(),
        saved: None,
        error: None,
    }
}

pub async fn execute(cli: Cli) -> anyhow::Result<Report> {
    match cli.command {
        Command::Show(source) => {
            let session = open_session(&source).await?;
            Ok(report(&session))
        }
        Command::Edit(args) => {
            let mut session = open_session(&args.source).await?;
            session.enter_edit()?;
            for (name, value) in args.set {
                session.set_field(&name, value)?;
            }
            for (name, value) in args.set_extra {
                session.set_extra_field(&name, value)?;
            }

            let outcome = session.save().await;
            let mut out = report(&session);
            out.saved = Some(outcome.is_saved());
            out.error = outcome.error().map(ToString::to_string);
            Ok(out)
        }
    }
}
