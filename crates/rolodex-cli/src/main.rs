//! `rolodex`: run the contact schema changesets against a SQLite database.
//!
//! # Usage
//!
//! ```
//! rolodex status
//! rolodex up --dry-run
//! rolodex --database ~/contacts.db down --target 20140602110000
//! rolodex schema --json
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use rolodex_core::{
  changeset::{Direction, Version},
  migrations,
  schema::Schema,
};
use rolodex_store_sqlite::{Migrator, PlannedStep, SqliteStore, ddl};
use settings::RunnerConfig;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Rolodex contact schema runner")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rolodex.toml")]
  config: PathBuf,

  /// Database file; overrides `database_path` from the config.
  #[arg(long, value_name = "PATH")]
  database: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List changesets and their state.
  Status,
  /// Apply pending changesets.
  Up(Step),
  /// Roll back applied changesets.
  Down(Step),
  /// Compare the live schema with the replayed model.
  Verify,
  /// Print the latest schema model.
  Schema {
    /// Emit the model as JSON instead of SQL.
    #[arg(long)]
    json: bool,
  },
}

#[derive(Args)]
struct Step {
  /// Stop at this version. For `down`, the version left applied.
  #[arg(long, value_name = "V")]
  target: Option<Version>,

  /// Print the statements without running them.
  #[arg(long)]
  dry_run: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // The latest model needs no database.
  if let Command::Schema { json } = cli.command {
    return print_schema(json);
  }

  let cfg = RunnerConfig::load(&cli.config, cli.database.as_deref())?;
  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open database at {:?}", cfg.database_path))?;
  let migrator = store.migrator().context("invalid changeset sequence")?;

  match cli.command {
    Command::Status => status(&migrator).await,
    Command::Up(step) => run(&migrator, Direction::Up, step).await,
    Command::Down(step) => run(&migrator, Direction::Down, step).await,
    Command::Verify => verify(&migrator).await,
    Command::Schema { .. } => Ok(()),
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn status(migrator: &Migrator) -> anyhow::Result<()> {
  for entry in migrator.status().await? {
    let state = match entry.applied_at {
      Some(at) => format!("applied {}", at.format("%Y-%m-%d %H:%M:%S")),
      None => "pending".to_owned(),
    };
    let flag = match entry.checksum_matches {
      Some(false) => "  (modified since applied)",
      _ => "",
    };
    let kind = if entry.reversible { "change" } else { "up/down" };
    println!("{}  {:<40} {:<8} {state}{flag}", entry.version, entry.name, kind);
  }
  Ok(())
}

async fn run(migrator: &Migrator, direction: Direction, step: Step) -> anyhow::Result<()> {
  if step.dry_run {
    let steps = migrator.preview(direction, step.target).await?;
    if steps.is_empty() {
      println!("nothing to do");
    }
    steps.iter().for_each(print_step);
    return Ok(());
  }

  let done = match direction {
    Direction::Up => migrator.up(step.target).await?,
    Direction::Down => migrator.down(step.target).await?,
  };
  if done.is_empty() {
    println!("nothing to do");
  } else {
    println!("{direction}: {} changeset(s)", done.len());
  }
  Ok(())
}

fn print_step(step: &PlannedStep) {
  println!("-- {} {} ({})", step.version, step.name, step.direction);
  for statement in &step.statements {
    println!("{statement};");
  }
  println!();
}

async fn verify(migrator: &Migrator) -> anyhow::Result<()> {
  let drift = migrator.verify().await?;
  if drift.is_empty() {
    println!("schema matches");
    return Ok(());
  }
  for d in &drift {
    println!("{d}");
  }
  anyhow::bail!("{} difference(s) found", drift.len())
}

fn print_schema(json: bool) -> anyhow::Result<()> {
  let schema =
    Schema::replay(migrations::CHANGESETS).context("failed to replay changesets")?;
  if json {
    println!("{}", serde_json::to_string_pretty(&schema)?);
  } else {
    for statement in ddl::render_schema(&schema) {
      println!("{statement};");
    }
  }
  Ok(())
}
