//! Runner configuration.
//!
//! Layered from lowest to highest precedence: built-in defaults, an optional
//! TOML file, `ROLODEX_`-prefixed environment variables, command-line flags.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

const DEFAULT_DATABASE: &str = "rolodex.db";

#[derive(Deserialize, Debug, Clone)]
pub struct RunnerConfig {
  pub database_path: PathBuf,
}

impl RunnerConfig {
  /// Read `file` (if it exists) and the environment. `database` overrides
  /// both when given.
  pub fn load(file: &Path, database: Option<&Path>) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("database_path", DEFAULT_DATABASE)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("ROLODEX"))
      .set_override_option(
        "database_path",
        database.map(|p| p.to_string_lossy().into_owned()),
      )?
      .build()
      .with_context(|| format!("failed to read config file {}", file.display()))?;

    let mut cfg: RunnerConfig = settings
      .try_deserialize()
      .context("failed to deserialise RunnerConfig")?;
    cfg.database_path = expand_tilde(&cfg.database_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
