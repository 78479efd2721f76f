//! Layered configuration resolution.
//!
//! Values come from two layers: a dotenv-style file and the process
//! environment. The environment wins. Blank values in either layer count as
//! unset, so an empty environment variable never shadows a value from the
//! file. Resolution is a pure function of the two layers so it can be
//! exercised without mutating the real environment.

use crate::error::AppError;
use config::{Config as Cfg, Environment};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

/// Flat key/value pairs from one configuration layer.
pub type Entries = HashMap<String, String>;

/// Parsed contents of a dotenv-style file.
///
/// Malformed lines are collected in `skipped` rather than logged, since the
/// file is usually read before the tracing subscriber is installed.
#[derive(Debug, Default)]
pub struct EnvFile {
    pub entries: Entries,
    pub skipped: Vec<String>,
}

/// Read a dotenv-style file without touching the process environment.
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_env_file(path: &Path) -> Result<Option<EnvFile>, AppError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(parse_env_file(&contents))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::ConfigError(
            anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
        )),
    }
}

/// Parse dotenv-style contents. Malformed lines are skipped and reported.
pub fn parse_env_file(contents: &str) -> EnvFile {
    let mut parsed = EnvFile::default();
    for item in dotenvy::from_read_iter(contents.as_bytes()) {
        match item {
            Ok((key, value)) => {
                parsed.entries.insert(key, value);
            }
            Err(e) => parsed.skipped.push(e.to_string()),
        }
    }
    parsed
}

/// Snapshot of the process environment restricted to `keys`.
pub fn process_env(keys: &[&str]) -> Entries {
    keys.iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect()
}

/// Resolve a settings record from the file layer and the environment layer.
///
/// Keys are matched case-insensitively against the (lowercase) field names of `T`.
/// Values stay strings until `T` asks for another type, so numeric-looking
/// secrets are never reinterpreted. Avoid `#[serde(flatten)]` in `T` for the
/// same reason.
pub fn resolve<T: DeserializeOwned>(file: Entries, env: Entries) -> Result<T, AppError> {
    let config = Cfg::builder()
        .add_source(Environment::default().source(Some(non_blank(file))))
        .add_source(Environment::default().source(Some(non_blank(env))))
        .build()?;

    Ok(config.try_deserialize()?)
}

fn non_blank(entries: Entries) -> config::Map<String, String> {
    entries
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect()
}
