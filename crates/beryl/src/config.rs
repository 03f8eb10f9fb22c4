//! Mirror settings layering: config file, then environment, then flags.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

use beryl_fetch::MirrorConfig;

use crate::cli::App;

const ENV_MIRROR_ALL: &str = "BERYL_MIRROR_ALL";
const ENV_MIRROR_ALL_FALLBACK: &str = "BERYL_MIRROR_ALL_FALLBACK_TIMEOUT";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    mirrors: BTreeMap<String, MirrorTable>,
}

/// One `[mirrors."<uri>"]` table; the key `all` selects the global entry.
#[derive(Debug, Deserialize)]
struct MirrorTable {
    uri: Option<String>,
    fallback_timeout: Option<toml::Value>,
}

/// Resolve the effective mirror configuration for this invocation.
///
/// Later layers override earlier ones field-by-field, matching the
/// semantics of `MirrorConfig::from_pairs`.
pub fn load(app: &App) -> anyhow::Result<MirrorConfig> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    if let Some(file) = read_config_file(app.config.clone())? {
        pairs.extend(file_pairs(file)?);
    }

    if let Ok(uri) = std::env::var(ENV_MIRROR_ALL) {
        pairs.push(("mirror.all".to_string(), uri));
    }
    if let Ok(timeout) = std::env::var(ENV_MIRROR_ALL_FALLBACK) {
        pairs.push(("mirror.all.fallback_timeout".to_string(), timeout));
    }

    if let Some(uri) = &app.mirror {
        pairs.push(("mirror.all".to_string(), uri.to_string()));
    }
    if let Some(timeout) = &app.fallback_timeout {
        pairs.push(("mirror.all.fallback_timeout".to_string(), timeout.clone()));
    }

    MirrorConfig::from_pairs(pairs).context("invalid mirror configuration")
}

fn file_pairs(file: ConfigFile) -> anyhow::Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for (selector, table) in file.mirrors {
        if let Some(uri) = table.uri {
            pairs.push((format!("mirror.{selector}"), uri));
        }
        if let Some(value) = table.fallback_timeout {
            pairs.push((
                format!("mirror.{selector}.fallback_timeout"),
                render_timeout(&selector, &value)?,
            ));
        }
    }
    Ok(pairs)
}

fn render_timeout(selector: &str, value: &toml::Value) -> anyhow::Result<String> {
    match value {
        toml::Value::Boolean(flag) => Ok(flag.to_string()),
        toml::Value::Integer(seconds) => Ok(seconds.to_string()),
        toml::Value::Float(seconds) => Ok(seconds.to_string()),
        other => anyhow::bail!(
            "mirrors.{selector}.fallback_timeout must be a boolean or seconds, got {other}"
        ),
    }
}

fn read_config_file(explicit: Option<PathBuf>) -> anyhow::Result<Option<ConfigFile>> {
    let path = match explicit {
        Some(path) => path,
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let file = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(Some(file))
}

fn default_config_path() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(".config").join("beryl").join("config.toml"))
}
