use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    configs: HashMap<String, String>,
    commands: HashMap<String, CommandEntry>,
}

#[derive(Debug, Deserialize)]
struct CommandEntry {
    event: String,
    #[serde(default)]
    detail: Option<String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Attribute payloads as they appear in `data-motion`.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.configs.keys().cloned().collect()
    }

    /// Compact single-line JSON, ready to be used as an attribute value.
    pub fn attribute(name: &str) -> Result<String> {
        let value: serde_json::Value = load(name)?;
        Ok(value.to_string())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.configs, "config", name)?;
        super::load_json(rel)
    }
}

/// Host command events: event name plus optional detail payload.
pub mod commands {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.commands.keys().cloned().collect()
    }

    pub fn event(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.commands, "command", name)?;
        Ok(entry.event.clone())
    }

    pub fn detail(name: &str) -> Result<Option<serde_json::Value>> {
        let entry = lookup(&MANIFEST.commands, "command", name)?;
        match &entry.detail {
            Some(rel) => super::load_json(rel).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_config_fixture_parses_as_json() {
        for key in configs::keys() {
            let value: serde_json::Value = configs::load(&key).unwrap();
            assert!(value.is_object(), "{key} should be an object");
        }
    }

    #[test]
    fn every_command_detail_loads() {
        for key in commands::keys() {
            assert!(commands::event(&key).unwrap().starts_with("live_motion:"));
            commands::detail(&key).unwrap();
        }
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        assert!(configs::attribute("does-not-exist").is_err());
    }
}
