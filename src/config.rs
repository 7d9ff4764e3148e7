// SPDX-License-Identifier: MIT
//! Theme persistence in the user config directory.
//!
//! The file holds exactly one user choice, read at startup and rewritten
//! when the picker applies a theme. A missing or corrupt file silently
//! falls back to the default theme.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct ConfigFile {
    theme: String,
}

fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("ktop").join("config.json"))
}

/// Saved theme name, if a readable config exists.
#[must_use]
pub fn load_theme_name() -> Option<String> {
    load_from(&config_path()?)
}

fn load_from(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let parsed: ConfigFile = serde_json::from_str(&raw).ok()?;
    Some(parsed.theme)
}

/// Persists the chosen theme name.
///
/// # Errors
///
/// Returns an error if the config directory cannot be created or the file
/// cannot be written.
pub fn save_theme_name(name: &str) -> Result<()> {
    let Some(path) = config_path() else {
        // No resolvable config directory (stripped-down containers); the
        // choice simply lives for this session.
        return Ok(());
    };
    save_to(&path, name)
}

fn save_to(path: &Path, name: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(&ConfigFile {
        theme: name.to_owned(),
    })
    .context("failed to encode config")?;
    fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}
