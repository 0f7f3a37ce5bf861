//! User preference store.
//!
//! Preferences live in a small TOML file in the user's home directory. A
//! missing file means defaults; anything unreadable or unparseable is an
//! error the caller decides how to surface. The audit core only consumes the
//! accessor pairs, never the storage format.

#![forbid(unsafe_code)]

mod model;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};

pub use model::Preferences;

const PREFERENCES_FILE: &str = ".provaudit.toml";

/// Minimum credible credential length; anything shorter is a paste error.
const MIN_API_KEY_LEN: usize = 10;

/// Default on-disk location: `~/.provaudit.toml`, falling back to the
/// current directory when no home is known.
pub fn default_path() -> Utf8PathBuf {
    dirs::home_dir()
        .and_then(|home| Utf8PathBuf::from_path_buf(home).ok())
        .map(|home| home.join(PREFERENCES_FILE))
        .unwrap_or_else(|| Utf8PathBuf::from(PREFERENCES_FILE))
}

/// Load preferences from `path`; a missing file yields defaults.
pub fn load(path: &Utf8Path) -> anyhow::Result<Preferences> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Preferences::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read preferences: {path}"));
        }
    };
    toml::from_str(&text).with_context(|| format!("parse preferences: {path}"))
}

/// Write preferences back to `path`.
pub fn save(path: &Utf8Path, prefs: &Preferences) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create preferences directory: {parent}"))?;
        }
    }
    let text = toml::to_string_pretty(prefs).context("serialize preferences")?;
    std::fs::write(path, text).with_context(|| format!("write preferences: {path}"))
}

/// Basic shape check before storing a credential.
pub fn validate_api_key(key: &str) -> anyhow::Result<()> {
    if key.len() < MIN_API_KEY_LEN {
        anyhow::bail!("API key appears to be too short (minimum {MIN_API_KEY_LEN} characters)");
    }
    Ok(())
}
