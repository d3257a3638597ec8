//! Loads configuration from the XDG `config.toml` and a project `.env`, then applies
//! it to the process environment with priority **existing env > .env > XDG**.
//!
//! The CLI calls [`load_and_apply`] once at startup, before anything reads the
//! environment.

mod dotenv;
mod xdg_toml;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("xdg [env] value for {key} must be a scalar, found {kind}")]
    XdgValue { key: String, kind: String },
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Where an applied value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    DotEnv,
    Xdg,
}

/// Path of the XDG config file for `app_name` (may not exist).
pub fn config_file_path(app_name: &str) -> Result<PathBuf, LoadError> {
    Ok(xdg_toml::config_home()?.join(app_name).join("config.toml"))
}

/// Merges the two sources: `.env` beats XDG. Keys already in the environment are dropped.
fn merge(
    dotenv_map: HashMap<String, String>,
    xdg_map: HashMap<String, String>,
) -> Vec<(String, String, ConfigSource)> {
    let mut merged: HashMap<String, (String, ConfigSource)> = xdg_map
        .into_iter()
        .map(|(k, v)| (k, (v, ConfigSource::Xdg)))
        .collect();
    merged.extend(
        dotenv_map
            .into_iter()
            .map(|(k, v)| (k, (v, ConfigSource::DotEnv))),
    );
    let mut out: Vec<_> = merged
        .into_iter()
        .filter(|(k, _)| std::env::var_os(k).is_none())
        .map(|(k, (v, source))| (k, v, source))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

fn apply(entries: &[(String, String, ConfigSource)]) -> Vec<(String, ConfigSource)> {
    entries
        .iter()
        .map(|(key, value, source)| {
            std::env::set_var(key, value);
            (key.clone(), *source)
        })
        .collect()
}

/// Sets every key from `.env` and `$XDG_CONFIG_HOME/<app_name>/config.toml` `[env]`
/// that is not already set in the environment.
///
/// * `override_dir`: directory holding `.env`; the current directory when `None`.
///
/// Returns the keys that were set and their source, sorted by key.
pub fn load_and_apply(
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<Vec<(String, ConfigSource)>, LoadError> {
    load_and_apply_from(&xdg_toml::config_home()?, app_name, override_dir)
}

/// Same as [`load_and_apply`] with an explicit config home instead of `$XDG_CONFIG_HOME`.
pub fn load_and_apply_from(
    config_home: &Path,
    app_name: &str,
    override_dir: Option<&Path>,
) -> Result<Vec<(String, ConfigSource)>, LoadError> {
    let xdg_map = xdg_toml::load_env_map_from(config_home, app_name)?;
    let dotenv_map = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;
    Ok(apply(&merge(dotenv_map, xdg_map)))
}
