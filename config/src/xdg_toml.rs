//! `[env]` table of `<config dir>/<app>/config.toml`.
//!
//! The config dir is `$XDG_CONFIG_HOME` when set, otherwise the platform default
//! from `dirs::config_dir()`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::LoadError;

pub(crate) fn config_home() -> Result<PathBuf, LoadError> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir().ok_or_else(|| LoadError::XdgPath("no config directory for this platform".into()))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, toml::Value>,
}

/// Scalars are stringified so `AERODESK_MAX_REPROMPTS = 5` works like `"5"`.
fn value_to_string(key: &str, value: toml::Value) -> Result<String, LoadError> {
    match value {
        toml::Value::String(s) => Ok(s),
        toml::Value::Integer(n) => Ok(n.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(LoadError::XdgValue {
            key: key.to_string(),
            kind: other.type_str().to_string(),
        }),
    }
}

/// Entries of `[env]` under `base/<app_name>/config.toml`. Missing file or section gives none.
pub(crate) fn load_env_map_from(base: &Path, app_name: &str) -> Result<HashMap<String, String>, LoadError> {
    let path = base.join(app_name).join("config.toml");
    if !path.is_file() {
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    let config: ConfigFile = toml::from_str(&content)?;
    config
        .env
        .into_iter()
        .map(|(k, v)| value_to_string(&k, v).map(|v| (k, v)))
        .collect()
}
