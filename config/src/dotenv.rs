//! `.env` parsing. Applying values to the environment happens in the crate root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].replace("\\\"", "\"");
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

/// `KEY=VALUE` per line. Blank lines and `#` comment lines are skipped, a leading
/// `export ` is ignored, and one pair of surrounding quotes is removed (`\"` is
/// unescaped inside double quotes).
pub(crate) fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), unquote(value.trim())))
        })
        .collect()
}

/// Reads `.env` from `override_dir` or the current directory. No file means no entries.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(override_dir) {
        Some(path) => Ok(parse_dotenv(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_noise() {
        let m = parse_dotenv(
            "\n# model\nAERODESK_CHAT_MODEL=gemini-2.0-flash-001\nNOT_A_PAIR\n=orphan\n  \n",
        );
        assert_eq!(m.len(), 1);
        assert_eq!(m["AERODESK_CHAT_MODEL"], "gemini-2.0-flash-001");
    }

    #[test]
    fn quotes_and_export() {
        let m = parse_dotenv(
            "export A=\"hello world\"\nB='single'\nC=\"say \\\"hi\\\"\"\nD=\nE=\"\"\nF=a#b",
        );
        assert_eq!(m["A"], "hello world");
        assert_eq!(m["B"], "single");
        assert_eq!(m["C"], "say \"hi\"");
        assert_eq!(m["D"], "");
        assert_eq!(m["E"], "");
        assert_eq!(m["F"], "a#b");
    }

    #[test]
    fn load_env_map_reads_file_or_returns_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());

        std::fs::write(dir.path().join(".env"), "AERODESK_PASSENGER_ID=3442 587242\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m["AERODESK_PASSENGER_ID"], "3442 587242");
    }
}
