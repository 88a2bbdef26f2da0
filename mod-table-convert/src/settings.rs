use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use xml_presence_core::ComparisonOptions;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    comparison: ComparisonOptions,
}

/// Errors returned when loading settings files.
#[derive(Debug, Error)]
pub enum SettingsLoadError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load comparison options from a TOML file. Missing keys keep their defaults.
pub fn load_comparison_options(path: &Path) -> Result<ComparisonOptions, SettingsLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_settings(&raw, path.display().to_string())
}

/// Options from the bundled `config/comparison.toml`, or compiled defaults if it does not parse.
pub fn default_comparison_options() -> ComparisonOptions {
    let embedded = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/config/comparison.toml"
    ));
    match parse_settings(embedded, "embedded settings".to_string()) {
        Ok(options) => options,
        Err(err) => {
            tracing::warn!(error = %err, "falling back to compiled comparison defaults");
            ComparisonOptions::default()
        }
    }
}

fn parse_settings(raw: &str, path: String) -> Result<ComparisonOptions, SettingsLoadError> {
    let parsed: SettingsFile =
        toml::from_str(raw).map_err(|source| SettingsLoadError::Parse { path, source })?;
    Ok(parsed.comparison)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use xml_presence_core::{ComparisonMode, ComparisonOptions};

    use super::{default_comparison_options, load_comparison_options, SettingsLoadError};

    #[test]
    fn bundled_settings_match_compiled_defaults() {
        assert_eq!(default_comparison_options(), ComparisonOptions::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("options.toml");
        fs::write(
            &path,
            "[comparison]\nmode = \"strict\"\ntrue_literals = [\"true\"]\n",
        )
        .expect("write");

        let options = load_comparison_options(&path).expect("load");
        assert_eq!(options.mode, ComparisonMode::Strict);
        assert_eq!(options.true_literals, vec!["true".to_string()]);
        assert_eq!(options.false_literals, ComparisonOptions::default().false_literals);
        assert!(options.ignore_comments);
    }

    #[test]
    fn invalid_mode_is_a_parse_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("options.toml");
        fs::write(&path, "[comparison]\nmode = \"fuzzy\"\n").expect("write");

        let err = load_comparison_options(&path).expect_err("must fail");
        assert!(matches!(err, SettingsLoadError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = load_comparison_options(&dir.path().join("absent.toml")).expect_err("must fail");
        assert!(matches!(err, SettingsLoadError::Io { .. }));
    }
}
