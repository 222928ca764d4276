//! Reading `FormattingSettings` from TOML.
//!
//! Settings live under a `[formatting]` table; missing keys keep their
//! defaults and unknown enum values are rejected.

use crate::config::schema::{FormattingSettings, SettingsFile};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read formatting settings from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid formatting settings: {source}")]
    Toml { source: toml_edit::de::Error },

    #[error("invalid formatting settings in {}: {source}", path.display())]
    TomlAt {
        path: PathBuf,
        source: toml_edit::de::Error,
    },
}

pub fn load_from_str(input: &str) -> Result<FormattingSettings, ConfigError> {
    let file: SettingsFile =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml { source })?;
    Ok(file.formatting)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<FormattingSettings, ConfigError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&input).map_err(|err| match err {
        ConfigError::Toml { source } => ConfigError::TomlAt {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{IndentationText, NewLineKind};
    use crate::range::QuoteKind;

    #[test]
    fn empty_input_uses_defaults() {
        let settings = load_from_str("").unwrap();
        assert_eq!(settings, FormattingSettings::default());
    }

    #[test]
    fn partial_table_overrides_fields() {
        let settings = load_from_str(
            r#"
[formatting]
quote_kind = "single"
indentation = "two-spaces"
new_line_kind = "crlf"
"#,
        )
        .unwrap();

        assert_eq!(settings.quote_kind, QuoteKind::Single);
        assert_eq!(settings.indentation, IndentationText::TwoSpaces);
        assert_eq!(settings.new_line_kind, NewLineKind::CarriageReturnLineFeed);
        assert!(settings.insert_space_after_opening_and_before_closing_nonempty_braces);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = load_from_str("[formatting]\nquote_kind = \"backtick\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
    }

    #[test]
    fn path_is_attached_to_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("format.toml");
        fs::write(&path, "[formatting]\nindentation = 3\n").unwrap();

        let err = load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TomlAt { .. }));
        assert!(err.to_string().contains("format.toml"));

        let missing = load_from_path(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
