use crate::range::QuoteKind;
use serde::{Deserialize, Serialize};

/// On-disk settings file layout.
///
/// ```toml
/// [formatting]
/// quote_kind = "single"
/// indentation = "two-spaces"
/// new_line_kind = "crlf"
/// insert_space_after_opening_and_before_closing_nonempty_braces = false
/// ```
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct SettingsFile {
    #[serde(default)]
    pub formatting: FormattingSettings,
}

/// Formatting options consulted when planning text edits.
///
/// Read at plan time only; the engine never mutates them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FormattingSettings {
    /// Quote used for newly written string literals
    pub quote_kind: QuoteKind,
    /// One level of indentation
    pub indentation: IndentationText,
    /// Line break written between new lines
    pub new_line_kind: NewLineKind,
    /// `{ a }` instead of `{a}` when writing non-empty brace lists
    pub insert_space_after_opening_and_before_closing_nonempty_braces: bool,
    /// `a, b` instead of `a,b`
    pub insert_space_after_comma_delimiter: bool,
}

impl FormattingSettings {
    pub const DEFAULT: FormattingSettings = FormattingSettings {
        quote_kind: QuoteKind::Double,
        indentation: IndentationText::FourSpaces,
        new_line_kind: NewLineKind::LineFeed,
        insert_space_after_opening_and_before_closing_nonempty_braces: true,
        insert_space_after_comma_delimiter: true,
    };

    /// Separator placed between comma-delimited items.
    pub fn comma_separator(&self) -> &'static str {
        if self.insert_space_after_comma_delimiter {
            ", "
        } else {
            ","
        }
    }

    /// Wrap already-joined items in braces, padding per settings.
    pub fn braced(&self, inner: &str) -> String {
        if inner.is_empty() {
            "{}".to_string()
        } else if self.insert_space_after_opening_and_before_closing_nonempty_braces {
            format!("{{ {inner} }}")
        } else {
            format!("{{{inner}}}")
        }
    }

    pub fn new_line(&self) -> &'static str {
        self.new_line_kind.as_str()
    }
}

impl Default for FormattingSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IndentationText {
    TwoSpaces,
    #[default]
    FourSpaces,
    EightSpaces,
    Tab,
}

impl IndentationText {
    pub const fn as_str(self) -> &'static str {
        match self {
            IndentationText::TwoSpaces => "  ",
            IndentationText::FourSpaces => "    ",
            IndentationText::EightSpaces => "        ",
            IndentationText::Tab => "\t",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NewLineKind {
    #[default]
    #[serde(rename = "lf")]
    LineFeed,
    #[serde(rename = "crlf")]
    CarriageReturnLineFeed,
}

impl NewLineKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            NewLineKind::LineFeed => "\n",
            NewLineKind::CarriageReturnLineFeed => "\r\n",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braced_respects_padding() {
        let mut settings = FormattingSettings::default();
        assert_eq!(settings.braced("a, b"), "{ a, b }");
        assert_eq!(settings.braced(""), "{}");
        settings.insert_space_after_opening_and_before_closing_nonempty_braces = false;
        assert_eq!(settings.braced("a"), "{a}");
    }

    #[test]
    fn separators() {
        let mut settings = FormattingSettings::default();
        assert_eq!(settings.comma_separator(), ", ");
        settings.insert_space_after_comma_delimiter = false;
        assert_eq!(settings.comma_separator(), ",");
        assert_eq!(IndentationText::Tab.as_str(), "\t");
        assert_eq!(NewLineKind::CarriageReturnLineFeed.as_str(), "\r\n");
    }
}
