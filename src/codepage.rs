use encoding_rs::Encoding;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Target character set for `--filter-strings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodePage {
    #[default]
    Latin1,
    Ascii,
    Utf8,
    /// Any other encoding known by its WHATWG label, e.g. `cp1252` or `shift_jis`.
    Legacy(&'static Encoding),
}

impl CodePage {
    /// Drop every character the code page cannot represent.
    pub fn filter(self, text: &str) -> String {
        match self {
            CodePage::Latin1 => text.chars().filter(|c| (*c as u32) <= 0xFF).collect(),
            CodePage::Ascii => text.chars().filter(char::is_ascii).collect(),
            CodePage::Utf8 => text.to_string(),
            CodePage::Legacy(encoding) => text.chars().filter(|c| encodable(encoding, *c)).collect(),
        }
    }
}

fn encodable(encoding: &'static Encoding, c: char) -> bool {
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = encoding.encode(c.encode_utf8(&mut buf));
    !had_errors
}

impl FromStr for CodePage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('_', "-");
        // WHATWG maps latin1 and ascii labels to windows-1252, so they are
        // resolved here first.
        match key.as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "8859" | "cp819" | "l1" => Ok(CodePage::Latin1),
            "ascii" | "us-ascii" | "646" => Ok(CodePage::Ascii),
            "utf-8" | "utf8" | "u8" => Ok(CodePage::Utf8),
            _ => Encoding::for_label(key.as_bytes())
                .or_else(|| Encoding::for_label(s.trim().as_bytes()))
                .map(CodePage::Legacy)
                .ok_or_else(|| ConfigError::UnknownCodePage(s.to_string())),
        }
    }
}

impl fmt::Display for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodePage::Latin1 => f.write_str("latin1"),
            CodePage::Ascii => f.write_str("ascii"),
            CodePage::Utf8 => f.write_str("utf-8"),
            CodePage::Legacy(encoding) => f.write_str(&encoding.name().to_lowercase()),
        }
    }
}
