//! Character set resolution for key and value encoding.
//!
//! Only charsets the connector can actually encode with are resolvable.
//! Lookup accepts canonical names and the usual aliases, case-insensitively.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default charset used when `redis.charset` is not supplied
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Why a charset name could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharsetError {
    #[error("Illegal charset name: {0}")]
    IllegalName(String),
    #[error("Unsupported charset: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Charset {
    #[default]
    Utf8,
    UsAscii,
    Iso8859_1,
    Utf16,
    Utf16Be,
    Utf16Le,
}

impl Charset {
    pub const ALL: [Charset; 6] = [
        Self::Utf8,
        Self::UsAscii,
        Self::Iso8859_1,
        Self::Utf16,
        Self::Utf16Be,
        Self::Utf16Le,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::UsAscii => "US-ASCII",
            Self::Iso8859_1 => "ISO-8859-1",
            Self::Utf16 => "UTF-16",
            Self::Utf16Be => "UTF-16BE",
            Self::Utf16Le => "UTF-16LE",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Utf8 => &["UTF8", "unicode-1-1-utf-8"],
            Self::UsAscii => &["ASCII", "US_ASCII", "ISO646-US", "646", "cp367", "ascii7"],
            Self::Iso8859_1 => &["ISO8859_1", "ISO_8859_1", "latin1", "l1", "cp819", "ISO8859-1"],
            Self::Utf16 => &["UTF_16", "utf16", "unicode"],
            Self::Utf16Be => &["UTF_16BE", "X-UTF-16BE", "UnicodeBigUnmarked"],
            Self::Utf16Le => &["UTF_16LE", "X-UTF-16LE", "UnicodeLittleUnmarked"],
        }
    }

    /// Resolve a charset by canonical name or alias
    pub fn for_name(name: &str) -> Result<Self, CharsetError> {
        if !is_legal_name(name) {
            return Err(CharsetError::IllegalName(name.to_string()));
        }

        Self::ALL
            .into_iter()
            .find(|charset| {
                charset.name().eq_ignore_ascii_case(name)
                    || charset
                        .aliases()
                        .iter()
                        .any(|alias| alias.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| CharsetError::Unsupported(name.to_string()))
    }
}

/// Names start with a letter or digit and continue with letters, digits,
/// `-`, `+`, `:`, `_` or `.`
fn is_legal_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | ':' | '_' | '.'))
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Charset {
    type Err = CharsetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_name(s)
    }
}
