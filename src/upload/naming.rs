//! Object naming for stored uploads.
//!
//! Every object lands under [`UPLOAD_PREFIX`]. Names combine a millisecond
//! timestamp with either a random token or the sanitized original filename;
//! identical content is never deduplicated.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Fixed directory every upload is committed under.
pub const UPLOAD_PREFIX: &str = "uploads";

/// Extension used when nothing better is known.
pub const FALLBACK_EXTENSION: &str = "bin";

const TOKEN_LEN: usize = 6;
const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const FALLBACK_STEM: &str = "file";

lazy_static! {
    static ref DISALLOWED: Result<Regex, regex::Error> = Regex::new(r"[^A-Za-z0-9.\-]");
}

/// How the unique part of an object name is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingStrategy {
    /// `<millis>-<token>.<ext>`
    #[default]
    TimestampRandom,
    /// `<name>-<millis>.<ext>`
    NameTimestamp,
    /// `<millis>-<name>.<ext>`
    TimestampName,
}

impl NamingStrategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStrategy::TimestampRandom => "timestamp-random",
            NamingStrategy::NameTimestamp => "name-timestamp",
            NamingStrategy::TimestampName => "timestamp-name",
        }
    }
}

impl FromStr for NamingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "timestamp-random" => Ok(NamingStrategy::TimestampRandom),
            "name-timestamp" => Ok(NamingStrategy::NameTimestamp),
            "timestamp-name" => Ok(NamingStrategy::TimestampName),
            other => Err(format!(
                "unknown naming strategy {other:?}, expected timestamp-random, name-timestamp or timestamp-name"
            )),
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the stored extension comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtensionSource {
    /// Magic-byte detection, falling back to `bin`
    #[default]
    Sniff,
    /// The caller's filename, falling back to detection and then `bin`
    FileName,
}

impl ExtensionSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionSource::Sniff => "sniff",
            ExtensionSource::FileName => "filename",
        }
    }
}

impl FromStr for ExtensionSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sniff" => Ok(ExtensionSource::Sniff),
            "filename" => Ok(ExtensionSource::FileName),
            other => Err(format!(
                "unknown extension source {other:?}, expected sniff or filename"
            )),
        }
    }
}

impl fmt::Display for ExtensionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip every character outside `[A-Za-z0-9.-]`.
///
/// Idempotent: a sanitized name sanitizes to itself.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    match DISALLOWED.as_ref() {
        Ok(re) => re.replace_all(name, "").into_owned(),
        Err(_) => name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
            .collect(),
    }
}

/// Split a sanitized name into stem and lowercase extension.
fn split_name(sanitized: &str) -> (&str, Option<String>) {
    match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => (stem, Some(ext.to_ascii_lowercase())),
        _ => (sanitized, None),
    }
}

fn stem_of(original: Option<&str>) -> String {
    let sanitized = original.map(sanitize_filename).unwrap_or_default();
    let (stem, _) = split_name(&sanitized);
    let stem = stem.trim_matches('.');
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem.to_string()
    }
}

/// Extension of the format recognised from the leading bytes, if any.
#[must_use]
pub fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    infer::get(bytes).map(|kind| kind.extension())
}

/// Pick the stored extension for an upload.
#[must_use]
pub fn resolve_extension(source: ExtensionSource, original: Option<&str>, bytes: &[u8]) -> String {
    let sniffed = || sniff_extension(bytes).map(str::to_string);

    let resolved = match source {
        ExtensionSource::Sniff => sniffed(),
        ExtensionSource::FileName => original
            .map(sanitize_filename)
            .and_then(|name| split_name(&name).1)
            .or_else(sniffed),
    };

    resolved.unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// Random lowercase base36 token.
#[must_use]
pub fn random_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

/// Inputs to [`object_name`]; clock and randomness are supplied by the caller.
#[derive(Debug, Clone, Copy)]
pub struct NameParts<'a> {
    pub original: Option<&'a str>,
    pub extension: &'a str,
    pub timestamp_ms: i64,
    pub token: &'a str,
}

/// Build the file name (without prefix) for an upload.
#[must_use]
pub fn object_name(strategy: NamingStrategy, parts: NameParts<'_>) -> String {
    let NameParts {
        original,
        extension,
        timestamp_ms,
        token,
    } = parts;

    match strategy {
        NamingStrategy::TimestampRandom => format!("{timestamp_ms}-{token}.{extension}"),
        NamingStrategy::NameTimestamp => {
            format!("{}-{timestamp_ms}.{extension}", stem_of(original))
        }
        NamingStrategy::TimestampName => {
            format!("{timestamp_ms}-{}.{extension}", stem_of(original))
        }
    }
}

/// Repository path for an object name.
#[must_use]
pub fn object_path(name: &str) -> String {
    format!("{UPLOAD_PREFIX}/{name}")
}
