//! Glossary storage keys
//!
//! A glossary is addressed by a single string key:
//!
//! - series: `glossary_<domain>_<series>_<source>_<target>`
//! - global: `glossary_global_<source>_<target>`
//!
//! Segments are joined with `_` and never escaped. Domain ids and language
//! codes must not contain underscores; series ids may, and decoding fuses
//! them back together after taking the two trailing segments as languages.
//!
//! The encoding is positional, so a head of exactly `glossary_global` is
//! always read as a global key. A domain literally named `global` is only
//! representable when followed by at least one series segment.

use serde::Serialize;
use std::fmt;

pub const KEY_PREFIX: &str = "glossary_";
const PREFIX_SEGMENT: &str = "glossary";
const GLOBAL_SEGMENT: &str = "global";
const SEPARATOR: char = '_';

pub fn build_series_key(
    domain_id: &str,
    series_id: &str,
    source_lang: &str,
    target_lang: &str,
) -> String {
    format!(
        "{}_{}_{}_{}_{}",
        PREFIX_SEGMENT, domain_id, series_id, source_lang, target_lang
    )
}

pub fn build_global_key(source_lang: &str, target_lang: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        PREFIX_SEGMENT, GLOBAL_SEGMENT, source_lang, target_lang
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyScope {
    Series {
        domain_id: String,
        series_id: String,
    },
    Global,
}

/// Structured view of a glossary key, produced by [`parse_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedKey {
    #[serde(flatten)]
    pub scope: KeyScope,
    pub source_lang: String,
    pub target_lang: String,
    pub original_key: String,
}

impl ParsedKey {
    pub fn is_global(&self) -> bool {
        matches!(self.scope, KeyScope::Global)
    }

    /// Key of the global glossary sharing this key's language pair.
    pub fn global_counterpart(&self) -> String {
        build_global_key(&self.source_lang, &self.target_lang)
    }
}

impl fmt::Display for ParsedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            KeyScope::Series {
                domain_id,
                series_id,
            } => write!(
                f,
                "series  {}/{} ({} -> {})",
                domain_id, series_id, self.source_lang, self.target_lang
            ),
            KeyScope::Global => write!(
                f,
                "global  ({} -> {})",
                self.source_lang, self.target_lang
            ),
        }
    }
}

/// Decode a glossary key. Returns `None` for anything that is not a
/// well-formed glossary key; never panics.
pub fn parse_key(key: &str) -> Option<ParsedKey> {
    if !key.starts_with(KEY_PREFIX) {
        return None;
    }

    let mut parts: Vec<&str> = key.split(SEPARATOR).collect();
    if parts.len() < 4 {
        return None;
    }

    let target_lang = parts.pop()?.to_string();
    let source_lang = parts.pop()?.to_string();

    let scope = match parts.as_slice() {
        [_, GLOBAL_SEGMENT] => KeyScope::Global,
        [_, domain_id, series @ ..] if !series.is_empty() => KeyScope::Series {
            domain_id: domain_id.to_string(),
            series_id: series.join("_"),
        },
        _ => return None,
    };

    Some(ParsedKey {
        scope,
        source_lang,
        target_lang,
        original_key: key.to_string(),
    })
}
