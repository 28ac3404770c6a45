//! Glossary support for consistent term translation

pub mod commands;
pub mod key;
pub mod repository;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use key::{KeyScope, build_global_key, build_series_key, parse_key};
pub use repository::Repository;

/// One glossary entry: source-language variants sharing a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub keys: Vec<String>,
    pub value: String,
}

impl GlossaryEntry {
    pub fn new<I, S>(keys: I, value: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            value: value.into(),
        }
    }

    fn has_key(&self, term: &str) -> bool {
        self.keys.iter().any(|k| k == term)
    }

    fn longest_match(&self, text: &str) -> Option<usize> {
        self.keys
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .map(|k| k.chars().count())
            .max()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glossary {
    pub entries: Vec<GlossaryEntry>,
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check the entry invariants: every entry has at least one key and no
    /// key is blank.
    pub fn validate(&self) -> Result<(), String> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.keys.is_empty() {
                return Err(format!("entry {} has no keys", i));
            }
            if entry.keys.iter().any(|k| k.trim().is_empty()) {
                return Err(format!("entry {} has an empty key", i));
            }
        }
        Ok(())
    }

    /// Insert an entry, replacing the first existing entry that shares any
    /// of its keys. Keys are trimmed and blank keys dropped; an entry left
    /// without keys is ignored.
    pub fn upsert(&mut self, mut entry: GlossaryEntry) {
        entry.keys = entry
            .keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if entry.keys.is_empty() {
            return;
        }

        match self
            .entries
            .iter()
            .position(|e| entry.keys.iter().any(|k| e.has_key(k)))
        {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Remove `term` from every entry. Entries left without keys are
    /// dropped. Returns the number of entries touched.
    pub fn remove_term(&mut self, term: &str) -> usize {
        let mut touched = 0;
        for entry in &mut self.entries {
            let before = entry.keys.len();
            entry.keys.retain(|k| k != term);
            if entry.keys.len() != before {
                touched += 1;
            }
        }
        self.entries.retain(|e| !e.keys.is_empty());
        touched
    }

    pub fn lookup(&self, term: &str) -> Option<&GlossaryEntry> {
        self.entries.iter().find(|e| e.has_key(term))
    }

    /// Entries with at least one key occurring in `text`, longest match first.
    pub fn matching(&self, text: &str) -> Vec<&GlossaryEntry> {
        let mut found: Vec<(usize, &GlossaryEntry)> = self
            .entries
            .iter()
            .filter_map(|e| e.longest_match(text).map(|len| (len, e)))
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));
        found.into_iter().map(|(_, e)| e).collect()
    }

    pub fn build_prompt_context(&self, text: &str) -> String {
        let matches = self.matching(text);
        if matches.is_empty() {
            return String::new();
        }
        let mut context = String::from("Use the following glossary for specific terms:\n");
        for entry in matches {
            context.push_str(&format!(
                "- {} → {}\n",
                entry
                    .keys
                    .iter()
                    .map(|k| format!("\"{}\"", k))
                    .collect::<Vec<_>>()
                    .join(" / "),
                entry.value
            ));
        }
        context
    }

    /// Layer this glossary over `fallback`. Fallback entries sharing any
    /// key with an entry here are skipped.
    pub fn with_fallback(&self, fallback: &Glossary) -> Glossary {
        let own_keys: HashSet<&str> = self
            .entries
            .iter()
            .flat_map(|e| e.keys.iter().map(String::as_str))
            .collect();

        let mut entries = self.entries.clone();
        entries.extend(
            fallback
                .entries
                .iter()
                .filter(|e| !e.keys.iter().any(|k| own_keys.contains(k.as_str())))
                .cloned(),
        );
        Glossary { entries }
    }

    /// Parse the plain-text glossary format.
    ///
    /// One entry per line, `term[, variant...] = value` or `term<TAB>value`.
    /// Blank lines and lines starting with `#` or `//` are skipped.
    pub fn from_lines(content: &str) -> Self {
        let mut glossary = Self::new();

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
                continue;
            }
            if let Some(entry) = Self::parse_line(line) {
                glossary.upsert(entry);
            } else {
                tracing::warn!("Invalid glossary entry at line {}: {}", line_num + 1, line);
            }
        }
        glossary
    }

    fn parse_line(line: &str) -> Option<GlossaryEntry> {
        for sep in ['=', '\t'] {
            if let Some((source, target)) = line.split_once(sep) {
                let keys: Vec<String> = source
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect();
                let target = target.trim();
                if !keys.is_empty() && !target.is_empty() {
                    return Some(GlossaryEntry::new(keys, target));
                }
            }
        }
        None
    }
}
