use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// One language column: its code plus the key -> markup value map, kept in
/// the order the host supplied it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    #[serde(rename = "languageCode", alias = "code")]
    pub code: String,
    #[serde(default)]
    pub translations: IndexMap<String, String>,
}

impl LanguageEntry {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            translations: IndexMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.translations.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.translations.get(key).map(String::as_str)
    }
}

/// Ordered list of language entries. Entry order is the column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMatrix {
    entries: Vec<LanguageEntry>,
}

impl TranslationMatrix {
    pub fn new(entries: Vec<LanguageEntry>) -> Self {
        Self { entries }
    }

    /// Parse the host dataset shape: `[{ "languageCode": .., "translations": {..} }]`
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<LanguageEntry> =
            serde_json::from_str(json).context("Failed to parse translation dataset")?;
        Ok(Self { entries })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.entries).context("Failed to serialize translations")
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    pub fn entry(&self, column_index: usize) -> Option<&LanguageEntry> {
        self.entries.get(column_index)
    }

    pub fn column_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn language_codes(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.code.clone()).collect()
    }

    /// Look up a value; a language without the key yields `None`
    pub fn value(&self, column_index: usize, key: &str) -> Option<&str> {
        self.entries.get(column_index)?.get(key)
    }

    /// Union of keys across all entries, deduplicated.
    ///
    /// Keys come out in first-seen order walking the columns left to right,
    /// which keeps the unsorted row order deterministic.
    pub fn all_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for entry in &self.entries {
            for key in entry.translations.keys() {
                if seen.insert(key.as_str()) {
                    keys.push(key.clone());
                }
            }
        }
        keys
    }

    fn set(&mut self, column_index: usize, key: &str, value: String) -> bool {
        match self.entries.get_mut(column_index) {
            Some(entry) => {
                entry.translations.insert(key.to_string(), value);
                true
            }
            None => false,
        }
    }
}

/// Owns the frozen original matrix and the working copy that edits land in
#[derive(Debug, Clone, Default)]
pub struct MatrixStore {
    original: TranslationMatrix,
    working: TranslationMatrix,
}

impl MatrixStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a deep copy of the host data. An empty dataset leaves the store
    /// unloaded and returns false.
    pub fn load(&mut self, original: Vec<LanguageEntry>) -> bool {
        if original.is_empty() {
            debug!(target: "view", "Ignoring empty dataset");
            return false;
        }

        self.original = TranslationMatrix::new(original);
        self.working = self.original.clone();
        info!(
            target: "view",
            "Loaded {} languages, {} keys",
            self.original.column_count(),
            self.original.all_keys().len()
        );
        true
    }

    pub fn is_loaded(&self) -> bool {
        !self.original.is_empty()
    }

    pub fn original(&self) -> &TranslationMatrix {
        &self.original
    }

    pub fn working(&self) -> &TranslationMatrix {
        &self.working
    }

    /// Write a value into the working matrix. Any string is accepted,
    /// including the empty string; only an unknown column is refused.
    pub fn set_value(&mut self, column_index: usize, key: &str, value: impl Into<String>) -> bool {
        let written = self.working.set(column_index, key, value.into());
        if written {
            debug!(target: "edit", "Set [{}] {}", column_index, key);
        }
        written
    }

    /// Throw away every edit and start again from the original data
    pub fn discard(&mut self) {
        self.working = self.original.clone();
        info!(target: "edit", "Discarded all changes");
    }

    pub fn is_modified(&self) -> bool {
        self.working != self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<LanguageEntry> {
        vec![
            LanguageEntry::new("en").with("greet", "hi").with("bye", "bye"),
            LanguageEntry::new("hr").with("greet", "bok").with("extra", "x"),
        ]
    }

    #[test]
    fn test_load_copies_into_working() {
        let mut store = MatrixStore::new();
        assert!(store.load(sample()));
        assert_eq!(store.working(), store.original());
        assert_eq!(store.working().column_count(), 2);
    }

    #[test]
    fn test_load_empty_is_noop() {
        let mut store = MatrixStore::new();
        assert!(!store.load(Vec::new()));
        assert!(!store.is_loaded());
        assert!(store.working().is_empty());
    }

    #[test]
    fn test_set_value_only_touches_working() {
        let mut store = MatrixStore::new();
        store.load(sample());

        assert!(store.set_value(1, "bye", ""));
        assert_eq!(store.working().value(1, "bye"), Some(""));
        assert_eq!(store.original().value(1, "bye"), None);
        assert!(store.is_modified());

        assert!(!store.set_value(7, "bye", "nope"));
    }

    #[test]
    fn test_discard_restores_original() {
        let mut store = MatrixStore::new();
        store.load(sample());
        store.set_value(0, "greet", "hello");
        store.discard();
        assert_eq!(store.working(), store.original());
        assert!(!store.is_modified());
    }

    #[test]
    fn test_all_keys_dedup_first_seen() {
        let matrix = TranslationMatrix::new(sample());
        assert_eq!(matrix.all_keys(), vec!["greet", "bye", "extra"]);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"[
            {"languageCode": "en", "translations": {"greet": "<b>hi</b>"}},
            {"code": "de", "translations": {}}
        ]"#;
        let matrix = TranslationMatrix::from_json(json).unwrap();
        assert_eq!(matrix.language_codes(), vec!["en", "de"]);
        assert_eq!(matrix.value(0, "greet"), Some("<b>hi</b>"));

        let out = matrix.to_json().unwrap();
        assert!(out.contains("\"languageCode\": \"en\""));
    }

    #[test]
    fn test_json_keeps_host_key_order() {
        let json = r#"[{"languageCode": "en", "translations": {"zeta": "z", "alpha": "a"}}]"#;
        let matrix = TranslationMatrix::from_json(json).unwrap();
        assert_eq!(matrix.all_keys(), vec!["zeta", "alpha"]);

        let out = matrix.to_json().unwrap();
        let zeta = out.find("\"zeta\"").unwrap();
        let alpha = out.find("\"alpha\"").unwrap();
        assert!(zeta < alpha);
        assert_eq!(TranslationMatrix::from_json(&out).unwrap(), matrix);
    }
}
