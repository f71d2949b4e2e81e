use anyhow::Result;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::data::matrix::{LanguageEntry, TranslationMatrix};

/// Handles search and filter operations on the translation matrix
pub struct SearchFilter;

impl SearchFilter {
    /// Case-insensitive pattern that matches `term` literally
    pub fn build_pattern(term: &str) -> Result<Regex> {
        let regex = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()?;
        Ok(regex)
    }

    /// Keep the pairs whose key or raw markup value matches. Every language
    /// entry survives, in order, even when nothing in it matched.
    pub fn apply_regex_filter(matrix: &TranslationMatrix, regex: &Regex) -> TranslationMatrix {
        let entries = matrix
            .entries()
            .iter()
            .map(|entry| LanguageEntry {
                code: entry.code.clone(),
                translations: entry
                    .translations
                    .iter()
                    .filter(|(key, value)| regex.is_match(key) || regex.is_match(value))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            })
            .collect();
        TranslationMatrix::new(entries)
    }

    /// Filter by a literal search term, falling back to the unfiltered
    /// matrix if no pattern can be built
    pub fn filter_matrix(matrix: &TranslationMatrix, term: &str) -> TranslationMatrix {
        match Self::build_pattern(term) {
            Ok(regex) => Self::apply_regex_filter(matrix, &regex),
            Err(e) => {
                warn!(target: "search", "Invalid search pattern {:?}: {}", term, e);
                matrix.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> TranslationMatrix {
        TranslationMatrix::new(vec![
            LanguageEntry::new("en")
                .with("greet", "hi")
                .with("price", "Cost: $5 (approx.)"),
            LanguageEntry::new("hr").with("greet", "bok"),
        ])
    }

    #[test]
    fn test_filter_keeps_all_languages() {
        let filtered = SearchFilter::filter_matrix(&matrix(), "HI");
        assert_eq!(filtered.column_count(), 2);
        assert_eq!(filtered.value(0, "greet"), Some("hi"));
        assert!(filtered.entry(1).unwrap().translations.is_empty());
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let filtered = SearchFilter::filter_matrix(&matrix(), "$5 (approx.)");
        assert_eq!(filtered.all_keys(), vec!["price"]);

        let filtered = SearchFilter::filter_matrix(&matrix(), ".*");
        assert!(filtered.all_keys().is_empty());
    }

    #[test]
    fn test_matches_key_or_markup() {
        let m = TranslationMatrix::new(vec![LanguageEntry::new("en")
            .with("title", "x")
            .with("other", "<span class=\"title\">y</span>")]);
        let filtered = SearchFilter::filter_matrix(&m, "title");
        assert_eq!(filtered.all_keys(), vec!["title", "other"]);
    }
}
