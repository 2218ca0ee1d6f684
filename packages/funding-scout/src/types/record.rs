//! Records and header rows.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::field::{find_field, same_field, MatchTier};

/// One funding opportunity as an ordered field-name → value mapping.
///
/// Field names are whatever the store's header row (or the parser's expected
/// headers) say they are. Insertion order is preserved because a fresh store
/// derives its header row from the first record's keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, String>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any value already stored under the exact key.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Value stored under the exact key.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Resolve a header against this record's keys.
    ///
    /// Each tier is tried in turn and the first non-empty value wins, so an
    /// empty exact match does not hide a filled normalized match.
    pub fn lookup(&self, header: &str) -> Option<&str> {
        MatchTier::ALL.into_iter().find_map(|tier| {
            self.0
                .iter()
                .find(|(key, value)| !value.trim().is_empty() && tier.matches(key, header))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Whether at least one field carries a non-blank value.
    pub fn has_content(&self) -> bool {
        self.0.values().any(|v| !v.trim().is_empty())
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Field/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Normalize against the expected headers.
    ///
    /// Every expected header is present (empty when unresolved), in header
    /// order. Keys that match no expected header are kept after them so
    /// schema drift can still be reported.
    pub fn normalized<S: AsRef<str>>(&self, expected: &[S]) -> Record {
        let mut out = Record::new();
        for header in expected {
            let header = header.as_ref();
            out.set(header, self.lookup(header).unwrap_or_default());
        }
        for (key, value) in self.iter() {
            if !expected.iter().any(|h| same_field(h.as_ref(), key)) {
                out.set(key, value);
            }
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

/// The store's ordered column layout (row 1 of the sheet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderRow(Vec<String>);

impl HeaderRow {
    /// Build from raw header cells, trimming each one.
    pub fn new<S: AsRef<str>>(cells: &[S]) -> Self {
        Self(cells.iter().map(|c| c.as_ref().trim().to_string()).collect())
    }

    /// Column index of a field under the three-tier equivalence.
    pub fn position(&self, field: &str) -> Option<usize> {
        find_field(&self.0, field).map(|(idx, _)| idx)
    }

    /// Whether any column is the same field as `field`.
    pub fn contains_field(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Append a column at the end.
    pub fn push(&mut self, field: impl Into<String>) {
        self.0.push(field.into());
    }

    /// Replace one cell in place.
    pub fn set(&mut self, index: usize, field: impl Into<String>) {
        if let Some(cell) = self.0.get_mut(index) {
            *cell = field.into();
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for HeaderRow {
    fn from(cells: Vec<String>) -> Self {
        Self::new(&cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_exact_key() {
        let mut record = Record::new();
        record.set("Nom", "A");
        record.set("Nom", "B");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("Nom"), Some("B"));
    }

    #[test]
    fn test_lookup_walks_tiers() {
        let record = Record::new()
            .with("nom", "")
            .with("NOM", "CNC Aide")
            .with("résumé", "Aide au doc");

        assert_eq!(record.lookup("Nom"), Some("CNC Aide"));
        assert_eq!(record.lookup("Résumé"), Some("Aide au doc"));
        assert_eq!(record.lookup("Pays"), None);
    }

    #[test]
    fn test_normalized_fills_missing_and_keeps_extras() {
        let record = Record::new()
            .with("lien", "https://a")
            .with("Budget", "10k")
            .with("nom", "A");

        let normalized = record.normalized(&["Nom", "Lien", "Pays"]);
        let keys: Vec<_> = normalized.keys().collect();
        assert_eq!(keys, vec!["Nom", "Lien", "Pays", "Budget"]);
        assert_eq!(normalized.get("Pays"), Some(""));
        assert_eq!(normalized.get("Nom"), Some("A"));
    }

    #[test]
    fn test_has_content() {
        assert!(!Record::new().with("Nom", "  ").has_content());
        assert!(Record::new().with("Nom", "A").has_content());
    }

    #[test]
    fn test_header_position() {
        let headers = HeaderRow::new(&[" Nom ", "Résumé"]);
        assert_eq!(headers.position("nom"), Some(0));
        assert_eq!(headers.position("resume"), Some(1));
        assert!(!headers.contains_field("Pays"));
    }
}
