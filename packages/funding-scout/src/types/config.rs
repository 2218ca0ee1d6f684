//! Configuration types for the sheet layout and the research run.

use serde::{Deserialize, Serialize};

/// What the schema reconciler may do to a non-empty header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// Leave existing headers untouched; only create them on an empty sheet.
    #[default]
    Preserve,
    /// Enforce the canonical layout: fix mismatched cells in place and append
    /// missing trailing columns.
    Canonical,
}

/// Column conventions of the persisted sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Column stamped with the insertion time (`YYYY-MM-DD HH:MM`).
    pub date_column: String,

    /// Column holding the review status.
    pub status_column: String,

    /// Status written on insert when the record carries none.
    pub status_default: String,

    /// Columns filled by the system rather than the research agents.
    ///
    /// Excluded from the research prompt. The date column is always treated
    /// as automatic.
    pub auto_columns: Vec<String>,

    /// Canonical column layout, enforced under [`HeaderPolicy::Canonical`].
    pub canonical: Vec<String>,

    /// Header mutation policy.
    pub header_policy: HeaderPolicy,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::french()
    }
}

impl SheetLayout {
    /// Layout of the French funding sheet.
    pub fn french() -> Self {
        Self {
            date_column: "Date Ajout".to_string(),
            status_column: "Statut".to_string(),
            status_default: "Nouveau".to_string(),
            auto_columns: vec!["id".to_string(), "timestamp".to_string()],
            canonical: [
                "Nom",
                "Organisme",
                "Pays",
                "Deadline",
                "Lien",
                "Résumé",
                "Email",
                "Conditions",
                "Catégorie",
                "Année",
                "Date Ajout",
                "Statut",
                "Priorité",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            header_policy: HeaderPolicy::Preserve,
        }
    }

    /// English column names.
    pub fn english() -> Self {
        Self {
            date_column: "Date Added".to_string(),
            status_column: "Status".to_string(),
            status_default: "New".to_string(),
            auto_columns: vec!["id".to_string(), "timestamp".to_string()],
            canonical: [
                "Name",
                "Organization",
                "Country",
                "Deadline",
                "Link",
                "Summary",
                "Email",
                "Conditions",
                "Category",
                "Year",
                "Date Added",
                "Status",
                "Priority",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            header_policy: HeaderPolicy::Preserve,
        }
    }

    /// Set the header policy.
    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.header_policy = policy;
        self
    }

    /// Set the status written on insert.
    pub fn with_status_default(mut self, status: impl Into<String>) -> Self {
        self.status_default = status.into();
        self
    }

    /// Whether a header is filled by the system rather than the agents.
    pub fn is_auto_column(&self, header: &str) -> bool {
        crate::types::field::same_field(header, &self.date_column)
            || self
                .auto_columns
                .iter()
                .any(|c| crate::types::field::same_field(header, c))
    }

    /// Fields asked of the agents when the sheet has no header yet.
    pub fn default_fields(&self) -> Vec<String> {
        self.canonical
            .iter()
            .filter(|h| !self.is_auto_column(h))
            .filter(|h| !crate::types::field::same_field(h, &self.status_column))
            .cloned()
            .collect()
    }
}

/// Limits and defaults for the research stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Search results kept per keyword.
    pub links_per_query: usize,

    /// Characters of page content kept per page.
    pub max_page_chars: usize,

    /// Characters of collected content sent to the first agent stage.
    pub max_prompt_chars: usize,

    /// Keywords used when the keyword worksheet is empty.
    pub default_keywords: Vec<String>,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            links_per_query: 5,
            max_page_chars: 5_000,
            max_prompt_chars: 50_000,
            default_keywords: vec![
                "aide documentaire postproduction France".to_string(),
                "financement documentaire coproduction internationale".to_string(),
                "subvention documentaire culturel 2024".to_string(),
            ],
        }
    }
}

impl ResearchConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of links kept per keyword.
    pub fn with_links_per_query(mut self, limit: usize) -> Self {
        self.links_per_query = limit;
        self
    }

    /// Replace the fallback keywords.
    pub fn with_default_keywords(
        mut self,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.default_keywords = keywords.into_iter().map(|k| k.into()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_columns() {
        let layout = SheetLayout::french();
        assert!(layout.is_auto_column("Date Ajout"));
        assert!(layout.is_auto_column("date ajout"));
        assert!(layout.is_auto_column("ID"));
        assert!(!layout.is_auto_column("Nom"));
    }

    #[test]
    fn test_default_fields_skip_system_columns() {
        let fields = SheetLayout::french().default_fields();
        assert_eq!(fields.first().map(String::as_str), Some("Nom"));
        assert!(!fields.iter().any(|f| f == "Date Ajout" || f == "Statut"));
        assert!(fields.iter().any(|f| f == "Priorité"));
    }
}
