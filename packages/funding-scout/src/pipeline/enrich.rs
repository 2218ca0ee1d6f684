//! Keyword classifiers used to fill categorical columns.
//!
//! Fixed tables, scanned in order; the first table with a hit wins.

use std::fmt;

/// Kind of project a funding opportunity targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Series,
    Fiction,
    Documentary,
    General,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::Series => "Series",
            Category::Fiction => "Fiction",
            Category::Documentary => "Documentary",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Follow-up priority derived from where the money comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriorityTier {
    HighFrance,
    HighGermany,
    MediumAfrica,
    MediumEurope,
    Normal,
}

impl PriorityTier {
    pub fn label(self) -> &'static str {
        match self {
            PriorityTier::HighFrance => "High-France",
            PriorityTier::HighGermany => "High-Germany",
            PriorityTier::MediumAfrica => "Medium-Africa",
            PriorityTier::MediumEurope => "Medium-Europe",
            PriorityTier::Normal => "Normal",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const CATEGORY_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Series,
        &["série", "serie", "series", "websérie", "feuilleton"],
    ),
    (
        Category::Fiction,
        &[
            "fiction",
            "long métrage",
            "long-métrage",
            "court métrage",
            "court-métrage",
            "feature film",
            "scénario",
        ],
    ),
    (
        Category::Documentary,
        &["documentaire", "documentary", "docu"],
    ),
];

const PRIORITY_TABLE: &[(PriorityTier, &[&str])] = &[
    (
        PriorityTier::HighFrance,
        &[
            "france",
            "français",
            "française",
            "cnc",
            "scam",
            "procirep",
            "angoa",
            "île-de-france",
        ],
    ),
    (
        PriorityTier::HighGermany,
        &[
            "germany",
            "allemagne",
            "deutschland",
            "allemand",
            "ffa",
            "medienboard",
            "filmförderung",
        ],
    ),
    (
        PriorityTier::MediumAfrica,
        &[
            "africa",
            "afrique",
            "africain",
            "sénégal",
            "senegal",
            "maroc",
            "morocco",
            "côte d'ivoire",
            "burkina",
            "cameroun",
            "tunisie",
            "nigeria",
            "kenya",
        ],
    ),
    (
        PriorityTier::MediumEurope,
        &[
            "europe",
            "européen",
            "european",
            "eurimages",
            "creative europe",
            "union européenne",
        ],
    ),
];

/// Categorize from the opportunity's name, summary and organization.
pub fn categorize(name: &str, summary: &str, organization: &str) -> Category {
    let haystack = format!("{} {} {}", name, summary, organization).to_lowercase();
    first_hit(CATEGORY_TABLE, &haystack).unwrap_or(Category::General)
}

/// Priority tier from the opportunity's country and organization.
pub fn priority_tier(country: &str, organization: &str) -> PriorityTier {
    let haystack = format!("{} {}", country, organization).to_lowercase();
    first_hit(PRIORITY_TABLE, &haystack).unwrap_or(PriorityTier::Normal)
}

/// Funding year mentioned in the deadline or summary.
pub fn extract_year(deadline: &str, summary: &str) -> &'static str {
    let haystack = format!("{} {}", deadline, summary);
    match (haystack.contains("2025"), haystack.contains("2026")) {
        (true, true) => "2025-2026",
        (true, false) => "2025",
        (false, true) => "2026",
        (false, false) => "Not specified",
    }
}

fn first_hit<T: Copy>(table: &[(T, &[&str])], haystack: &str) -> Option<T> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| starts_word(haystack, k)))
        .map(|(value, _)| *value)
}

/// `keyword` occurs at the start of a word: `ffa` hits "FFA" but not
/// "Affaires", and `série` still hits "séries".
fn starts_word(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |before| !before.is_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("Aide aux séries", "", ""), Category::Series);
        assert_eq!(categorize("Fonds court-métrage", "", "Région"), Category::Fiction);
        assert_eq!(
            categorize("Aide sélective", "pour le documentaire de création", "CNC"),
            Category::Documentary
        );
        assert_eq!(categorize("Bourse", "", ""), Category::General);
    }

    #[test]
    fn test_categorize_first_table_wins() {
        assert_eq!(
            categorize("Série documentaire", "", ""),
            Category::Series
        );
    }

    #[test]
    fn test_priority_tier() {
        assert_eq!(priority_tier("France", ""), PriorityTier::HighFrance);
        assert_eq!(priority_tier("", "CNC"), PriorityTier::HighFrance);
        assert_eq!(priority_tier("Allemagne", "Medienboard"), PriorityTier::HighGermany);
        assert_eq!(priority_tier("Sénégal", "FOPICA"), PriorityTier::MediumAfrica);
        assert_eq!(priority_tier("", "Eurimages"), PriorityTier::MediumEurope);
        assert_eq!(priority_tier("Thaïlande", "TFDF"), PriorityTier::Normal);
        assert_eq!(PriorityTier::MediumEurope.to_string(), "Medium-Europe");
    }

    #[test]
    fn test_keywords_match_word_starts_only() {
        assert_eq!(
            priority_tier("Maroc", "Ministère des Affaires culturelles"),
            PriorityTier::MediumAfrica
        );
        assert_eq!(priority_tier("", "Transcncine"), PriorityTier::Normal);
        assert_eq!(priority_tier("", "FFA Berlin"), PriorityTier::HighGermany);
        assert_eq!(priority_tier("", "Région Île-de-France"), PriorityTier::HighFrance);
        assert_eq!(categorize("Bourse docu", "", ""), Category::Documentary);
        assert_eq!(categorize("Aide", "pour les autodocumentaires", ""), Category::General);
    }

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("31/12/2025", ""), "2025");
        assert_eq!(extract_year("", "sessions 2026"), "2026");
        assert_eq!(extract_year("mars 2025", "reconduit en 2026"), "2025-2026");
        assert_eq!(extract_year("Non spécifié", ""), "Not specified");
    }
}
