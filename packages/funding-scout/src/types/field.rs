//! Field-name equivalence.
//!
//! Field names are discovered at runtime, so two spellings of the same column
//! ("Résumé", "résumé", "RESUME") must resolve to one field. Every component
//! goes through this module; nothing else compares field names directly.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_key;

/// How closely two field names matched, strictest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchTier {
    /// Byte-for-byte equal
    Exact,
    /// Equal ignoring case
    CaseInsensitive,
    /// Equal after [`normalize_key`]
    Normalized,
}

impl MatchTier {
    /// All tiers in resolution order.
    pub const ALL: [MatchTier; 3] = [
        MatchTier::Exact,
        MatchTier::CaseInsensitive,
        MatchTier::Normalized,
    ];

    /// Whether `a` and `b` are equal under this tier alone.
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            MatchTier::Exact => a == b,
            MatchTier::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
            MatchTier::Normalized => {
                let na = normalize_key(a);
                !na.is_empty() && na == normalize_key(b)
            }
        }
    }
}

/// The strictest tier under which two field names are the same field.
pub fn match_tier(a: &str, b: &str) -> Option<MatchTier> {
    MatchTier::ALL.into_iter().find(|tier| tier.matches(a, b))
}

/// Whether two field names denote the same field under any tier.
pub fn same_field(a: &str, b: &str) -> bool {
    match_tier(a, b).is_some()
}

/// Find `target` among `candidates`, trying each tier across all candidates
/// before loosening to the next one.
///
/// Returns the index of the first candidate at the strictest matching tier.
pub fn find_field<S: AsRef<str>>(candidates: &[S], target: &str) -> Option<(usize, MatchTier)> {
    MatchTier::ALL.into_iter().find_map(|tier| {
        candidates
            .iter()
            .position(|c| tier.matches(c.as_ref(), target))
            .map(|idx| (idx, tier))
    })
}

/// Semantic role of a column, inferred from its header.
///
/// Roles decide which validator a cell goes through and which columns carry
/// the identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Name,
    Link,
    Email,
    Organization,
    Country,
    Deadline,
    Summary,
    Category,
    Priority,
    Year,
    Other,
}

const NAME_KEYS: &[&str] = &["nom", "name"];
const LINK_KEYS: &[&str] = &["lien", "link", "url"];

impl FieldRole {
    /// Infer the role of a header from its normalized form.
    pub fn of(header: &str) -> Self {
        let key = normalize_key(header);
        if key.is_empty() {
            return FieldRole::Other;
        }

        if key.contains("mail") || key.contains("courriel") {
            FieldRole::Email
        } else if LINK_KEYS.iter().any(|k| key.contains(k)) {
            FieldRole::Link
        } else if key.contains("organisme") || key.contains("organi") {
            FieldRole::Organization
        } else if NAME_KEYS.iter().any(|k| key.contains(k)) {
            FieldRole::Name
        } else if key.contains("pays") || key.contains("country") {
            FieldRole::Country
        } else if key.contains("deadline") || key.contains("echeance") || key.contains("datelimite") {
            FieldRole::Deadline
        } else if key.contains("resume") || key.contains("summary") || key.contains("description") {
            FieldRole::Summary
        } else if key.contains("categor") {
            FieldRole::Category
        } else if key.contains("priorit") {
            FieldRole::Priority
        } else if key.contains("annee") || key.contains("year") {
            FieldRole::Year
        } else {
            FieldRole::Other
        }
    }

    /// Whether a header names the record itself ("Nom", "Name", "Nom de l'aide").
    pub fn is_name_header(header: &str) -> bool {
        let lower = header.to_lowercase();
        NAME_KEYS.iter().any(|k| lower.contains(k))
    }
}

/// Locate the identity columns of a header row.
///
/// An exact normalized match ("nom", "lien") wins over a substring match
/// ("nom de l'aide", "url officielle"); among substring matches the first
/// column wins.
pub fn locate_identity_columns<S: AsRef<str>>(headers: &[S]) -> (Option<usize>, Option<usize>) {
    let keys: Vec<String> = headers.iter().map(|h| normalize_key(h.as_ref())).collect();

    let locate = |wanted: &[&str], role: FieldRole| {
        keys.iter()
            .position(|k| wanted.contains(&k.as_str()))
            .or_else(|| {
                headers
                    .iter()
                    .position(|h| FieldRole::of(h.as_ref()) == role)
            })
    };

    (locate(NAME_KEYS, FieldRole::Name), locate(LINK_KEYS, FieldRole::Link))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_tiers_in_order() {
        assert_eq!(match_tier("Nom", "Nom"), Some(MatchTier::Exact));
        assert_eq!(match_tier("Nom", "NOM"), Some(MatchTier::CaseInsensitive));
        assert_eq!(match_tier("Résumé", "resume"), Some(MatchTier::Normalized));
        assert_eq!(match_tier("Date Ajout", "date_ajout"), Some(MatchTier::Normalized));
        assert_eq!(match_tier("Nom", "Lien"), None);
    }

    #[test]
    fn test_symbols_only_never_match() {
        assert_eq!(match_tier("--", "__"), None);
    }

    #[test]
    fn test_find_field_prefers_stricter_tier() {
        let headers = ["resume", "Résumé"];
        assert_eq!(find_field(&headers, "Résumé"), Some((1, MatchTier::Exact)));
        assert_eq!(find_field(&headers, "RESUME"), Some((0, MatchTier::CaseInsensitive)));
        assert_eq!(find_field(&headers, "Pays"), None);
    }

    #[test]
    fn test_roles() {
        assert_eq!(FieldRole::of("Nom"), FieldRole::Name);
        assert_eq!(FieldRole::of("Organisme"), FieldRole::Organization);
        assert_eq!(FieldRole::of("Lien"), FieldRole::Link);
        assert_eq!(FieldRole::of("URL officielle"), FieldRole::Link);
        assert_eq!(FieldRole::of("Email de contact"), FieldRole::Email);
        assert_eq!(FieldRole::of("Résumé"), FieldRole::Summary);
        assert_eq!(FieldRole::of("Catégorie"), FieldRole::Category);
        assert_eq!(FieldRole::of("Priorité"), FieldRole::Priority);
        assert_eq!(FieldRole::of("Année"), FieldRole::Year);
        assert_eq!(FieldRole::of("Conditions"), FieldRole::Other);
    }

    #[test]
    fn test_locate_identity_columns() {
        let headers = ["Nom", "Organisme", "Pays", "Lien"];
        assert_eq!(locate_identity_columns(&headers), (Some(0), Some(3)));

        let headers = ["Nom de l'aide", "URL", "Nom"];
        assert_eq!(locate_identity_columns(&headers), (Some(2), Some(1)));

        let headers = ["Organisme", "Pays"];
        assert_eq!(locate_identity_columns(&headers), (None, None));
    }
}
