//! Salvage - build minimal records from the URLs in an unparseable answer.
//!
//! Used by the runner when the output parser yields nothing. Every record is
//! marked for manual review.

use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize::{clean_text_for_spreadsheet, truncate_chars};
use crate::types::record::Record;

/// Status given to salvaged records.
pub const SALVAGE_STATUS: &str = "À vérifier";

/// Characters of context kept on each side of a URL.
const CONTEXT_CHARS: usize = 200;

/// Characters of context kept as the summary.
const SUMMARY_CHARS: usize = 200;

/// Organizations recognised from the link's host.
const KNOWN_HOSTS: &[(&str, &str, &str)] = &[
    ("cnc", "CNC", "France"),
    ("scam", "SCAM", "France"),
    ("iledefrance", "Région Île-de-France", "France"),
];

lazy_static! {
    static ref URL_REGEX: Regex = Regex::new(r"https?://[^\s]+").unwrap();
    static ref LABELLED_NAME_REGEX: Regex =
        Regex::new(r"(?i)(?:Nom|Aide|Programme|Fonds)\s*:\s*([^\n]+)").unwrap();
    static ref TITLE_LINE_REGEX: Regex = Regex::new(r"(?m)^(\p{Lu}[^:\n]{10,50})$").unwrap();
    static ref FUNDING_PHRASE_REGEX: Regex =
        Regex::new(r"(?i)(?:aide|subvention|financement)\s+([^\n]+)").unwrap();
}

/// Build up to `limit` review-only records from the URLs found in `raw_text`.
pub fn salvage_records(raw_text: &str, limit: usize) -> Vec<Record> {
    let records: Vec<Record> = URL_REGEX
        .find_iter(raw_text)
        .take(limit)
        .enumerate()
        .map(|(i, m)| {
            let link = m.as_str().trim_end_matches(['.', ',', ';', ')', ']', '>']);
            let context = context_around(raw_text, m.start(), m.end());

            let mut record = Record::new()
                .with("Nom", guess_name(context).unwrap_or_else(|| format!("Aide {}", i + 1)))
                .with("Lien", link)
                .with("Résumé", truncate_chars(context.replace('\n', " ").trim(), SUMMARY_CHARS))
                .with("Statut", SALVAGE_STATUS);

            let host = link.to_lowercase();
            if let Some((_, organization, country)) = KNOWN_HOSTS.iter().find(|(key, _, _)| host.contains(key)) {
                record.set("Organisme", *organization);
                record.set("Pays", *country);
            }
            record
        })
        .collect();

    tracing::info!(count = records.len(), "Salvaged records from raw answer");
    records
}

/// Up to [`CONTEXT_CHARS`] characters either side of `start..end`.
fn context_around(text: &str, start: usize, end: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_CHARS - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_CHARS)
        .map(|(idx, _)| end + idx)
        .unwrap_or(text.len());
    &text[from..to]
}

fn guess_name(context: &str) -> Option<String> {
    [&*LABELLED_NAME_REGEX, &*TITLE_LINE_REGEX, &*FUNDING_PHRASE_REGEX]
        .iter()
        .find_map(|re| re.captures(context).and_then(|c| c.get(1)))
        .map(|m| clean_text_for_spreadsheet(m.as_str()))
        .filter(|name| !name.is_empty())
}
