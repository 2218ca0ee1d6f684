//! Output parser - turn the agents' final answer into records.
//!
//! The answer is free text that is only loosely shaped like `Field: value`
//! lines. Two strategies are tried in order and the first one that yields at
//! least one record wins:
//!
//! 1. [`LineScan`]: one `Field: value` per line, a name field opens a record.
//! 2. [`BlockScan`]: blank-line separated blocks, labels found anywhere.
//!
//! Field names that are prefixes of other field names can cut a value short.
//! This is a heuristic reader, not a grammar.

use regex::Regex;

use crate::normalize::{clean_text_for_spreadsheet, unwrap_markdown_link};
use crate::types::field::FieldRole;
use crate::types::record::Record;

/// A way of reading records out of raw agent output.
pub trait ParseStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract raw records. Records with no content may be returned; the
    /// parser drops them.
    fn parse(&self, text: &str, expected: &[String]) -> Vec<Record>;
}

/// Ordered list of strategies tried until one produces records.
pub struct OutputParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
}

impl Default for OutputParser {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(LineScan), Box::new(BlockScan)],
        }
    }
}

impl OutputParser {
    /// Parser with the standard line-then-block strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with a custom strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn ParseStrategy>>) -> Self {
        Self { strategies }
    }

    /// Parse `text` into normalized records.
    ///
    /// An empty result means no strategy recognised anything; the caller
    /// decides what to do next.
    pub fn parse<S: AsRef<str>>(&self, text: &str, expected_headers: &[S]) -> Vec<Record> {
        let expected: Vec<String> = expected_headers
            .iter()
            .map(|h| h.as_ref().trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();

        let text = text.trim();
        if text.is_empty() || expected.is_empty() {
            tracing::warn!(
                text_len = text.len(),
                headers = expected.len(),
                "Nothing to parse"
            );
            return Vec::new();
        }

        for strategy in &self.strategies {
            let records: Vec<Record> = strategy
                .parse(text, &expected)
                .into_iter()
                .filter(Record::has_content)
                .map(|r| r.normalized(&expected))
                .collect();

            if !records.is_empty() {
                tracing::info!(
                    strategy = strategy.name(),
                    count = records.len(),
                    "Parsed records from agent output"
                );
                return records;
            }

            tracing::debug!(strategy = strategy.name(), "Strategy yielded no records");
        }

        tracing::warn!(text_len = text.len(), "No records parsed from agent output");
        Vec::new()
    }
}

/// Parse with the default strategy chain.
pub fn parse<S: AsRef<str>>(raw_text: &str, expected_headers: &[S]) -> Vec<Record> {
    OutputParser::default().parse(raw_text, expected_headers)
}

/// Line-oriented strategy.
///
/// A line that starts with a name-like field opens a new record; every line
/// starting with `Field:` sets that field on the current record.
pub struct LineScan;

impl ParseStrategy for LineScan {
    fn name(&self) -> &'static str {
        "line_scan"
    }

    fn parse(&self, text: &str, expected: &[String]) -> Vec<Record> {
        let fields: Vec<(&str, Regex)> = expected
            .iter()
            .filter_map(|h| {
                compile(&format!(r"(?i)^{}\s*:\s*(.+)$", regex::escape(h))).map(|re| (h.as_str(), re))
            })
            .collect();

        let openers: Vec<Regex> = expected
            .iter()
            .filter(|h| FieldRole::is_name_header(h))
            .filter_map(|h| compile(&format!(r"(?i)^{}\s*:", regex::escape(h))))
            .collect();

        let mut records = Vec::new();
        let mut current = Record::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if openers.iter().any(|re| re.is_match(line)) && current.has_content() {
                records.push(std::mem::take(&mut current));
            }

            for (field, re) in &fields {
                if let Some(value) = re.captures(line).and_then(|c| c.get(1)) {
                    current.set(*field, clean_value(field, value.as_str()));
                }
            }
        }

        if current.has_content() {
            records.push(current);
        }

        records
    }
}

/// Block-oriented fallback.
///
/// Splits on blank lines and looks for `Field:` labels anywhere in a block,
/// so bulleted or inline layouts (`- Nom: X`, `Nom: X | Lien: Y`) still read.
/// A value ends at the next label or at the end of its line. A label alone on
/// its line takes the next line as its value unless that line is a label too.
pub struct BlockScan;

impl ParseStrategy for BlockScan {
    fn name(&self) -> &'static str {
        "block_scan"
    }

    fn parse(&self, text: &str, expected: &[String]) -> Vec<Record> {
        // Longest names first so "Nom de l'aide" wins over "Nom" in the alternation
        let mut by_length: Vec<&String> = expected.iter().collect();
        by_length.sort_by_key(|h| std::cmp::Reverse(h.chars().count()));
        let alternation = by_length
            .iter()
            .map(|h| regex::escape(h))
            .collect::<Vec<_>>()
            .join("|");

        let Some(any_label) = compile(&format!(r"(?i)(?:{})(?:\*\*|__)?\s*:", alternation)) else {
            return Vec::new();
        };
        let Some(block_split) = compile(r"\n[ \t]*\n") else {
            return Vec::new();
        };

        let fields: Vec<(&str, Regex)> = expected
            .iter()
            .filter_map(|h| {
                compile(&format!(r"(?i){}(?:\*\*|__)?[ \t]*:[ \t]*", regex::escape(h)))
                    .map(|re| (h.as_str(), re))
            })
            .collect();

        block_split
            .split(text)
            .filter(|block| !block.trim().is_empty())
            .filter_map(|block| {
                let mut record = Record::new();
                for (field, re) in &fields {
                    let Some(label) = re.find(block) else {
                        continue;
                    };
                    let line = value_line(&block[label.end()..], &any_label);
                    let value_end = any_label.find(line).map(|m| m.start()).unwrap_or(line.len());
                    record.set(*field, clean_value(field, &line[..value_end]));
                }
                record.has_content().then_some(record)
            })
            .collect()
    }
}

/// Line holding the value that follows a label.
fn value_line<'a>(rest: &'a str, any_label: &Regex) -> &'a str {
    let (line, after) = rest.split_once('\n').unwrap_or((rest, ""));
    if !line.trim().is_empty() {
        return line;
    }

    let next = after.split_once('\n').map_or(after, |(next, _)| next);
    let next_is_label = any_label.find(next).is_some_and(|m| {
        next[..m.start()]
            .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '*' | '•'))
            .is_empty()
    });
    if next_is_label {
        line
    } else {
        next
    }
}

/// Tidy a captured value and clean it for the sheet.
///
/// Link fields that are a single markdown link keep the link target.
fn clean_value(field: &str, raw: &str) -> String {
    let value = raw
        .trim()
        .trim_start_matches(['*', '_'])
        .trim_end_matches(['*', '_'])
        .trim()
        .trim_end_matches([',', ';', '.'])
        .trim();

    if FieldRole::of(field) == FieldRole::Link {
        clean_text_for_spreadsheet(&unwrap_markdown_link(value))
    } else {
        clean_text_for_spreadsheet(value)
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Skipping field pattern that failed to compile");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_records_from_lines() {
        let text = "Nom: A\nLien: http://a\n\nNom: B\nLien: http://b\n";
        let records = parse(text, &["Nom", "Lien"]);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], Record::new().with("Nom", "A").with("Lien", "http://a"));
        assert_eq!(records[1], Record::new().with("Nom", "B").with("Lien", "http://b"));
    }

    #[test]
    fn test_line_scan_is_case_insensitive_and_strips_punctuation() {
        let text = "NOM : Fonds Image de la Francophonie;\nPAYS: France.\nlien: www.fif.org,";
        let records = LineScan.parse(text, &headers(&["Nom", "Pays", "Lien"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Nom"), Some("Fonds Image de la Francophonie"));
        assert_eq!(records[0].get("Pays"), Some("France"));
        assert_eq!(records[0].get("Lien"), Some("www.fif.org"));
    }

    #[test]
    fn test_line_scan_cleans_markdown_values() {
        let text = "Nom: **Aide au développement**\nRésumé: Une aide [très](http://x) utile";
        let records = parse(text, &["Nom", "Résumé"]);

        assert_eq!(records[0].get("Nom"), Some("Aide au développement"));
        assert_eq!(records[0].get("Résumé"), Some("Une aide très utile"));
    }

    #[test]
    fn test_link_field_keeps_markdown_target() {
        let text = "Nom: CNC\nLien: [Page CNC](https://www.cnc.fr/aide)";
        let records = parse(text, &["Nom", "Lien"]);

        assert_eq!(records[0].get("Lien"), Some("https://www.cnc.fr/aide"));
    }

    #[test]
    fn test_missing_fields_normalized_to_empty() {
        let records = parse("Nom: A", &["Nom", "Lien", "Pays"]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Lien"), Some(""));
        assert_eq!(records[0].get("Pays"), Some(""));
    }

    #[test]
    fn test_block_scan_reads_bulleted_output() {
        let text = "1. - Nom: Aide A\n   - Lien: https://a.fr\n\n2. - Nom: Aide B\n   - Lien: https://b.fr";
        let expected = headers(&["Nom", "Lien"]);

        assert!(LineScan.parse(text, &expected).is_empty());

        let records = parse(text, &expected);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Nom"), Some("Aide A"));
        assert_eq!(records[1].get("Lien"), Some("https://b.fr"));
    }

    #[test]
    fn test_block_scan_stops_at_next_label() {
        let text = "* Nom: Aide A Lien: https://a.fr Pays: France";
        let records = BlockScan.parse(text, &headers(&["Nom", "Lien", "Pays"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Nom"), Some("Aide A"));
        assert_eq!(records[0].get("Lien"), Some("https://a.fr"));
        assert_eq!(records[0].get("Pays"), Some("France"));
    }

    #[test]
    fn test_block_scan_value_on_following_line() {
        let text = "Nom:\nAide A\nLien: https://a.fr";
        let records = BlockScan.parse(text, &headers(&["Nom", "Lien"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Nom"), Some("Aide A"));
        assert_eq!(records[0].get("Lien"), Some("https://a.fr"));
    }

    #[test]
    fn test_block_scan_empty_label_before_label_stays_empty() {
        let text = "Nom: Aide A\nPays:\n- Lien: https://a.fr";
        let records = BlockScan.parse(text, &headers(&["Nom", "Lien", "Pays"]));

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Pays"), Some(""));
        assert_eq!(records[0].get("Lien"), Some("https://a.fr"));
    }

    #[test]
    fn test_block_scan_handles_bold_labels() {
        let text = "- **Nom**: Aide A\n- **Lien :** https://a.fr";
        let records = parse(text, &["Nom", "Lien"]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Nom"), Some("Aide A"));
        assert_eq!(records[0].get("Lien"), Some("https://a.fr"));
    }

    #[test]
    fn test_nothing_recognised_yields_empty() {
        assert!(parse("Sorry, I found nothing relevant.", &["Nom", "Lien"]).is_empty());
        assert!(parse("", &["Nom"]).is_empty());
        assert!(parse("Nom: A", &[] as &[&str]).is_empty());
    }

    #[test]
    fn test_empty_values_discarded() {
        let text = "Nom: ...\nLien: ,";
        assert!(parse(text, &["Nom", "Lien"]).is_empty());
    }
}
