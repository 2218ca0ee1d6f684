//! Text normalization for keys and spreadsheet values.
//!
//! Language-model output arrives with markdown decoration, typographic quotes
//! and stray whitespace. Everything written to the store goes through
//! [`clean_text_for_spreadsheet`]; everything compared as a field name goes
//! through [`normalize_key`].

use lazy_static::lazy_static;
use regex::Regex;

/// Maximum number of characters written into a single cell.
pub const MAX_CELL_CHARS: usize = 500;

const ELLIPSIS: &str = "...";

/// Accent folding table. Anything accented outside this table is dropped by
/// the alphanumeric filter in [`normalize_key`].
const ACCENT_FOLDS: &[(char, char)] = &[
    ('é', 'e'),
    ('è', 'e'),
    ('ê', 'e'),
    ('ë', 'e'),
    ('à', 'a'),
    ('â', 'a'),
    ('ä', 'a'),
    ('ù', 'u'),
    ('û', 'u'),
    ('ü', 'u'),
    ('ô', 'o'),
    ('ö', 'o'),
    ('î', 'i'),
    ('ï', 'i'),
    ('ç', 'c'),
];

lazy_static! {
    static ref FENCE_REGEX: Regex = Regex::new(r"```[A-Za-z0-9_+-]*").unwrap();
    static ref MD_LINK_REGEX: Regex = Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").unwrap();
    static ref WHOLE_MD_LINK_REGEX: Regex =
        Regex::new(r"^\s*\[[^\]]*\]\(([^)\s]+)\)\s*$").unwrap();
    static ref BOLD_STAR_REGEX: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref BOLD_UNDERSCORE_REGEX: Regex = Regex::new(r"__(.+?)__").unwrap();
    static ref ITALIC_STAR_REGEX: Regex = Regex::new(r"\*([^*\n]+?)\*").unwrap();
    // `_x_` only when the underscores are not inside a word (snake_case, emails)
    static ref ITALIC_UNDERSCORE_REGEX: Regex =
        Regex::new(r"(^|[^\w])_([^_\n]+?)_([^\w]|$)").unwrap();
    static ref HEADING_REGEX: Regex = Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").unwrap();
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

/// Normalize a key for loose comparison.
///
/// Lowercases, folds French accents to their base letter and drops every
/// character outside `[a-z0-9]`. `"Résumé"`, `"RESUME"` and `"résumé "` all
/// normalize to `"resume"`.
pub fn normalize_key(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            ACCENT_FOLDS
                .iter()
                .find(|(accented, _)| *accented == c)
                .map(|(_, base)| *base)
                .unwrap_or(c)
        })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Strip markdown and typographic noise so the value fits a spreadsheet cell.
///
/// Markdown links keep only their label. Output is trimmed, single-spaced and
/// at most [`MAX_CELL_CHARS`] characters long (ending in `...` when cut).
/// Cleaning already-clean text returns it unchanged.
pub fn clean_text_for_spreadsheet(text: &str) -> String {
    // Stripping one layer of markup can expose another (`_a_ _b_`,
    // `[x]_(url)_`); repeat until a pass changes nothing. Every pass either
    // shortens the text or only swaps characters it never reintroduces.
    let mut current = clean_pass(text);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = FENCE_REGEX.replace_all(text, "");
    let text = text.replace('`', "");
    let text = MD_LINK_REGEX.replace_all(&text, "$1");
    let text = BOLD_STAR_REGEX.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE_REGEX.replace_all(&text, "$1");
    let text = ITALIC_STAR_REGEX.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE_REGEX.replace_all(&text, "$1$2$3");
    let text = HEADING_REGEX.replace_all(&text, "");
    let text = normalize_quotes(&text);
    let text = WHITESPACE_REGEX.replace_all(&text, " ");

    truncate_cell(text.trim())
}

/// Validate an email cell.
///
/// Returns the lowercased address when it is well formed, the cleaned text
/// when it merely contains `@`, and an empty string otherwise.
pub fn validate_email(text: &str) -> String {
    let cleaned = clean_text_for_spreadsheet(text);
    if cleaned.is_empty() {
        return cleaned;
    }

    if EMAIL_REGEX.is_match(&cleaned) {
        cleaned.to_lowercase()
    } else if cleaned.contains('@') {
        cleaned
    } else {
        String::new()
    }
}

/// Validate a link cell, adding `https://` to bare hosts.
///
/// A value that is entirely one markdown link keeps its target rather than
/// its label.
pub fn validate_url(text: &str) -> String {
    let cleaned = clean_text_for_spreadsheet(&unwrap_markdown_link(text));
    if cleaned.is_empty() {
        return cleaned;
    }

    let lower = cleaned.to_lowercase();
    let has_scheme = ["http://", "https://", "ftp://", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));

    if !has_scheme && (lower.starts_with("www.") || cleaned.contains('.')) {
        format!("https://{}", cleaned)
    } else {
        cleaned
    }
}

/// Return the target of a value that is a single markdown link, or the value
/// unchanged.
pub fn unwrap_markdown_link(text: &str) -> String {
    WHOLE_MD_LINK_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|target| target.as_str().to_string())
        .unwrap_or_else(|| text.to_string())
}

/// Longest prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '“' | '”' | '„' | '«' | '»' | '″' => '"',
            '‘' | '’' | '‚' | '′' => '\'',
            other => other,
        })
        .collect()
}

fn truncate_cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }

    let keep = MAX_CELL_CHARS - ELLIPSIS.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
