//! Dedup & merge - append only records the sheet does not already hold.
//!
//! A record's identity is its (name, link) pair. Names compare without case
//! and with runs of whitespace collapsed; links compare as written, trimmed.
//! Records lacking either part are never appended.
//!
//! [`MergeEngine::merge`] is pure: it takes a snapshot of the sheet and returns
//! the rows to append. [`MergeEngine::merge_into`] wires it to a store.

use std::collections::HashSet;

use chrono::Local;

use crate::error::{Result, ScoutError};
use crate::normalize::{clean_text_for_spreadsheet, validate_email, validate_url};
use crate::pipeline::enrich::{categorize, extract_year, priority_tier};
use crate::pipeline::schema::{initial_headers, SchemaReconciler};
use crate::traits::store::SheetStore;
use crate::types::config::SheetLayout;
use crate::types::field::{locate_identity_columns, same_field, FieldRole};
use crate::types::record::{HeaderRow, Record};

/// Identity of an opportunity for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    name: String,
    link: String,
}

impl IdentityKey {
    /// Build a key; `None` when the name or link is blank.
    pub fn new(name: &str, link: &str) -> Option<Self> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        let link = link.trim().to_string();
        if name.is_empty() || link.is_empty() {
            return None;
        }
        Some(Self { name, link })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}

/// Result of merging a batch against a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Header row the rows are laid out against.
    pub headers: HeaderRow,
    /// New rows, in input order.
    pub rows_to_append: Vec<Vec<String>>,
    /// Records accepted for append.
    pub added: usize,
    /// Records whose identity was already present (in the sheet or earlier in the batch).
    pub duplicates: usize,
    /// Records skipped for lacking a name or a link.
    pub missing_identity: usize,
}

impl MergeOutcome {
    /// Records considered.
    pub fn total(&self) -> usize {
        self.added + self.duplicates + self.missing_identity
    }

    /// Names of the appended rows, for the run report.
    pub fn added_names(&self) -> Vec<String> {
        let (name_col, _) = locate_identity_columns(self.headers.as_slice());
        let Some(col) = name_col else {
            return Vec::new();
        };
        self.rows_to_append
            .iter()
            .filter_map(|row| row.get(col).cloned())
            .collect()
    }
}

/// Merges parsed records into a sheet layout.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    layout: SheetLayout,
    added_at: String,
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new(SheetLayout::default())
    }
}

impl MergeEngine {
    /// Engine stamping rows with the current local time.
    pub fn new(layout: SheetLayout) -> Self {
        Self {
            layout,
            added_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
        }
    }

    /// Use a fixed insertion timestamp.
    pub fn with_timestamp(mut self, added_at: impl Into<String>) -> Self {
        self.added_at = added_at.into();
        self
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Decide which records to append to a sheet currently holding `snapshot`.
    ///
    /// The first snapshot row is the header row. An empty snapshot takes its
    /// headers from the first record plus the date column.
    pub fn merge(&self, snapshot: &[Vec<String>], records: &[Record]) -> MergeOutcome {
        let headers = match snapshot.first() {
            Some(header) => HeaderRow::new(header),
            None => match records.first() {
                Some(first) => initial_headers(first, &self.layout.date_column),
                None => return MergeOutcome::default(),
            },
        };

        let mut outcome = MergeOutcome {
            headers,
            ..MergeOutcome::default()
        };

        let (name_col, link_col) = locate_identity_columns(outcome.headers.as_slice());
        let (Some(name_col), Some(link_col)) = (name_col, link_col) else {
            tracing::warn!(
                headers = ?outcome.headers,
                "Sheet has no name or link column; nothing can be deduplicated"
            );
            outcome.missing_identity = records.len();
            return outcome;
        };

        // Hand-entered rows go through the same cell validation as new rows
        // so `www.cnc.fr/x` and `https://www.cnc.fr/x` share a key.
        let mut seen: HashSet<IdentityKey> = snapshot
            .iter()
            .skip(1)
            .filter_map(|row| {
                let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or_default();
                IdentityKey::new(
                    &clean_text_for_spreadsheet(cell(name_col)),
                    &validate_url(cell(link_col)),
                )
            })
            .collect();

        for record in records {
            let row = self.assemble_row(&outcome.headers, record);
            let Some(key) = IdentityKey::new(&row[name_col], &row[link_col]) else {
                tracing::warn!(record = ?record, "Skipping record without name or link");
                outcome.missing_identity += 1;
                continue;
            };

            if !seen.insert(key.clone()) {
                tracing::debug!(name = key.name(), link = key.link(), "Duplicate skipped");
                outcome.duplicates += 1;
                continue;
            }

            outcome.rows_to_append.push(row);
            outcome.added += 1;
        }

        outcome
    }

    /// Lay a record out against `headers`, validating and enriching cells.
    pub fn assemble_row(&self, headers: &HeaderRow, record: &Record) -> Vec<String> {
        headers
            .iter()
            .map(|header| {
                if same_field(header, &self.layout.date_column) {
                    return self.added_at.clone();
                }

                let value = record.lookup(header).unwrap_or_default();

                if same_field(header, &self.layout.status_column) {
                    let status = clean_text_for_spreadsheet(value);
                    return if status.is_empty() {
                        self.layout.status_default.clone()
                    } else {
                        status
                    };
                }

                let cleaned = match FieldRole::of(header) {
                    FieldRole::Email => return validate_email(value),
                    FieldRole::Link => return validate_url(value),
                    _ => clean_text_for_spreadsheet(value),
                };
                if !cleaned.is_empty() {
                    return cleaned;
                }

                match FieldRole::of(header) {
                    FieldRole::Category => categorize(
                        by_role(record, FieldRole::Name),
                        by_role(record, FieldRole::Summary),
                        by_role(record, FieldRole::Organization),
                    )
                    .label()
                    .to_string(),
                    FieldRole::Priority => priority_tier(
                        by_role(record, FieldRole::Country),
                        by_role(record, FieldRole::Organization),
                    )
                    .label()
                    .to_string(),
                    FieldRole::Year => extract_year(
                        by_role(record, FieldRole::Deadline),
                        by_role(record, FieldRole::Summary),
                    )
                    .to_string(),
                    _ => cleaned,
                }
            })
            .collect()
    }

    /// Merge `records` into `store`, appending row by row.
    ///
    /// An empty store first receives a header row. If an append fails, rows
    /// already written stay and the error reports how many there were.
    pub async fn merge_into<S: SheetStore + ?Sized>(&self, store: &S, records: &[Record]) -> Result<MergeOutcome> {
        if records.is_empty() {
            tracing::info!("No records to merge");
            return Ok(MergeOutcome::default());
        }

        let mut snapshot = store.get_all_rows().await?;
        if snapshot.is_empty() {
            let reconciler = SchemaReconciler::new(self.layout.clone());
            let report = reconciler.plan(&[] as &[&str], &records[0]);
            reconciler.apply(store, &report).await?;
            snapshot.push(report.headers.into_vec());
        }

        let outcome = self.merge(&snapshot, records);

        for (appended, row) in outcome.rows_to_append.iter().enumerate() {
            store.append_row(row).await.map_err(|e| {
                tracing::error!(appended, error = %e, "Append failed, aborting merge");
                ScoutError::MergeAborted {
                    appended,
                    source: Box::new(e),
                }
            })?;
        }

        tracing::info!(
            added = outcome.added,
            duplicates = outcome.duplicates,
            missing_identity = outcome.missing_identity,
            "Merge complete"
        );

        Ok(outcome)
    }
}

/// Merge with the default layout.
pub fn merge(snapshot: &[Vec<String>], records: &[Record]) -> MergeOutcome {
    MergeEngine::default().merge(snapshot, records)
}

/// First non-blank value among the record's fields with the given role.
fn by_role(record: &Record, role: FieldRole) -> &str {
    record
        .iter()
        .find(|(key, value)| !value.trim().is_empty() && FieldRole::of(key) == role)
        .map(|(_, value)| value)
        .unwrap_or_default()
}
