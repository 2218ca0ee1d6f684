//! Schema reconciler - keep the header row compatible with incoming records.
//!
//! Planning is pure: [`SchemaReconciler::plan`] compares the current header
//! row with a sample record and returns the header mutations to perform plus
//! the record fields that no column will hold. [`SchemaReconciler::apply`]
//! performs the mutations against a store.
//!
//! Under [`HeaderPolicy::Preserve`] an existing header row is never touched;
//! only an empty store gets one, derived from the sample record. Under
//! [`HeaderPolicy::Canonical`] the row is forced into the canonical layout.

use crate::error::Result;
use crate::traits::store::SheetStore;
use crate::types::config::{HeaderPolicy, SheetLayout};
use crate::types::field::same_field;
use crate::types::record::{HeaderRow, Record};

/// One mutation of the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderAction {
    /// Write the first row of an empty store.
    Create(Vec<String>),
    /// Overwrite a single header cell (0-based column).
    Rename {
        column: usize,
        from: String,
        to: String,
    },
    /// Add columns at the end; `row` is the full resulting header row.
    Extend { added: Vec<String>, row: Vec<String> },
}

/// Outcome of planning a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    /// Header row after the actions are applied.
    pub headers: HeaderRow,
    /// Mutations to apply, in order.
    pub actions: Vec<HeaderAction>,
    /// Sample record fields that match no column under any tier.
    pub unmapped: Vec<String>,
}

impl SchemaReport {
    /// Whether applying the report would leave the store untouched.
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Plans and applies header row changes for one sheet layout.
#[derive(Debug, Clone, Default)]
pub struct SchemaReconciler {
    layout: SheetLayout,
}

impl SchemaReconciler {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Compare `current` headers with `sample` and plan the mutations.
    pub fn plan<S: AsRef<str>>(&self, current: &[S], sample: &Record) -> SchemaReport {
        let current = HeaderRow::new(current);

        let (headers, actions) = if current.is_empty() {
            let headers = initial_headers(sample, &self.layout.date_column);
            let actions = if headers.is_empty() {
                Vec::new()
            } else {
                vec![HeaderAction::Create(headers.as_slice().to_vec())]
            };
            (headers, actions)
        } else {
            match self.layout.header_policy {
                HeaderPolicy::Preserve => (current, Vec::new()),
                HeaderPolicy::Canonical => self.enforce_canonical(current),
            }
        };

        let unmapped = unmapped_fields(sample, &headers);
        SchemaReport {
            headers,
            actions,
            unmapped,
        }
    }

    fn enforce_canonical(&self, mut headers: HeaderRow) -> (HeaderRow, Vec<HeaderAction>) {
        let mut actions = Vec::new();

        for (column, wanted) in self.layout.canonical.iter().enumerate().take(headers.len()) {
            let found = headers.as_slice()[column].clone();
            if !same_field(&found, wanted) {
                headers.set(column, wanted.clone());
                actions.push(HeaderAction::Rename {
                    column,
                    from: found,
                    to: wanted.clone(),
                });
            }
        }

        if headers.len() < self.layout.canonical.len() {
            let added = self.layout.canonical[headers.len()..].to_vec();
            for column in &added {
                headers.push(column.clone());
            }
            actions.push(HeaderAction::Extend {
                added,
                row: headers.as_slice().to_vec(),
            });
        }

        (headers, actions)
    }

    /// Apply planned mutations to the store.
    ///
    /// Unmapped fields are reported here, once per reconciliation.
    pub async fn apply<S: SheetStore + ?Sized>(&self, store: &S, report: &SchemaReport) -> Result<()> {
        for action in &report.actions {
            match action {
                HeaderAction::Create(row) => {
                    tracing::info!(columns = row.len(), "Creating header row");
                    store.append_row(row).await?;
                }
                HeaderAction::Rename { column, from, to } => {
                    tracing::info!(column = column + 1, from = %from, to = %to, "Correcting header");
                    store.update_cell(1, column + 1, to).await?;
                }
                HeaderAction::Extend { added, row } => {
                    tracing::info!(added = ?added, "Adding missing columns");
                    store.update_row(1, row).await?;
                }
            }
        }

        if !report.unmapped.is_empty() {
            tracing::info!(
                unmapped = ?report.unmapped,
                "Fields not mapped to any column; add matching columns to keep them"
            );
        }

        Ok(())
    }

    /// Read the store's headers, plan against `sample` and apply.
    pub async fn reconcile<S: SheetStore + ?Sized>(&self, store: &S, sample: &Record) -> Result<SchemaReport> {
        let current = store.get_headers().await?;
        let report = self.plan(current.as_slice(), sample);
        self.apply(store, &report).await?;
        Ok(report)
    }
}

/// Plan with the default layout.
pub fn reconcile_schema<S: AsRef<str>>(current_headers: &[S], sample_record: &Record) -> SchemaReport {
    SchemaReconciler::default().plan(current_headers, sample_record)
}

/// Header row for an empty store: the sample's keys, then the date column.
pub fn initial_headers(sample: &Record, date_column: &str) -> HeaderRow {
    let mut headers = HeaderRow::new(&sample.keys().filter(|k| !k.trim().is_empty()).collect::<Vec<_>>());
    if !headers.is_empty() && !headers.contains_field(date_column) {
        headers.push(date_column);
    }
    headers
}

/// Sample fields with no equivalent column in `headers`.
pub fn unmapped_fields(sample: &Record, headers: &HeaderRow) -> Vec<String> {
    sample
        .keys()
        .filter(|k| !k.trim().is_empty())
        .filter(|k| !headers.contains_field(k))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemorySheet;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_store_creates_headers_from_sample() {
        let sample = Record::new().with("Nom", "A").with("Lien", "https://a");
        let report = reconcile_schema(&[] as &[&str], &sample);

        let expected = row(&["Nom", "Lien", "Date Ajout"]);
        assert_eq!(report.headers.as_slice(), expected.as_slice());
        assert_eq!(report.actions, vec![HeaderAction::Create(expected)]);
        assert!(report.unmapped.is_empty());
    }

    #[test]
    fn test_unmapped_field_reported_without_mutation() {
        let sample = Record::new().with("Nom", "A").with("Résumé", "x");
        let report = reconcile_schema(&["Nom", "Lien"], &sample);

        assert!(report.is_noop());
        assert_eq!(report.unmapped, vec!["Résumé".to_string()]);
    }

    #[test]
    fn test_spelling_variants_are_mapped() {
        let sample = Record::new().with("résumé", "x").with("NOM", "A");
        let report = reconcile_schema(&["Nom", "Résumé"], &sample);
        assert!(report.unmapped.is_empty());
    }

    #[test]
    fn test_canonical_policy_renames_and_extends() {
        let layout = SheetLayout::french().with_header_policy(HeaderPolicy::Canonical);
        let reconciler = SchemaReconciler::new(layout.clone());
        let report = reconciler.plan(&["nom", "Organization", "Pays"], &Record::new().with("Nom", "A"));

        // "nom" is the same field as "Nom" and stays as written
        assert_eq!(
            report.actions[0],
            HeaderAction::Rename {
                column: 1,
                from: "Organization".to_string(),
                to: "Organisme".to_string(),
            }
        );
        match &report.actions[1] {
            HeaderAction::Extend { added, row } => {
                assert_eq!(added.first().map(String::as_str), Some("Deadline"));
                assert_eq!(row.len(), layout.canonical.len());
            }
            other => panic!("expected Extend, got {:?}", other),
        }
        assert_eq!(report.headers.len(), layout.canonical.len());
    }

    #[tokio::test]
    async fn test_apply_against_store() {
        let store = MemorySheet::new();
        let reconciler = SchemaReconciler::default();
        let sample = Record::new().with("Nom", "A").with("Lien", "https://a");

        let report = reconciler.reconcile(&store, &sample).await.unwrap();
        assert_eq!(report.actions.len(), 1);
        assert_eq!(store.rows(), vec![row(&["Nom", "Lien", "Date Ajout"])]);

        // Second pass sees a populated header row and leaves it alone
        let report = reconciler.reconcile(&store, &sample).await.unwrap();
        assert!(report.is_noop());
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_apply_canonical_updates_cells() {
        let store = MemorySheet::with_rows(vec![row(&["Nom", "Org"])]);
        let layout = SheetLayout::french().with_header_policy(HeaderPolicy::Canonical);
        let reconciler = SchemaReconciler::new(layout.clone());

        reconciler.reconcile(&store, &Record::new().with("Nom", "A")).await.unwrap();

        let headers = store.rows()[0].clone();
        assert_eq!(headers, layout.canonical);
    }
}
