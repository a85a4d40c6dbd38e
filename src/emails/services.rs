use anyhow::Context;
use tracing::{debug, info};

use crate::{
    csv,
    emails::repo::EmailStore,
    validation::{validate_add_entry, without_empty, AddEntry, FormFields},
};

const UTF8_BOM: char = '\u{feff}';

/// Outcome of a CSV import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub applied: usize,
    pub skipped: usize,
}

/// Validates decoded rows, keeping the valid entries in input order.
/// Returns the entries and how many rows were dropped.
pub fn collect_valid(rows: Vec<FormFields>) -> (Vec<AddEntry>, usize) {
    let total = rows.len();
    let entries: Vec<AddEntry> = rows
        .into_iter()
        .filter_map(|row| validate_add_entry(&without_empty(row)).ok())
        .collect();
    let skipped = total - entries.len();
    (entries, skipped)
}

/// Applies entries one by one, in order. The first failure stops the batch;
/// entries already applied stay committed.
pub async fn upsert_all(store: &dyn EmailStore, entries: &[AddEntry]) -> anyhow::Result<usize> {
    for (i, entry) in entries.iter().enumerate() {
        store
            .upsert(entry)
            .await
            .with_context(|| format!("upsert entry {} of {} ({})", i + 1, entries.len(), entry.email))?;
    }
    Ok(entries.len())
}

/// Decodes an uploaded CSV, drops invalid rows and upserts the rest.
pub async fn import_csv(store: &dyn EmailStore, text: &str) -> anyhow::Result<ImportSummary> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let rows = csv::decode(text);
    debug!(rows = rows.len(), "csv decoded");

    let (entries, skipped) = collect_valid(rows);
    let applied = upsert_all(store, &entries).await?;

    info!(applied, skipped, "csv import finished");
    Ok(ImportSummary { applied, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emails::repo_types::EmailFilter;
    use crate::testing::MemoryEmailStore;

    fn entry(email: &str, name: Option<&str>, reg: Option<&str>) -> AddEntry {
        AddEntry {
            email: email.into(),
            name: name.map(Into::into),
            registration_number: reg.map(Into::into),
        }
    }

    #[tokio::test]
    async fn second_upsert_updates_and_keeps_created_at() {
        let store = MemoryEmailStore::default();
        let first = store.upsert(&entry("a@b.com", Some("Alice"), None)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.upsert(&entry("a@b.com", Some("Alicia"), None)).await.unwrap();

        assert_eq!(store.count(&EmailFilter::default()).await.unwrap(), 1);
        assert_eq!(second.name.as_deref(), Some("Alicia"));
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn absent_fields_keep_stored_values() {
        let store = MemoryEmailStore::default();
        store
            .upsert(&entry("a@b.com", Some("Alice"), Some("RA1")))
            .await
            .unwrap();
        let updated = store.upsert(&entry("a@b.com", None, Some("RA2"))).await.unwrap();
        assert_eq!(updated.name.as_deref(), Some("Alice"));
        assert_eq!(updated.registration_number.as_deref(), Some("RA2"));
    }

    #[tokio::test]
    async fn later_duplicates_in_a_batch_win() {
        let store = MemoryEmailStore::default();
        let batch = vec![
            entry("a@b.com", Some("First"), None),
            entry("c@d.com", Some("Carl"), None),
            entry("a@b.com", Some("Last"), None),
        ];
        assert_eq!(upsert_all(&store, &batch).await.unwrap(), 3);
        let all = store.snapshot();
        assert_eq!(all.len(), 2);
        let a = all.iter().find(|r| r.email == "a@b.com").unwrap();
        assert_eq!(a.name.as_deref(), Some("Last"));
    }

    #[tokio::test]
    async fn failure_aborts_batch_without_rollback() {
        let store = MemoryEmailStore::failing_after(2);
        let batch = vec![
            entry("one@x.io", None, None),
            entry("two@x.io", None, None),
            entry("three@x.io", None, None),
            entry("four@x.io", None, None),
        ];
        let err = upsert_all(&store, &batch).await.unwrap_err();
        assert!(format!("{err:#}").contains("three@x.io"));

        let emails: Vec<String> = store.snapshot().into_iter().map(|r| r.email).collect();
        assert_eq!(emails, vec!["one@x.io", "two@x.io"]);
    }

    #[test]
    fn collect_valid_drops_bad_rows_silently() {
        let rows = csv::decode(
            "email,name,registrationNumber\n\
             a@b.com,Alice,RA1\n\
             not-an-email,Bob,RA2\n\
             c@d.com,,\n\
             e@f.com,Eve,XX9",
        );
        let (entries, skipped) = collect_valid(rows);
        assert_eq!(skipped, 2);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], entry("a@b.com", Some("Alice"), Some("RA1")));
        assert_eq!(entries[1], entry("c@d.com", None, None));
    }

    #[tokio::test]
    async fn import_strips_bom_and_reports_counts() {
        let store = MemoryEmailStore::default();
        let summary = import_csv(&store, "\u{feff}email,name\na@b.com,Alice\nbad,Bob\n")
            .await
            .unwrap();
        assert_eq!(summary, ImportSummary { applied: 1, skipped: 1 });
        assert_eq!(store.snapshot()[0].name.as_deref(), Some("Alice"));
    }
}
