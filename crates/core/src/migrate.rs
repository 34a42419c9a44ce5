//! Offline backfill of legacy absolute-URL references.
//!
//! Before the key-based scheme, parent entities stored complete URLs
//! (often expired signed URLs from the previous bucket). This one-time,
//! operator-invoked pass extracts the object key out of each legacy URL
//! where possible and rewrites the stored value to the normalized public
//! form. Entries whose key cannot be extracted are left untouched and
//! logged. Running the pass twice is a no-op: a normalized URL extracts
//! back to the same key.
//!
//! The relational layer stays an external collaborator: the pass works
//! against the [`ParentRecordStore`] trait, records keyed by opaque IDs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::naming::UPLOAD_PREFIX;
use crate::storage::ObjectStore;

/// One parent entity (store or product) as seen by the migration pass:
/// an opaque ID plus its image reference fields, keyed by field name
/// (e.g. `logo`, `banner`, `main_image`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRecord {
    /// Opaque record identifier.
    pub id: String,
    /// Image reference fields by name. Values may be keys, legacy URLs,
    /// or empty.
    pub images: BTreeMap<String, String>,
}

/// Counters for one backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records scanned.
    pub scanned: usize,
    /// Field values rewritten to the normalized public form.
    pub rewritten: usize,
    /// Legacy URLs whose key could not be extracted (left untouched).
    pub skipped: usize,
}

/// Access to parent records in the relational layer.
///
/// Implemented outside this crate; the migrator binary ships a JSON-file
/// implementation for operating on exported records.
pub trait ParentRecordStore: Send + Sync {
    /// Store-side error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every parent record.
    fn scan(&self)
    -> impl std::future::Future<Output = Result<Vec<ParentRecord>, Self::Error>> + Send;

    /// Persist an updated record.
    fn update(
        &self,
        record: &ParentRecord,
    ) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}

/// Extract an object key from a legacy absolute URL.
///
/// The URL's path (minus its leading slash) is taken as the key, provided
/// it contains the fixed upload prefix; anything else is not one of ours
/// and yields `None`. Query strings and fragments (stale signatures) are
/// discarded with the rest of the URL.
#[must_use]
pub fn extract_key_from_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let key = parsed.path().trim_start_matches('/');

    if key.contains(&format!("{UPLOAD_PREFIX}/")) {
        Some(key.to_string())
    } else {
        None
    }
}

/// Compute the rewritten value for one stored reference, if any.
///
/// Only legacy absolute URLs with an extractable key are rewritten (to the
/// normalized public form). Keys, empty values, and unextractable URLs
/// yield `None` - no change. Idempotent: a normalized URL rewrites to
/// itself, which callers treat as no change.
#[must_use]
pub fn rewrite_reference(value: &str, store: &ObjectStore) -> Option<String> {
    if value.is_empty() || !value.starts_with("http") {
        return None;
    }

    let key = extract_key_from_url(value)?;
    let normalized = store.public_url(&key);

    if normalized == value {
        None
    } else {
        Some(normalized)
    }
}

/// Run the backfill over every parent record.
///
/// Best-effort per field: unextractable URLs are logged and skipped; only
/// records that actually changed are written back.
///
/// # Errors
///
/// Returns the record store's error if scanning or updating fails.
pub async fn backfill_legacy_urls<S: ParentRecordStore>(
    records: &S,
    store: &ObjectStore,
) -> Result<MigrationReport, S::Error> {
    let mut report = MigrationReport::default();

    for mut record in records.scan().await? {
        report.scanned += 1;
        let mut changed = false;

        for (field, value) in &mut record.images {
            if let Some(rewritten) = rewrite_reference(value, store) {
                info!(
                    record_id = %record.id,
                    field = %field,
                    "rewriting legacy URL to normalized public form"
                );
                *value = rewritten;
                changed = true;
                report.rewritten += 1;
            } else if value.starts_with("http") && extract_key_from_url(value).is_none() {
                warn!(
                    record_id = %record.id,
                    field = %field,
                    url = %value,
                    "could not extract key from legacy URL, leaving untouched"
                );
                report.skipped += 1;
            }
        }

        if changed {
            records.update(&record).await?;
        }
    }

    info!(
        scanned = report.scanned,
        rewritten = report.rewritten,
        skipped = report.skipped,
        "legacy URL backfill complete"
    );

    Ok(report)
}
