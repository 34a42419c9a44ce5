//! Legacy image URL backfill for Vitrine.
//!
//! One-time, operator-invoked utility: takes a JSON export of parent
//! records (stores, products) and rewrites legacy absolute image URLs to
//! the normalized public form wherever an object key can be extracted.
//! Entries that cannot be rewritten are left untouched and logged. Safe to
//! re-run: a second pass changes nothing.
//!
//! Usage:
//!   migrator <records.json>

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_core::migrate::{ParentRecord, ParentRecordStore, backfill_legacy_urls};
use vitrine_core::storage::{ObjectStore, StorageConfig, StorageProvider};
use vitrine_shared::AppConfig;

/// Record store backed by a JSON file export of the relational layer.
struct JsonFileStore {
    records: Mutex<Vec<ParentRecord>>,
}

impl JsonFileStore {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let records: Vec<ParentRecord> =
            serde_json::from_str(&data).context("records file is not a JSON array of records")?;
        Ok(Self {
            records: Mutex::new(records),
        })
    }

    fn save(&self, path: &Path) -> anyhow::Result<()> {
        let records = self.records.lock().expect("records lock");
        let data = serde_json::to_string_pretty(&*records)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

impl ParentRecordStore for JsonFileStore {
    type Error = std::io::Error;

    async fn scan(&self) -> Result<Vec<ParentRecord>, Self::Error> {
        Ok(self.records.lock().expect("records lock").clone())
    }

    async fn update(&self, record: &ParentRecord) -> Result<(), Self::Error> {
        let mut records = self.records.lock().expect("records lock");
        if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
            *existing = record.clone();
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .context("usage: migrator <records.json>")?
        .into();

    // Same configuration surface as the server; only the public domain is
    // actually used here (rewriting is pure string work, no bucket I/O).
    let config = AppConfig::load().context("failed to load configuration")?;
    let provider = StorageProvider::r2(
        &config.storage.account_id,
        config.storage.bucket.clone(),
        config.storage.access_key_id.clone(),
        config.storage.secret_access_key.clone(),
    );
    let store = ObjectStore::from_config(StorageConfig::new(
        provider,
        config.storage.public_domain.clone(),
    ))
    .context("failed to initialize object store client")?;

    let records = JsonFileStore::load(&path)?;
    let report = backfill_legacy_urls(&records, &store).await?;
    records.save(&path)?;

    info!(
        scanned = report.scanned,
        rewritten = report.rewritten,
        skipped = report.skipped,
        "backfill finished, records written back to {}",
        path.display()
    );

    Ok(())
}
