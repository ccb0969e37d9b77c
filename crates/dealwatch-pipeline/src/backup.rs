//! Best-effort JSON copy of each platform's collection on disk.
//!
//! Written after every successful store replace and read back once at
//! startup. Never consulted while the process is serving.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dealwatch_core::{DealRecord, Platform};
use dealwatch_scraper::{validate, CandidateRecord};
use tempfile::NamedTempFile;
use tokio::task::JoinHandle;

use crate::store::DealStore;
use crate::BackupError;

/// Writes `<dir>/<platform>_deals.json` atomically.
///
/// Writes for one platform are sequenced: each call takes a ticket when it is
/// made, and a write whose ticket is older than the last one written for the
/// platform is skipped, so a slow write can never overwrite a newer backup.
#[derive(Debug, Clone)]
pub struct BackupWriter {
    dir: PathBuf,
    tickets: Arc<AtomicU64>,
    slots: Arc<Mutex<HashMap<Platform, Slot>>>,
}

/// Last ticket written for a platform.
type Slot = Arc<tokio::sync::Mutex<u64>>;

impl BackupWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tickets: Arc::new(AtomicU64::new(0)),
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn path_for(&self, platform: Platform) -> PathBuf {
        backup_path(&self.dir, platform)
    }

    /// Writes `deals` on the blocking pool.
    ///
    /// Returns `Ok(None)` when a newer write for the same platform landed
    /// first and this one was dropped.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError`] when serialization, the temp-file write, or
    /// the final rename fails.
    pub async fn write(
        &self,
        platform: Platform,
        deals: Arc<[DealRecord]>,
    ) -> Result<Option<PathBuf>, BackupError> {
        let ticket = self.next_ticket();
        self.write_in_order(platform, deals, ticket).await
    }

    /// Fire-and-forget variant of [`write`](Self::write). Failures are logged.
    ///
    /// The ticket is taken before spawning, so call order decides which
    /// collection ends up on disk.
    pub fn spawn_write(&self, platform: Platform, deals: Arc<[DealRecord]>) -> JoinHandle<()> {
        let writer = self.clone();
        let ticket = self.next_ticket();
        tokio::spawn(async move {
            let count = deals.len();
            match writer.write_in_order(platform, deals, ticket).await {
                Ok(Some(path)) => tracing::debug!(
                    %platform,
                    count,
                    path = %path.display(),
                    "deal backup written"
                ),
                Ok(None) => tracing::debug!(%platform, ticket, "stale deal backup skipped"),
                Err(e) => tracing::warn!(%platform, error = %e, "deal backup failed"),
            }
        })
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn slot_for(&self, platform: Platform) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(platform).or_default())
    }

    async fn write_in_order(
        &self,
        platform: Platform,
        deals: Arc<[DealRecord]>,
        ticket: u64,
    ) -> Result<Option<PathBuf>, BackupError> {
        let slot = self.slot_for(platform);
        let mut last = slot.lock().await;
        if *last > ticket {
            return Ok(None);
        }
        *last = ticket;

        let dir = self.dir.clone();
        let path = self.path_for(platform);
        tokio::task::spawn_blocking(move || -> Result<Option<PathBuf>, BackupError> {
            let json = serde_json::to_vec_pretty(&*deals)?;
            write_atomic(&dir, &path, &json)?;
            Ok(Some(path))
        })
        .await?
    }
}

fn backup_path(dir: &Path, platform: Platform) -> PathBuf {
    dir.join(format!("{platform}_deals.json"))
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), BackupError> {
    let io_err = |source| BackupError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Loads every platform's backup from `dir` into `store`.
///
/// Each record passes through the validator again, so a hand-edited or stale
/// file cannot put an invalid deal in the store. Missing files are skipped
/// quietly; unreadable or malformed ones are logged and skipped.
///
/// Returns the number of records restored.
pub fn restore_backups(dir: &Path, store: &DealStore) -> usize {
    let mut restored = 0;
    for platform in Platform::ALL {
        let path = backup_path(dir, platform);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(
                    %platform,
                    path = %path.display(),
                    error = %e,
                    "cannot read deal backup"
                );
                continue;
            }
        };
        let records: Vec<DealRecord> = match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    %platform,
                    path = %path.display(),
                    error = %e,
                    "malformed deal backup"
                );
                continue;
            }
        };

        let total = records.len();
        let deals: Vec<DealRecord> = records
            .into_iter()
            .filter(|r| r.platform == platform)
            .filter_map(|r| validate(CandidateRecord::from(r)).ok())
            .collect();
        if deals.len() < total {
            tracing::warn!(
                %platform,
                dropped = total - deals.len(),
                "backup records failed validation"
            );
        }

        tracing::info!(%platform, count = deals.len(), "restored deals from backup");
        restored += deals.len();
        store.replace(platform, deals);
    }
    restored
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::*;

    fn deal(platform: Platform, title: &str, original: i64, discounted: i64) -> DealRecord {
        let mut c = CandidateRecord::new(platform, "https://example.test/deals");
        c.title = Some(title.to_owned());
        c.original_price = Some(Decimal::from(original));
        c.discounted_price = Some(Decimal::from(discounted));
        validate(c).unwrap()
    }

    #[tokio::test]
    async fn write_then_restore_round_trips() {
        let dir = TempDir::new().unwrap();
        let writer = BackupWriter::new(dir.path());
        let deals: Arc<[DealRecord]> = Arc::from(vec![
            deal(Platform::Amazon, "Earbuds", 100, 60),
            deal(Platform::Amazon, "Watch", 300, 200),
        ]);

        let path = writer.write(Platform::Amazon, Arc::clone(&deals)).await.unwrap();
        assert_eq!(path, Some(dir.path().join("amazon_deals.json")));

        let store = DealStore::new();
        assert_eq!(restore_backups(dir.path(), &store), 2);
        assert_eq!(&*store.read(Platform::Amazon), &*deals);
        assert!(store.read(Platform::Noon).is_empty());
    }

    #[tokio::test]
    async fn write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("data");
        let writer = BackupWriter::new(&nested);

        writer
            .write(Platform::Noon, Arc::from(Vec::new()))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(nested.join("noon_deals.json")).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[tokio::test]
    async fn older_write_never_replaces_newer_backup() {
        let dir = TempDir::new().unwrap();
        let writer = BackupWriter::new(dir.path());
        let older = writer.next_ticket();
        let newer = writer.next_ticket();
        let fresh: Arc<[DealRecord]> = Arc::from(vec![deal(Platform::Amazon, "Fresh", 100, 60)]);
        let stale: Arc<[DealRecord]> = Arc::from(vec![deal(Platform::Amazon, "Stale", 100, 60)]);

        let written = writer
            .write_in_order(Platform::Amazon, Arc::clone(&fresh), newer)
            .await
            .unwrap();
        let skipped = writer
            .write_in_order(Platform::Amazon, stale, older)
            .await
            .unwrap();

        assert!(written.is_some());
        assert!(skipped.is_none());
        let store = DealStore::new();
        restore_backups(dir.path(), &store);
        assert_eq!(&*store.read(Platform::Amazon), &*fresh);
    }

    #[tokio::test]
    async fn platforms_are_sequenced_independently() {
        let dir = TempDir::new().unwrap();
        let writer = BackupWriter::new(dir.path());
        let noon = writer.next_ticket();
        let amazon = writer.next_ticket();

        writer
            .write_in_order(Platform::Amazon, Arc::from(Vec::new()), amazon)
            .await
            .unwrap();
        let written = writer
            .write_in_order(Platform::Noon, Arc::from(Vec::new()), noon)
            .await
            .unwrap();

        assert!(written.is_some());
    }

    #[test]
    fn restore_skips_missing_and_malformed_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("noon_deals.json"), "{ not json").unwrap();

        let store = DealStore::new();
        assert_eq!(restore_backups(dir.path(), &store), 0);
        assert!(store.read(Platform::Amazon).is_empty());
        assert!(store.read(Platform::Noon).is_empty());
    }

    #[test]
    fn restore_drops_records_that_fail_validation() {
        let dir = TempDir::new().unwrap();
        let good = deal(Platform::Amazon, "Good", 100, 50);
        let mut bad = deal(Platform::Amazon, "Bad", 100, 50);
        bad.discounted_price = Decimal::from(150);
        let json = serde_json::to_string(&vec![good.clone(), bad]).unwrap();
        std::fs::write(dir.path().join("amazon_deals.json"), json).unwrap();

        let store = DealStore::new();
        assert_eq!(restore_backups(dir.path(), &store), 1);
        assert_eq!(&*store.read(Platform::Amazon), &[good][..]);
    }
}
