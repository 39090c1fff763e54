use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use pulse_core::{DurableStats, Point, merge_points};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::CacheError;

const SERIES_SUBDIR: &str = "series";
const RECORD_EXT: &str = "csv";

/// Durable tier: one `date,value` CSV record per series under `{root}/series/`.
///
/// Records hold the full known history of a series. Writes go to a sibling
/// temp file and are renamed into place, so a reader sees either the old or
/// the new record, never a partial one. Writers of the same series are
/// serialized, and each write uses its own temp file.
pub struct DurableCache {
    dir: PathBuf,
    ttl: Duration,
    disabled: AtomicBool,
    read_failures: AtomicU64,
    write_failures: AtomicU64,
    write_seq: AtomicU64,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DurableCache {
    /// Create a tier rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl AsRef<Path>, ttl: Duration, disabled: bool) -> Self {
        Self {
            dir: root.as_ref().join(SERIES_SUBDIR),
            ttl,
            disabled: AtomicBool::new(disabled),
            read_failures: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            write_seq: AtomicU64::new(0),
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_series(&self, series_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(series_id.to_ascii_uppercase()).or_default())
        };
        lock.lock_owned().await
    }

    fn record_path(&self, series_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{RECORD_EXT}", series_id.to_ascii_uppercase()))
    }

    fn is_fresh(&self, modified: SystemTime) -> bool {
        // A modification time in the future counts as age zero.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age < self.ttl
    }

    /// True iff a record exists and was last written less than TTL ago.
    pub async fn is_valid(&self, series_id: &str) -> bool {
        if self.is_disabled() {
            return false;
        }
        match tokio::fs::metadata(self.record_path(series_id)).await {
            Ok(meta) => meta.modified().is_ok_and(|m| self.is_fresh(m)),
            Err(_) => false,
        }
    }

    /// Full stored history, or `None` when missing, unreadable or corrupt.
    ///
    /// Freshness is not checked here; pair with [`DurableCache::is_valid`].
    pub async fn read(&self, series_id: &str) -> Option<Vec<Point>> {
        if self.is_disabled() {
            return None;
        }
        let path = self.record_path(series_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                self.record_read_failure(&CacheError::io(&path, e));
                return None;
            }
        };
        match decode(&bytes) {
            Ok(points) => Some(points),
            Err(e) => {
                self.record_read_failure(&CacheError::csv(&path, e));
                None
            }
        }
    }

    /// Replace the full record for `series_id`. No-op while disabled.
    ///
    /// Failures are counted and logged, never returned.
    pub async fn write(&self, series_id: &str, points: &[Point]) {
        if self.is_disabled() {
            return;
        }
        let _guard = self.lock_series(series_id).await;
        self.write_locked(series_id, points).await;
    }

    /// Union `incoming` into the stored record by date and write the result.
    ///
    /// The record is re-read under the series lock, so concurrent merges of the
    /// same series each see the other's dates and no stored date is dropped.
    /// Incoming values win on shared dates. A missing or corrupt record merges
    /// as empty. No-op while disabled.
    pub async fn merge_write(&self, series_id: &str, incoming: &[Point]) {
        if self.is_disabled() {
            return;
        }
        let _guard = self.lock_series(series_id).await;
        let stored = self.read(series_id).await.unwrap_or_default();
        let merged = merge_points(&stored, incoming);
        self.write_locked(series_id, &merged).await;
    }

    async fn write_locked(&self, series_id: &str, points: &[Point]) {
        if let Err(e) = self.try_write(series_id, points).await {
            self.write_failures.fetch_add(1, Ordering::Relaxed);
            #[cfg(feature = "tracing")]
            tracing::warn!(series_id, error = %e, "durable cache write failed");
            #[cfg(not(feature = "tracing"))]
            let _ = e;
        }
    }

    async fn try_write(&self, series_id: &str, points: &[Point]) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::io(&self.dir, e))?;
        let path = self.record_path(series_id);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{RECORD_EXT}.{}-{seq}.tmp", std::process::id()));
        let body = encode(points).map_err(|e| CacheError::csv(&path, e))?;
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| CacheError::io(&tmp, e))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(CacheError::io(&path, e));
        }
        Ok(())
    }

    /// Delete one record, or every record when `series_id` is `None`.
    ///
    /// Returns the number of records deleted. Runs regardless of bypass mode.
    pub async fn clear(&self, series_id: Option<&str>) -> usize {
        if let Some(id) = series_id {
            return usize::from(tokio::fs::remove_file(self.record_path(id)).await.is_ok());
        }
        let mut count = 0;
        for path in self.record_paths().await {
            if tokio::fs::remove_file(&path).await.is_ok() {
                count += 1;
            }
        }
        count
    }

    async fn record_paths(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return out;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXT) {
                out.push(path);
            }
        }
        out
    }

    /// Toggle bypass mode. Records on disk are kept.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::Relaxed);
    }

    /// Whether bypass mode is active.
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// File counts, sizes and failure counters.
    pub async fn stats(&self) -> DurableStats {
        let mut total_files = 0;
        let mut valid_files = 0;
        let mut total_size_bytes = 0;
        for path in self.record_paths().await {
            let Ok(meta) = tokio::fs::metadata(&path).await else {
                continue;
            };
            total_files += 1;
            total_size_bytes += meta.len();
            if meta.modified().is_ok_and(|m| self.is_fresh(m)) {
                valid_files += 1;
            }
        }
        DurableStats {
            total_files,
            valid_files,
            total_size_bytes,
            ttl_seconds: self.ttl.as_secs(),
            cache_dir: self.dir.clone(),
            disabled: self.is_disabled(),
            read_failures: self.read_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }

    fn record_read_failure(&self, err: &CacheError) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "tracing")]
        tracing::warn!(error = %err, "durable cache read failed; treating as miss");
        #[cfg(not(feature = "tracing"))]
        let _ = err;
    }
}

fn encode(points: &[Point]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for p in points {
        wtr.serialize(p)?;
    }
    // An empty record still carries its header.
    if points.is_empty() {
        wtr.write_record(["date", "value"])?;
    }
    wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))
}

fn decode(bytes: &[u8]) -> Result<Vec<Point>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(bytes);
    rdr.deserialize().collect()
}
