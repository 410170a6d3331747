//! # File-Backed Scan Store
//!
//! Durable JSON-lines append log.
//!
//! ## Format
//!
//! One [`ScanRecord`] per line, serialized with `serde_json`:
//!
//! ```text
//! {"record_id":0,"identifier":"A1","timestamp":"2024-05-01T09:00:00Z","outcome":"granted"}
//! {"record_id":1,"identifier":"A1","timestamp":"2024-05-01T09:00:04Z","outcome":"denied_duplicate"}
//! ```
//!
//! ## Durability
//!
//! A record is appended and `sync_data`ed before the in-memory ledger sees
//! it. A failed write truncates the log back to its previous length and leaves
//! the ledger untouched, so an `Error` decision persists nothing. If that
//! truncate fails too, the store refuses every further call.
//!
//! On open, bytes after the last newline are a torn write from a crash and
//! are cut off before anything is appended. A corrupt complete line refuses
//! the open: skipping it could drop a grant.
//!
//! ## Blocking I/O
//!
//! File work and the ledger lock run on the blocking pool, so a stalled disk
//! never pins an async worker and callers' timeouts still fire.
//!
//! ## Single writer
//!
//! The log file is held under an exclusive `fs2` lock for the lifetime of the
//! store. A second process opening the same path gets
//! [`StoreError::Unavailable`].

use async_trait::async_trait;
use fs2::FileExt;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::adapters::clock::SystemTimeSource;
use crate::domain::{CommitResult, Identifier, RecordOutcome, ScanLedger, ScanRecord, StoreError};
use crate::ports::{ScanStore, TimeSource};

struct LogState {
    ledger: ScanLedger,
    file: File,
    /// Set when the log on disk can no longer be trusted to match the ledger.
    failed: Option<String>,
}

impl LogState {
    fn ensure_usable(&self) -> Result<(), StoreError> {
        match &self.failed {
            Some(reason) => Err(StoreError::unavailable(format!(
                "scan log disabled: {}",
                reason
            ))),
            None => Ok(()),
        }
    }

    /// Append one record and flush it to disk.
    fn append(&mut self, record: &ScanRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let previous_len = self.file.metadata()?.len();
        let written = self
            .file
            .write_all(&line)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = written {
            warn!("[scan-gate] Scan log append failed: {}", e);
            // Drop any partial line so the next append starts clean.
            if let Err(truncate) = self.file.set_len(previous_len) {
                error!(
                    "[scan-gate] Scan log rollback failed, disabling store: {}",
                    truncate
                );
                self.failed = Some(format!("rollback after failed append: {}", truncate));
            }
            return Err(e.into());
        }
        Ok(())
    }
}

impl Drop for LogState {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Append-log scan store.
pub struct FileScanStore {
    path: PathBuf,
    state: Arc<Mutex<LogState>>,
    clock: Arc<dyn TimeSource>,
}

impl FileScanStore {
    /// Open (or create) the log at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_clock(path, Arc::new(SystemTimeSource))
    }

    /// Open with a custom clock.
    pub fn open_with_clock<P: AsRef<Path>>(
        path: P,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        file.try_lock_exclusive().map_err(|_| {
            StoreError::unavailable(format!(
                "scan log already in use by another process ({})",
                path.display()
            ))
        })?;

        let ledger = Self::replay(&mut file, &path)?;
        info!(
            "[scan-gate] Opened scan log {} with {} records",
            path.display(),
            ledger.len()
        );

        Ok(Self {
            path,
            state: Arc::new(Mutex::new(LogState {
                ledger,
                file,
                failed: None,
            })),
            clock,
        })
    }

    /// Log location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.state.lock().ledger.len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.state.lock().ledger.is_empty()
    }

    /// Distinct identifiers holding a grant, replayed ones included.
    pub fn granted_identifiers(&self) -> usize {
        self.state.lock().ledger.granted_identifiers()
    }

    fn replay(file: &mut File, path: &Path) -> Result<ScanLedger, StoreError> {
        let mut bytes = Vec::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_end(&mut bytes)?;

        let complete = bytes
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |idx| idx + 1);
        if complete < bytes.len() {
            warn!(
                "[scan-gate] Cutting {} bytes of torn write from the end of {}",
                bytes.len() - complete,
                path.display()
            );
            file.set_len(complete as u64)?;
            file.sync_data()?;
        }

        let mut ledger = ScanLedger::new();
        for (line_no, line) in bytes[..complete].split(|&b| b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record: ScanRecord = serde_json::from_slice(line).map_err(|e| {
                StoreError::unavailable(format!(
                    "corrupt record at {}:{}: {}",
                    path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            if !ledger.apply(record) {
                warn!(
                    "[scan-gate] Duplicate grant at {}:{} ignored for indexing",
                    path.display(),
                    line_no + 1
                );
            }
        }

        Ok(ledger)
    }

    /// Run `op` under the state lock on the blocking pool.
    async fn with_state<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut LogState, &dyn TimeSource) -> Result<T, StoreError> + Send + 'static,
    {
        let state = self.state.clone();
        let clock = self.clock.clone();
        tokio::task::spawn_blocking(move || {
            let mut state = state.lock();
            state.ensure_usable()?;
            op(&mut *state, clock.as_ref())
        })
        .await
        .map_err(|e| StoreError::unavailable(format!("scan log task failed: {}", e)))?
    }
}

#[async_trait]
impl ScanStore for FileScanStore {
    async fn has_granted_record(&self, identifier: &Identifier) -> Result<bool, StoreError> {
        let identifier = identifier.clone();
        self.with_state(move |state, _| Ok(state.ledger.has_granted(&identifier)))
            .await
    }

    async fn commit(
        &self,
        identifier: &Identifier,
        outcome: RecordOutcome,
    ) -> Result<ScanRecord, StoreError> {
        let identifier = identifier.clone();
        self.with_state(move |state, clock| {
            let record = state
                .ledger
                .prepare_unconditional(&identifier, outcome, clock.now())?;
            state.append(&record)?;
            state.ledger.apply(record.clone());
            Ok(record)
        })
        .await
    }

    async fn commit_if_not_granted(
        &self,
        identifier: &Identifier,
        proposed: RecordOutcome,
    ) -> Result<CommitResult, StoreError> {
        let identifier = identifier.clone();
        self.with_state(move |state, clock| {
            let pending = state
                .ledger
                .prepare_conditional(&identifier, proposed, clock.now());
            state.append(&pending.record)?;
            state.ledger.apply(pending.record.clone());
            debug!(
                "[scan-gate] scan log committed {} as {} (record {})",
                identifier, pending.record.outcome, pending.record.record_id
            );
            Ok(pending.into_result())
        })
        .await
    }

    async fn recent(&self, max_count: usize) -> Result<Vec<ScanRecord>, StoreError> {
        self.with_state(move |state, _| Ok(state.ledger.recent(max_count)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn id(s: &str) -> Identifier {
        Identifier::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");

        {
            let store = FileScanStore::open(&path).unwrap();
            store
                .commit_if_not_granted(&id("A1"), RecordOutcome::Granted)
                .await
                .unwrap();
            store
                .commit_if_not_granted(&id("B9"), RecordOutcome::DeniedInvalid)
                .await
                .unwrap();
        }

        let store = FileScanStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.granted_identifiers(), 1);
        assert!(store.has_granted_record(&id("A1")).await.unwrap());

        let again = store
            .commit_if_not_granted(&id("A1"), RecordOutcome::Granted)
            .await
            .unwrap();
        match again {
            CommitResult::AlreadyGranted { prior, recorded } => {
                assert_eq!(prior.record_id.0, 0);
                assert_eq!(recorded.record_id.0, 2);
            }
            other => panic!("expected AlreadyGranted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data/scans.jsonl");
        let store = FileScanStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(path.exists());
    }

    const GRANTED_A1: &str =
        r#"{"record_id":0,"identifier":"A1","timestamp":"2024-05-01T09:00:00Z","outcome":"granted"}"#;

    #[tokio::test]
    async fn test_corrupt_line_refuses_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        std::fs::write(
            &path,
            format!(
                "{}\n{{not json\n{}\n",
                GRANTED_A1,
                r#"{"record_id":1,"identifier":"B9","timestamp":"2024-05-01T09:00:05Z","outcome":"denied_invalid"}"#
            ),
        )
        .unwrap();

        match FileScanStore::open(&path) {
            Err(StoreError::Unavailable { message }) => assert!(message.contains(":2:")),
            Err(other) => panic!("expected Unavailable, got {:?}", other),
            Ok(_) => panic!("expected the corrupt log to be refused"),
        }

        // Refusing leaves the file as it was.
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.contains("{not json"));
    }

    #[tokio::test]
    async fn test_blank_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        std::fs::write(&path, format!("{}\n\n  \n", GRANTED_A1)).unwrap();

        let store = FileScanStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.has_granted_record(&id("A1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_torn_tail_is_cut_before_next_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        std::fs::write(
            &path,
            format!("{}\n{}", GRANTED_A1, r#"{"record_id":1,"identif"#),
        )
        .unwrap();

        {
            let store = FileScanStore::open(&path).unwrap();
            assert_eq!(store.len(), 1);
            let result = store
                .commit_if_not_granted(&id("A2"), RecordOutcome::Granted)
                .await
                .unwrap();
            assert!(matches!(result, CommitResult::Committed(_)));
        }

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert!(on_disk.ends_with('\n'));
        for line in on_disk.lines() {
            serde_json::from_str::<ScanRecord>(line).unwrap();
        }

        let store = FileScanStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.has_granted_record(&id("A2")).await.unwrap());

        let again = store
            .commit_if_not_granted(&id("A2"), RecordOutcome::Granted)
            .await
            .unwrap();
        assert!(matches!(again, CommitResult::AlreadyGranted { .. }));

        let ids: Vec<u64> = store
            .recent(10)
            .await
            .unwrap()
            .iter()
            .map(|r| r.record_id.0)
            .collect();
        assert_eq!(ids, vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_failed_store_refuses_every_call() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        let store = FileScanStore::open(&path).unwrap();
        store
            .commit_if_not_granted(&id("A1"), RecordOutcome::Granted)
            .await
            .unwrap();

        store.state.lock().failed = Some("rollback after failed append".to_string());

        assert!(matches!(
            store.has_granted_record(&id("A1")).await,
            Err(StoreError::Unavailable { .. })
        ));
        assert!(matches!(
            store.commit(&id("A2"), RecordOutcome::DeniedInvalid).await,
            Err(StoreError::Unavailable { .. })
        ));
        assert!(matches!(
            store.recent(5).await,
            Err(StoreError::Unavailable { .. })
        ));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_second_open_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scans.jsonl");
        let _first = FileScanStore::open(&path).unwrap();
        let second = FileScanStore::open(&path);
        assert!(matches!(second, Err(StoreError::Unavailable { .. })));
    }
}
