//! Append-only feedback store.
//!
//! Records are kept in memory for scanning and mirrored to a JSON Lines log on disk, one record
//! per line. The log is the durable copy; the in-memory set is rebuilt from it on
//! [`FeedbackStore::open`].
//!
//! ## Write path
//!
//! [`FeedbackStore::append`] holds the writer lock for the whole operation:
//!
//! 1. serialise the record,
//! 2. write the line, flush, and `sync_data` the file,
//! 3. push the record into the in-memory set.
//!
//! If step 2 fails the file is truncated back to its previous length and the in-memory set is
//! left untouched, so the record is either fully visible or not visible at all. If that
//! truncation fails too, the next append retries it first and is refused while it keeps
//! failing, so a later record is never written onto the end of a partial line.
//!
//! ## Torn writes
//!
//! A crash in the middle of step 2 can leave a partial last line. [`FeedbackStore::open`] skips
//! lines that do not parse and logs them, so a torn record is never exposed.

use crate::record::FeedbackRecord;
use crate::{FeedbackError, FeedbackResult};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// The durable half of the store: an append-only byte log.
///
/// [`File`] is the normal implementation; [`FeedbackStore::from_log`] accepts any other.
pub trait LogFile: Write + Send + std::fmt::Debug {
    /// Current length in bytes.
    fn byte_len(&self) -> io::Result<u64>;

    /// Cuts the log back to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Forces written bytes to durable storage.
    fn sync(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Log handle plus the length of its last complete record.
#[derive(Debug)]
struct LogWriter {
    log: Box<dyn LogFile>,
    committed_len: u64,
}

impl LogWriter {
    /// Removes bytes left behind by a write whose rollback failed, so the next record starts
    /// on a line of its own.
    ///
    /// Fails (and the append must be refused) while those bytes cannot be removed.
    fn restore_committed_tail(&mut self) -> io::Result<()> {
        let len = self.log.byte_len()?;
        if len == self.committed_len {
            return Ok(());
        }
        if len < self.committed_len {
            return Err(io::Error::other(format!(
                "feedback log shrank from {} to {} bytes",
                self.committed_len, len
            )));
        }

        tracing::warn!(
            "removing {} bytes of an unfinished write from the feedback log",
            len - self.committed_len
        );
        self.log.truncate(self.committed_len)
    }
}

/// Durable, append-only collection of [`FeedbackRecord`]s.
#[derive(Debug)]
pub struct FeedbackStore {
    path: PathBuf,
    writer: Mutex<LogWriter>,
    records: RwLock<Vec<FeedbackRecord>>,
}

impl FeedbackStore {
    /// Opens (creating if needed) the feedback log at `path` and loads its records.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if:
    /// - the parent directory cannot be created (`StorageDirCreation`),
    /// - the log cannot be opened (`FileOpen`) or read (`FileRead`).
    pub fn open(path: impl AsRef<Path>) -> FeedbackResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(FeedbackError::StorageDirCreation)?;
        }

        let records = if path.exists() {
            load_records(&path)?
        } else {
            Vec::new()
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(FeedbackError::FileOpen)?;

        // A torn final line has no newline; start the next record on a fresh line.
        if needs_leading_newline(&path)? {
            file.write_all(b"\n").map_err(FeedbackError::FileWrite)?;
        }
        let committed_len = file.byte_len().map_err(FeedbackError::FileOpen)?;

        tracing::info!(
            "loaded {} feedback records from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            writer: Mutex::new(LogWriter {
                log: Box::new(file),
                committed_len,
            }),
            records: RwLock::new(records),
        })
    }

    /// A store with no records that appends to `log`. `path` is only used in log messages.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::FileOpen` if the log length cannot be read.
    pub fn from_log(path: impl Into<PathBuf>, log: Box<dyn LogFile>) -> FeedbackResult<Self> {
        let committed_len = log.byte_len().map_err(FeedbackError::FileOpen)?;
        Ok(Self {
            path: path.into(),
            writer: Mutex::new(LogWriter { log, committed_len }),
            records: RwLock::new(Vec::new()),
        })
    }

    /// Durably appends `record` to the log and then to the in-memory set.
    ///
    /// # Errors
    ///
    /// Returns a storage error (`Serialization` or `FileWrite`) if the record could not be
    /// written. In that case the record is not visible through [`FeedbackStore::all`]. While a
    /// partial write cannot be rolled back, every append fails with `FileWrite`.
    pub fn append(&self, record: FeedbackRecord) -> FeedbackResult<()> {
        let mut line = serde_json::to_vec(&record).map_err(FeedbackError::Serialization)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().map_err(|_| FeedbackError::LockPoisoned)?;

        if let Err(e) = writer.restore_committed_tail() {
            tracing::error!(
                "refusing to append feedback record {} to {}: {}",
                record.id,
                self.path.display(),
                e
            );
            return Err(FeedbackError::FileWrite(e));
        }

        if let Err(e) = write_durably(writer.log.as_mut(), &line) {
            tracing::error!(
                "failed to append feedback record {} to {}: {}",
                record.id,
                self.path.display(),
                e
            );
            let committed_len = writer.committed_len;
            if let Err(truncate_err) = writer.log.truncate(committed_len) {
                tracing::error!(
                    "failed to roll back partial write in {}: {}",
                    self.path.display(),
                    truncate_err
                );
            }
            return Err(FeedbackError::FileWrite(e));
        }
        writer.committed_len += line.len() as u64;

        self.records
            .write()
            .map_err(|_| FeedbackError::LockPoisoned)?
            .push(record);

        Ok(())
    }

    /// Returns a copy of every record in insertion order.
    pub fn all(&self) -> FeedbackResult<Vec<FeedbackRecord>> {
        Ok(self
            .records
            .read()
            .map_err(|_| FeedbackError::LockPoisoned)?
            .clone())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn write_durably(log: &mut dyn LogFile, bytes: &[u8]) -> io::Result<()> {
    log.write_all(bytes)?;
    log.flush()?;
    log.sync()
}

fn load_records(path: &Path) -> FeedbackResult<Vec<FeedbackRecord>> {
    let file = File::open(path).map_err(FeedbackError::FileRead)?;
    let mut records = Vec::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(FeedbackError::FileRead)?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<FeedbackRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "skipping unreadable feedback record at {}:{}: {}",
                    path.display(),
                    index + 1,
                    e
                );
            }
        }
    }

    Ok(records)
}

fn needs_leading_newline(path: &Path) -> FeedbackResult<bool> {
    let contents = fs::read(path).map_err(FeedbackError::FileRead)?;
    Ok(contents.last().is_some_and(|b| *b != b'\n'))
}
