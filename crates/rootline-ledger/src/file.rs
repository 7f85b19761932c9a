use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rootline_types::{Digest, PoolId, DIGEST_LEN};
use tracing::{debug, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::traits::RootLedger;

/// File name of a pool's ledger.
pub fn ledger_file_name(pool: PoolId) -> String {
    format!("merkle_roots_pool_{pool}")
}

/// Internal mutable state for the ledger writer.
struct LedgerFile {
    file: File,
    /// Current file size in bytes; always a multiple of `DIGEST_LEN`.
    size: u64,
}

/// Ledger stored as raw concatenated digests in a single file.
///
/// On-disk format:
/// ```text
/// [32 bytes: root of bundle 0][32 bytes: root of bundle 1]...
/// ```
///
/// No framing and no delimiters. A file whose size is not a multiple of 32
/// is refused at open time.
pub struct FileLedger {
    path: PathBuf,
    writer: Mutex<LedgerFile>,
}

impl FileLedger {
    /// Open (or create) the ledger for `pool` inside `dir`.
    pub fn open_for_pool(dir: &Path, pool: PoolId) -> LedgerResult<Self> {
        Self::open(&dir.join(ledger_file_name(pool)))
    }

    /// Open (or create) a ledger file at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        Self::from_file(path, file)
    }

    /// Open an existing ledger for `pool` without creating anything.
    pub fn open_existing_for_pool(dir: &Path, pool: PoolId) -> LedgerResult<Self> {
        Self::open_existing(&dir.join(ledger_file_name(pool)))
    }

    /// Open an existing ledger file read-only. Appends to it fail.
    pub fn open_existing(path: &Path) -> LedgerResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LedgerError::Missing {
                path: path.to_path_buf(),
            },
            _ => LedgerError::Io(e),
        })?;
        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: File) -> LedgerResult<Self> {
        let size = file.metadata()?.len();
        if size % DIGEST_LEN as u64 != 0 {
            return Err(LedgerError::Inconsistent {
                path: path.to_path_buf(),
                size,
            });
        }

        debug!(path = %path.display(), digests = size / DIGEST_LEN as u64, "ledger opened");
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LedgerFile { file, size }),
        })
    }

    /// Path to the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn size(&self) -> LedgerResult<u64> {
        Ok(self.writer.lock().map_err(|_| LedgerError::Poisoned)?.size)
    }
}

impl RootLedger for FileLedger {
    fn len(&self) -> LedgerResult<u64> {
        Ok(self.size()? / DIGEST_LEN as u64)
    }

    fn append_batch(&self, digests: &[Digest]) -> LedgerResult<()> {
        if digests.is_empty() {
            return Ok(());
        }

        let mut buf = Vec::with_capacity(digests.len() * DIGEST_LEN);
        for digest in digests {
            buf.extend_from_slice(digest.as_bytes());
        }

        let mut w = self.writer.lock().map_err(|_| LedgerError::Poisoned)?;
        let start = w.size;

        if let Err(e) = append_or_rollback(&mut w.file, start, &buf) {
            warn!(path = %self.path.display(), error = %e, "ledger append failed; truncated to {start} bytes");
            return Err(e.into());
        }

        w.size = start + buf.len() as u64;
        debug!(
            path = %self.path.display(),
            appended = digests.len(),
            digests = w.size / DIGEST_LEN as u64,
            "ledger append"
        );
        Ok(())
    }

    fn read_range(&self, from: u64, to: u64) -> LedgerResult<Vec<Digest>> {
        let len = self.len()?;
        if from > to || to > len {
            return Err(LedgerError::OutOfRange { from, to, len });
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(from * DIGEST_LEN as u64))?;
        let mut raw = vec![0u8; ((to - from) as usize) * DIGEST_LEN];
        file.read_exact(&mut raw)?;

        raw.chunks_exact(DIGEST_LEN)
            .map(|chunk| {
                Digest::from_slice(chunk)
                    .map_err(|e| LedgerError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
            })
            .collect()
    }
}

/// Durable storage a batch is appended to.
trait AppendTarget: Write {
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl AppendTarget for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write `buf` and sync it. On failure, cut the target back to `start` bytes
/// so no part of the batch survives, then return the write error.
fn append_or_rollback<T: AppendTarget>(target: &mut T, start: u64, buf: &[u8]) -> io::Result<()> {
    let written = target.write_all(buf).and_then(|()| target.sync());
    if let Err(e) = written {
        if let Err(rollback) = target.truncate(start).and_then(|()| target.sync()) {
            warn!(error = %rollback, "ledger rollback failed");
        }
        return Err(e);
    }
    Ok(())
}
