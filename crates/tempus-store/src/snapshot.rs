//! Snapshot encoding, decoding, and file I/O.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

/// Errors that can occur while encoding, decoding, or persisting a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("snapshot I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The data stream ended before a complete field could be read.
    #[error("snapshot data truncated: {needed} more bytes required")]
    Truncated {
        /// Number of bytes the next field required.
        needed: usize,
    },

    /// A cooldown id was not valid UTF-8.
    #[error("cooldown id is not valid UTF-8: {source}")]
    InvalidId {
        /// The underlying UTF-8 error.
        #[from]
        source: std::string::FromUtf8Error,
    },

    /// The cooldown count field was negative.
    #[error("cooldown count is negative: {count}")]
    NegativeCount {
        /// The count read from the stream.
        count: i32,
    },

    /// The persisted minute counter was negative.
    #[error("minute counter is out of range: {value}")]
    CounterOutOfRange {
        /// The counter read from the stream.
        value: i64,
    },

    /// A cooldown id exceeded the 16-bit length prefix on encode.
    #[error("cooldown id too long to encode: {len} bytes")]
    IdTooLong {
        /// Byte length of the offending id.
        len: usize,
    },

    /// More cooldown entries than the 32-bit count field can express.
    #[error("too many cooldown entries to encode: {len}")]
    TooManyEntries {
        /// Number of entries in the snapshot.
        len: usize,
    },
}

/// A wall-clock cooldown as it appears in the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCooldown {
    /// Caller-chosen unique key.
    pub id: String,
    /// Epoch milliseconds at which the cooldown was armed.
    pub started_at_millis: i64,
    /// Cooldown duration in milliseconds.
    pub duration_millis: i64,
}

/// The full persisted state of the clock engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSnapshot {
    /// Total simulated minutes elapsed since the clock epoch.
    pub total_minutes: u64,
    /// Wall-clock cooldown entries active at save time.
    pub cooldowns: Vec<PersistedCooldown>,
}

impl TimeSnapshot {
    /// Encode the snapshot into the fixed big-endian layout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdTooLong`] or [`StoreError::TooManyEntries`]
    /// if a field does not fit its length prefix.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        let mut out = Vec::new();
        let total = i64::try_from(self.total_minutes).map_err(|_err| {
            StoreError::CounterOutOfRange {
                value: i64::MAX,
            }
        })?;
        out.extend_from_slice(&total.to_be_bytes());

        let count = i32::try_from(self.cooldowns.len()).map_err(|_err| {
            StoreError::TooManyEntries {
                len: self.cooldowns.len(),
            }
        })?;
        out.extend_from_slice(&count.to_be_bytes());

        for entry in &self.cooldowns {
            let id_bytes = entry.id.as_bytes();
            let id_len = u16::try_from(id_bytes.len()).map_err(|_err| StoreError::IdTooLong {
                len: id_bytes.len(),
            })?;
            out.extend_from_slice(&id_len.to_be_bytes());
            out.extend_from_slice(id_bytes);
            out.extend_from_slice(&entry.started_at_millis.to_be_bytes());
            out.extend_from_slice(&entry.duration_millis.to_be_bytes());
        }

        Ok(out)
    }

    /// Decode a snapshot from the fixed big-endian layout.
    ///
    /// Trailing bytes after the last record are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] describing the first malformed field.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        let mut input = bytes;

        let raw_total = read_i64(&mut input)?;
        let total_minutes = u64::try_from(raw_total)
            .map_err(|_err| StoreError::CounterOutOfRange { value: raw_total })?;

        let raw_count = read_i32(&mut input)?;
        let count = usize::try_from(raw_count)
            .map_err(|_err| StoreError::NegativeCount { count: raw_count })?;

        let mut cooldowns = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let id_len = usize::from(read_u16(&mut input)?);
            let id = String::from_utf8(read_bytes(&mut input, id_len)?.to_vec())?;
            let started_at_millis = read_i64(&mut input)?;
            let duration_millis = read_i64(&mut input)?;
            cooldowns.push(PersistedCooldown {
                id,
                started_at_millis,
                duration_millis,
            });
        }

        Ok(Self {
            total_minutes,
            cooldowns,
        })
    }
}

/// File-backed store for [`TimeSnapshot`] values.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read, or a decode
    /// error if the contents are malformed.
    pub async fn load(&self) -> Result<TimeSnapshot, StoreError> {
        let bytes = tokio::fs::read(&self.path).await?;
        TimeSnapshot::decode(&bytes)
    }

    /// Load the snapshot, recovering to the empty snapshot on any failure.
    ///
    /// A missing file is a normal first start; a malformed file resets the
    /// clock to zero with a warning. Neither is fatal.
    pub async fn load_or_default(&self) -> TimeSnapshot {
        match self.load().await {
            Ok(snapshot) => {
                info!(
                    path = %self.path.display(),
                    total_minutes = snapshot.total_minutes,
                    cooldowns = snapshot.cooldowns.len(),
                    "time data loaded"
                );
                snapshot
            }
            Err(StoreError::Io { ref source })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                debug!(path = %self.path.display(), "no time data file, starting at zero");
                TimeSnapshot::default()
            }
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "time data unreadable, resetting clock to zero"
                );
                TimeSnapshot::default()
            }
        }
    }

    /// Persist the snapshot to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if encoding or any filesystem step fails.
    pub async fn save(&self, snapshot: &TimeSnapshot) -> Result<(), StoreError> {
        let bytes = snapshot.encode()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("dat.tmp");
        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(
            path = %self.path.display(),
            total_minutes = snapshot.total_minutes,
            cooldowns = snapshot.cooldowns.len(),
            "time data saved"
        );
        Ok(())
    }
}

fn read_bytes<'a>(input: &mut &'a [u8], len: usize) -> Result<&'a [u8], StoreError> {
    let (head, rest) = input
        .split_at_checked(len)
        .ok_or(StoreError::Truncated { needed: len })?;
    *input = rest;
    Ok(head)
}

fn read_i64(input: &mut &[u8]) -> Result<i64, StoreError> {
    let head = read_bytes(input, 8)?;
    let mut buf = [0_u8; 8];
    buf.copy_from_slice(head);
    Ok(i64::from_be_bytes(buf))
}

fn read_i32(input: &mut &[u8]) -> Result<i32, StoreError> {
    let head = read_bytes(input, 4)?;
    let mut buf = [0_u8; 4];
    buf.copy_from_slice(head);
    Ok(i32::from_be_bytes(buf))
}

fn read_u16(input: &mut &[u8]) -> Result<u16, StoreError> {
    let head = read_bytes(input, 2)?;
    let mut buf = [0_u8; 2];
    buf.copy_from_slice(head);
    Ok(u16::from_be_bytes(buf))
}
