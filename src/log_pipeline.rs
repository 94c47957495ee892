//! The log rotation write pipeline.
//!
//! Turns captured byte chunks into append writes against a bounded-size,
//! timestamp-named file sequence. Every call runs the full lifecycle —
//! mount, ensure file, open, rotate if needed, seek, bounded-retry write,
//! close, unmount — so losing power between calls can only ever expose
//! the narrow window of a single write. Old files are closed by
//! rotation, never deleted.

use log::{debug, info};

use crate::disk::StorageGuard;
use crate::fault::Fault;
use crate::hardware::{Clock, LogVolume, OpenMode, Timestamp};

/// Extension given to every log file.
const LOG_FILE_EXTENSION: &str = ".txt";

/// Upper bound on underlying write attempts for a single chunk.
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// The single active log file: its timestamp-derived name and the size
/// bound that triggers rotation. The current size is re-read from the
/// volume on every call, never cached.
#[derive(Debug)]
struct LogFile {
    name: Option<String>,
    max_size: u64,
}

// =============================================================================
// Public Interface
// =============================================================================

/// Owns the active [`LogFile`] and appends captured chunks to it.
pub struct LogPipeline {
    file: LogFile,
}

impl LogPipeline {
    /// A pipeline rotating at `max_log_bytes` per file. No file is
    /// created until the first chunk arrives.
    pub fn new(max_log_bytes: u64) -> Self {
        LogPipeline {
            file: LogFile {
                name: None,
                max_size: max_log_bytes,
            },
        }
    }

    /// Name of the file the next chunk will target, once one exists.
    pub fn active_file(&self) -> Option<&str> {
        self.file.name.as_deref()
    }

    /// Append one captured chunk to the active log file.
    ///
    /// The chunk lands in full in exactly one file: when it no longer
    /// fits under the size bound, the pipeline rotates to a freshly
    /// named file *before* writing. The storage device is mounted at
    /// entry and released on every exit path.
    pub fn write_chunk(
        &mut self,
        disk: &mut StorageGuard,
        volume: &mut dyn LogVolume,
        clock: &mut dyn Clock,
        chunk: &[u8],
    ) -> Result<(), Fault> {
        disk.acquire()?;
        let result = self.write_chunk_mounted(volume, clock, chunk);
        // Close and release no matter how the attempt went.
        volume.close();
        let _ = disk.release();
        result
    }

    fn write_chunk_mounted(
        &mut self,
        volume: &mut dyn LogVolume,
        clock: &mut dyn Clock,
        chunk: &[u8],
    ) -> Result<(), Fault> {
        // First chunk since startup: create the file and close it again,
        // guaranteeing it exists before the open below.
        let name = match self.file.name.clone() {
            Some(name) => name,
            None => {
                let name = derive_name(clock.now());
                if !volume.create_if_absent(&name) {
                    return Err(Fault::CreateFile);
                }
                volume.close();
                self.file.name = Some(name.clone());
                name
            }
        };

        if !volume.open(&name, OpenMode::ReadWrite) {
            return Err(Fault::OpenFile);
        }

        // Rotation point: a chunk that would reach or pass the bound goes
        // into a new file, whole.
        let size = volume.size();
        if size + chunk.len() as u64 >= self.file.max_size {
            volume.close();
            let fresh = derive_name(clock.now());
            info!("log file {} is full, rotating to {}", name, fresh);
            if !volume.create_always(&fresh) {
                return Err(Fault::CreateFile);
            }
            if !volume.open(&fresh, OpenMode::ReadWrite) {
                return Err(Fault::OpenFile);
            }
            self.file.name = Some(fresh);
        }

        if !volume.seek_to_end() {
            return Err(Fault::MoveSeekPointer);
        }

        write_fully(volume, chunk)
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// Name a log file after the moment it was created: `HH.MM DD.MM.YY.txt`.
fn derive_name(time: Timestamp) -> String {
    format!(
        "{:02}.{:02} {:02}.{:02}.{:02}{}",
        time.hour, time.minute, time.day, time.month, time.year, LOG_FILE_EXTENSION
    )
}

/// Push the whole chunk through the volume within the attempt budget.
///
/// The loop advances only while bytes remain unwritten and the
/// underlying attempt succeeds; a driver error or an exhausted budget
/// with bytes remaining fails the chunk.
fn write_fully(volume: &mut dyn LogVolume, chunk: &[u8]) -> Result<(), Fault> {
    let mut written = 0;
    let mut attempts = MAX_WRITE_ATTEMPTS;
    while written < chunk.len() {
        if attempts == 0 {
            return Err(Fault::WriteToFile);
        }
        attempts -= 1;
        match volume.write(&chunk[written..]) {
            Some(accepted) => {
                if accepted < chunk.len() - written {
                    debug!(
                        "short write, {} of {} bytes accepted",
                        accepted,
                        chunk.len() - written
                    );
                }
                written += accepted;
            }
            None => return Err(Fault::WriteToFile),
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
