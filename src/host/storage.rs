//! Directory-backed storage: the hosted stand-in for a memory card.
//!
//! The "removable media" is a directory, typically the mount point of an
//! OS-mounted card. Mounting checks the directory is reachable; files
//! are plain files inside it.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use log::{debug, warn};

use crate::hardware::{BlockStorage, LogVolume, OpenMode};

/// Block size reported for directory-backed storage, matching the sector
/// size of the cards the logger targets.
const DIR_BLOCK_SIZE: usize = 512;

// DirStorage ==================================================================

/// [`BlockStorage`] over a directory.
pub struct DirStorage {
    root: PathBuf,
    mounted: bool,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStorage {
            root: root.into(),
            mounted: false,
        }
    }
}

impl BlockStorage for DirStorage {
    fn init(&mut self) -> bool {
        // Bring-up on a host is reachability of the mount point.
        self.root.is_dir()
    }

    fn mount(&mut self) -> bool {
        if !self.root.is_dir() {
            warn!("{} is not a directory", self.root.display());
            return false;
        }
        self.mounted = true;
        true
    }

    fn unmount(&mut self) -> bool {
        self.mounted = false;
        true
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn format(&mut self) -> bool {
        // The hosted equivalent of re-creating the filesystem: clear the
        // directory's immediate entries.
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("cannot list {}: {}", self.root.display(), err);
                return false;
            }
        };
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(err) = removed {
                warn!("cannot remove {}: {}", path.display(), err);
                return false;
            }
        }
        true
    }

    fn block_size(&self) -> usize {
        DIR_BLOCK_SIZE
    }
}

// DirVolume ===================================================================

/// [`LogVolume`] over files inside a directory. At most one file is open
/// at a time, mirroring the single file object of the device firmware
/// this stands in for.
pub struct DirVolume {
    root: PathBuf,
    file: Option<File>,
}

impl DirVolume {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirVolume {
            root: root.into(),
            file: None,
        }
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl LogVolume for DirVolume {
    fn create_if_absent(&mut self, name: &str) -> bool {
        match OpenOptions::new()
            .write(true)
            .create(true)
            .open(self.path_of(name))
        {
            Ok(_) => true,
            Err(err) => {
                debug!("create_if_absent {} failed: {}", name, err);
                false
            }
        }
    }

    fn create_always(&mut self, name: &str) -> bool {
        match File::create(self.path_of(name)) {
            Ok(_) => true,
            Err(err) => {
                debug!("create_always {} failed: {}", name, err);
                false
            }
        }
    }

    fn open(&mut self, name: &str, mode: OpenMode) -> bool {
        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true),
            OpenMode::ReadWrite => options.read(true).write(true),
        };
        match options.open(self.path_of(name)) {
            Ok(file) => {
                self.file = Some(file);
                true
            }
            Err(err) => {
                debug!("open {} failed: {}", name, err);
                false
            }
        }
    }

    fn close(&mut self) -> bool {
        // Dropping the handle flushes and closes it.
        self.file = None;
        true
    }

    fn seek_to_end(&mut self) -> bool {
        match &mut self.file {
            Some(file) => file.seek(SeekFrom::End(0)).is_ok(),
            None => false,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Option<usize> {
        let file = self.file.as_mut()?;
        match file.write(bytes) {
            Ok(written) => Some(written),
            Err(err) => {
                debug!("write failed: {}", err);
                None
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Option<usize> {
        let file = self.file.as_mut()?;
        match file.read(buf) {
            Ok(read) => Some(read),
            Err(err) => {
                debug!("read failed: {}", err);
                None
            }
        }
    }

    fn size(&self) -> u64 {
        match &self.file {
            Some(file) => file.metadata().map(|meta| meta.len()).unwrap_or(0),
            None => 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
