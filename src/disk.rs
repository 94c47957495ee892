//! Mount/unmount discipline for the removable storage device.
//!
//! The guard owns the storage handle and the mount flag, and is the only
//! component in the crate that calls `mount`/`unmount`. Both directions
//! are idempotent, so the logging entry path can hold the mount across
//! its configuration work while the write pipeline still gets its
//! mount-at-entry / unmount-at-exit discipline for free.

use crate::fault::Fault;
use crate::hardware::BlockStorage;

/// Wraps the block storage device and serializes its mount lifecycle.
pub struct StorageGuard {
    device: Box<dyn BlockStorage>,
    mounted: bool,
}

impl StorageGuard {
    pub fn new(device: Box<dyn BlockStorage>) -> Self {
        StorageGuard {
            device,
            mounted: false,
        }
    }

    /// Bring up the storage device itself (controller and card).
    pub fn init(&mut self) -> Result<(), Fault> {
        if self.device.init() {
            Ok(())
        } else {
            Err(Fault::SdCardInit)
        }
    }

    /// Mount the device unless it is already mounted.
    pub fn acquire(&mut self) -> Result<(), Fault> {
        if !self.mounted {
            if !self.device.mount() {
                return Err(Fault::MountDisk);
            }
            self.mounted = true;
        }
        Ok(())
    }

    /// Unmount the device if it is mounted, flushing the driver.
    pub fn release(&mut self) -> Result<(), Fault> {
        if self.mounted {
            if !self.device.unmount() {
                return Err(Fault::UnmountDisk);
            }
            self.mounted = false;
        }
        Ok(())
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The device's native block size in bytes.
    pub fn block_size(&self) -> usize {
        self.device.block_size()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
