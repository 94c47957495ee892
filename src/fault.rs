//! Fault taxonomy for the data logger.
//!
//! Every collaborator failure is mapped to exactly one of these kinds at
//! the point of detection. The modules doing the work return kind-tagged
//! `Result`s; only the device state machine turns a non-`Ok` result into
//! an entry of its `Fault` state. Success is the `Ok` branch of `Result`,
//! so there is no "no error" sentinel that could ever reach the fault
//! path.

use thiserror::Error;

/// The reasons the device can enter its `Fault` state.
///
/// Conditions recovered locally never surface here: write retries within
/// their budget, cyclic baud-candidate advancement on a line error, and
/// write protection clearing during its bounded poll window.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum Fault {
    /// Media is present but its write-protect line stayed asserted past
    /// the poll window.
    #[error("media is write protected")]
    WriteProtected,

    /// Mounting the storage device failed.
    #[error("failed to mount the storage device")]
    MountDisk,

    /// Unmounting the storage device failed.
    #[error("failed to unmount the storage device")]
    UnmountDisk,

    /// Bringing up the storage device itself failed.
    #[error("failed to initialize the storage device")]
    SdCardInit,

    /// The configuration file could not be created with defaults.
    #[error("failed to create the configuration file")]
    CreateConfigFile,

    /// A log file could not be created.
    #[error("failed to create a log file")]
    CreateFile,

    /// The active log file could not be opened.
    #[error("failed to open the log file")]
    OpenFile,

    /// Seeking to the end of the log file failed.
    #[error("failed to move the write pointer to the end of the log file")]
    MoveSeekPointer,

    /// Writing the captured chunk failed, or the write retry budget was
    /// exhausted with bytes remaining.
    #[error("failed to write to the log file")]
    WriteToFile,
}
