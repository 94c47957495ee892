//! Hardware collaborator seams.
//!
//! The device core never touches hardware directly. Every independently
//! clocked subsystem it coordinates — the serial receiver, the block
//! storage device and its filesystem, the media/host signal lines, the
//! watchdog, the clock and the indicator LEDs — sits behind one of the
//! traits in this module, and the [`Board`] bundles one owned handle per
//! collaborator. The bundle is threaded `&mut` through the state machine
//! and the write pipeline, so there is no ambient global anywhere in the
//! crate: whoever holds the `Board` holds the hardware.
//!
//! Interrupt-driven producers (the serial receive path, the storage
//! controller) live entirely inside the implementations; the core only
//! ever observes their effects through polled accessors such as
//! [`SerialLink::available_len`] and [`SerialLink::has_line_error`].

mod serial;
mod signals;
mod storage;
mod system;

#[cfg(test)]
pub(crate) mod mock;

pub use serial::SerialLink;
pub use signals::{HostLink, Indicators, SignalLines};
pub use storage::{BlockStorage, LogVolume, OpenMode};
pub use system::{Clock, SystemTimer, Timestamp, Watchdog};

use crate::disk::StorageGuard;

/// One owned handle per hardware collaborator.
///
/// The board is created once at startup and survives every state
/// transition, including the reboot transition: hardware persists while
/// the state machine's own resources are discarded and re-derived.
pub struct Board {
    /// The captured serial link.
    pub link: Box<dyn SerialLink>,
    /// The block storage device, wrapped in the mount-discipline guard.
    pub disk: StorageGuard,
    /// File access on the mounted storage volume.
    pub volume: Box<dyn LogVolume>,
    /// Media-present, write-protect and host-present signal lines.
    pub signals: Box<dyn SignalLines>,
    /// Mass-storage passthrough towards a connected host.
    pub host_link: Box<dyn HostLink>,
    /// The hardware watchdog; every wait loop refreshes it.
    pub watchdog: Box<dyn Watchdog>,
    /// Fixed-duration polling delays.
    pub timer: Box<dyn SystemTimer>,
    /// Real-time clock used for log file naming.
    pub clock: Box<dyn Clock>,
    /// Run and fault indicator LEDs.
    pub indicators: Box<dyn Indicators>,
}
