//! Host-side implementations of the hardware collaborator seams.
//!
//! These adapters let the device core run unchanged on a desktop: the
//! captured link is a real serial port, the "removable media" is a
//! directory (typically an OS-mounted memory card), the signal lines are
//! derived from that directory, and the watchdog becomes a soft counter.
//! Wire one of each into a [`Board`](crate::Board) and hand it to
//! [`factory`](crate::factory).

mod ports;
mod serial;
mod signals;
mod storage;
mod system;

pub use ports::{select_port, wait_for_port};
pub use serial::HostSerial;
pub use signals::{ConsoleIndicators, FolderSignals, NullHostLink};
pub use storage::{DirStorage, DirVolume};
pub use system::{SleepTimer, SoftWatchdog, WallClock};
