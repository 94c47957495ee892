//! Logcom is a standalone serial-line data logger: it captures the bytes
//! arriving on a serial link and persists them as rotating, timestamped
//! files on removable block storage, stepping aside whenever a host
//! claims that storage for itself. The configuration — link parameters
//! and rotation size — lives in a plain-text file on the media itself,
//! and an automatic rate detection kicks in when no rate is configured.
//!
//! The device core is implemented as a state machine over a set of
//! hardware collaborator traits, so the exact same control logic drives
//! a desktop build (see the [`host`] module) and a test bench of
//! scripted mocks. State machines are implemented in terms of **states**
//! and **transitions** between them with the following characteristics:
//!
//! * Can only be in one state at any time.
//! * Each state can have its own associated data if needed.
//! * Transitions between states are triggered via typed **events** and
//!   follow defined semantics.
//! * Only explicitly defined transitions should be permitted and as many
//!   errors should be detected at **compile-time**.
//! * Transitioning from one state to another consumes the original state
//!   and renders it unusable. Any transition back to that state would
//!   create a new state.
//!
//! The implementation of state transitions leverages `rust`'s `From` and
//! `Into` pattern. The `From` trait allows for a type to define how to
//! create itself from another type, hence providing us an intuitive and
//! simple mechanism for converting `events` into new `states`. Only
//! transitions for which the `From` trait is implemented are authorized
//! and any other transition would be detected at compile-time as an
//! error.
//!
//! A note on recovery: the device never patches live state. Whatever
//! goes wrong — a host taking the storage, media pulled mid-capture, an
//! unrecoverable storage fault — the answer is always to discard every
//! owned resource and restart the machine from its initial state, the
//! hosted equivalent of the hardware reset the physical logger performs.
//!
//! **Example** - capturing `/dev/ttyUSB0` into `/media/card`:
//! ```no_run
//! use logcom::{self as lc, host};
//!
//! let board = lc::Board {
//!     link: Box::new(host::HostSerial::new("/dev/ttyUSB0")),
//!     disk: lc::StorageGuard::new(Box::new(host::DirStorage::new("/media/card"))),
//!     volume: Box::new(host::DirVolume::new("/media/card")),
//!     signals: Box::new(host::FolderSignals::new("/media/card")),
//!     host_link: Box::new(host::NullHostLink::default()),
//!     watchdog: Box::new(host::SoftWatchdog::default()),
//!     timer: Box::new(host::SleepTimer::default()),
//!     clock: Box::new(host::WallClock::default()),
//!     indicators: Box::new(host::ConsoleIndicators::default()),
//! };
//! lc::factory(board).run();
//! ```

pub mod autobaud;
pub mod config_file;
mod device;
mod disk;
mod fault;
mod hardware;
pub mod host;
mod log_pipeline;
mod settings;

pub use device::{factory, DataLogger};
pub use disk::StorageGuard;
pub use fault::Fault;
pub use hardware::{
    BlockStorage, Board, Clock, HostLink, Indicators, LogVolume, OpenMode, SerialLink,
    SignalLines, SystemTimer, Timestamp, Watchdog,
};
pub use log_pipeline::LogPipeline;
pub use settings::{
    DataBits, Parity, Settings, SettingsBuilder, StopBits, AUTO_BAUD_RATE, MAX_BAUD_RATE,
    MAX_LOG_KB, MIN_LOG_KB,
};
