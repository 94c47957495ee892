//! Signal lines, indicators and host link for a hosted build.

use std::fs;
use std::path::PathBuf;

use console::style;
use log::{trace, warn};

use crate::hardware::{HostLink, Indicators, SignalLines};

// FolderSignals ===============================================================

/// [`SignalLines`] derived from the media directory.
///
/// Media presence is the directory being reachable (an OS-unmounted card
/// makes its mount point vanish or turn empty-dir-on-root), and write
/// protection follows the directory's read-only attribute. There is no
/// host-detect line on a desktop; the host, if any, is this machine.
pub struct FolderSignals {
    root: PathBuf,
}

impl FolderSignals {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FolderSignals { root: root.into() }
    }
}

impl SignalLines for FolderSignals {
    fn media_present(&mut self) -> bool {
        self.root.is_dir()
    }

    fn write_protected(&mut self) -> bool {
        fs::metadata(&self.root)
            .map(|meta| meta.permissions().readonly())
            .unwrap_or(true)
    }

    fn host_present(&mut self) -> bool {
        false
    }
}

// NullHostLink ================================================================

/// [`HostLink`] for a hosted build, where mass-storage passthrough makes
/// no sense: the storage already belongs to this machine's OS.
#[derive(Default)]
pub struct NullHostLink {}

impl HostLink for NullHostLink {
    fn expose(&mut self) {
        warn!("mass-storage passthrough is not available on a hosted build");
    }
}

// ConsoleIndicators ===========================================================

/// [`Indicators`] rendered on the terminal.
///
/// The run indicator toggles around every stored block, which would
/// drown the terminal, so it only traces; fault edges are rare and get a
/// styled line.
#[derive(Default)]
pub struct ConsoleIndicators {
    run: bool,
    fault: bool,
}

impl Indicators for ConsoleIndicators {
    fn run_on(&mut self) {
        if !self.run {
            self.run = true;
            trace!("run indicator on");
        }
    }

    fn run_off(&mut self) {
        if self.run {
            self.run = false;
            trace!("run indicator off");
        }
    }

    fn fault_on(&mut self) {
        if !self.fault {
            self.fault = true;
            println!("{}", style("[LC] 🔴 fault indicator on").red());
        }
    }

    fn fault_off(&mut self) {
        if self.fault {
            self.fault = false;
            println!("{}", style("[LC] ⚪ fault indicator off").dim());
        }
    }
}
