//! Watchdog, delays and clock for a hosted build.

use std::thread;
use std::time::Duration;

use chrono::{Datelike, Local, Timelike};
use log::trace;

use crate::hardware::{Clock, SystemTimer, Timestamp, Watchdog};

// SoftWatchdog ================================================================

/// [`Watchdog`] stand-in: there is no hardware to bite on a desktop, so
/// refreshes are only counted. The core still drives it exactly as it
/// would the real one.
#[derive(Default)]
pub struct SoftWatchdog {
    refreshes: u64,
}

impl Watchdog for SoftWatchdog {
    fn refresh(&mut self) {
        self.refreshes = self.refreshes.wrapping_add(1);
        if self.refreshes % 1024 == 0 {
            trace!("watchdog refreshed {} times", self.refreshes);
        }
    }
}

// SleepTimer ==================================================================

/// [`SystemTimer`] over a thread sleep.
#[derive(Default)]
pub struct SleepTimer {}

impl SystemTimer for SleepTimer {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

// WallClock ===================================================================

/// [`Clock`] over the local wall clock.
#[derive(Default)]
pub struct WallClock {}

impl Clock for WallClock {
    fn now(&mut self) -> Timestamp {
        let now = Local::now();
        Timestamp {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            day: now.day() as u8,
            month: now.month() as u8,
            year: (now.year() % 100) as u8,
        }
    }
}
