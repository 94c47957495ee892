//! Automatic detection of the link bit rate.
//!
//! Invoked only when the stored rate is the auto sentinel. The link is
//! configured with each candidate in turn and watched over fixed 10 ms
//! windows: a line error moves on to the next candidate, buffered bytes
//! count towards acceptance, and five consecutive clean, non-empty
//! windows lock the rate in. The loop has no exit other than acceptance —
//! it is driven purely by watchdog-refreshed polling and terminates once
//! any signal is present on the line.

use log::{debug, info};

use crate::hardware::{SerialLink, SystemTimer, Watchdog};
use crate::settings::Settings;

/// Candidate bit rates, fastest first. Preferring the fastest viable rate
/// drains buffered data quicker and reduces overrun risk.
pub const BAUD_CANDIDATES: [u32; 12] = [
    115_200, 57_600, 56_000, 38_400, 28_800, 19_200, 14_400, 9_600, 4_800, 2_400, 1_200, 600,
];

/// Width of one scan window.
const SCAN_INTERVAL_MS: u32 = 10;

/// Consecutive non-empty, error-free windows required to accept a
/// candidate.
const ACCEPT_THRESHOLD: u8 = 5;

// =============================================================================
// Public Interface
// =============================================================================

/// Progress through the candidate table.
///
/// The index always stays inside [`BAUD_CANDIDATES`], wrapping past the
/// slowest candidate back to the fastest.
#[derive(Debug)]
pub struct LinkProbe {
    index: usize,
    successes: u8,
}

impl LinkProbe {
    pub fn new() -> Self {
        LinkProbe {
            index: 0,
            successes: 0,
        }
    }

    /// The candidate rate currently under test.
    pub fn current(&self) -> u32 {
        BAUD_CANDIDATES[self.index]
    }

    /// Record a line error: advance to the next candidate cyclically and
    /// start counting from zero again. Returns the new candidate rate.
    pub fn on_line_error(&mut self) -> u32 {
        self.index = (self.index + 1) % BAUD_CANDIDATES.len();
        self.successes = 0;
        self.current()
    }

    /// Record a clean window with buffered bytes.
    pub fn on_activity(&mut self) {
        self.successes += 1;
    }

    /// `true` once enough consecutive clean windows have accumulated.
    pub fn accepted(&self) -> bool {
        self.successes >= ACCEPT_THRESHOLD
    }
}

impl Default for LinkProbe {
    fn default() -> Self {
        LinkProbe::new()
    }
}

/// Run the detection protocol and return the accepted bit rate.
///
/// All other line parameters come from `settings`; only the rate is swept.
pub fn scan(
    link: &mut dyn SerialLink,
    watchdog: &mut dyn Watchdog,
    timer: &mut dyn SystemTimer,
    settings: &Settings,
) -> u32 {
    let mut probe = LinkProbe::new();
    let mut candidate = settings.clone();
    candidate.baud_rate = probe.current();

    info!(
        "scanning for the link bit rate, starting at {} baud",
        candidate.baud_rate
    );
    link.initialize(&candidate);
    link.clear_receive();

    while !probe.accepted() {
        watchdog.refresh();
        timer.delay_ms(SCAN_INTERVAL_MS);

        if link.has_line_error() {
            candidate.baud_rate = probe.on_line_error();
            debug!("line error, moving on to {} baud", candidate.baud_rate);
            link.initialize(&candidate);
            link.clear_receive();
        } else if link.available_len() > 0 {
            probe.on_activity();
            link.clear_receive();
            timer.delay_ms(SCAN_INTERVAL_MS);
        }
    }

    info!("accepted {} baud", probe.current());
    probe.current()
}

// =============================================================================
// Unit Tests
// =============================================================================
