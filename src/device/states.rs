//! States for the device lifecycle state machine.
//!
//! This module is private and restricted to the
//! [`device`](crate::device) scope. The public interface of the state
//! machine is provided by [`device`](crate::device).
//!
//! ```ignore
//! use super::states::*;
//! ```
//!
//! Refer to the [`state_machine`](super::state_machine) module for an
//! overview of states, events and transitions.

use console::style;
use hexplay::HexViewBuilder;
use log::{debug, info, log_enabled, Level::Debug};

use super::events::*;
use crate::fault::Fault;
use crate::hardware::Board;
use crate::log_pipeline::LogPipeline;
use crate::settings::{Settings, SettingsBuilder};
use crate::{autobaud, config_file};

/// All delays in milliseconds.
const BEFORE_REBOOT_MS: u32 = 500;
const SCAN_MEDIA_MS: u32 = 100;
const ON_ERROR_MS: u32 = 250;

/// Idle tick of the steady-state capture loop.
const CAPTURE_POLL_MS: u32 = 10;

/// Poll cycles granted to the write-protect line to clear after media
/// insertion.
const WRITE_PROTECT_POLL_CYCLES: u32 = 10;

/// Attempts granted to writing a default configuration file before the
/// storage is declared dead.
const CONFIG_CREATE_ATTEMPTS: u32 = 3;

// =============================================================================
// Crate-Public Interface
// =============================================================================

/// Trait adding the ability for a state to be `run` after a transition
/// into it.
pub(crate) trait Runnable {
    /// A state implements this method so it can be `run` after the state
    /// machine transitions into it.
    ///
    /// During this call, the state can do any work that needs to be done
    /// and when finished, requests transition to a new state by returning
    /// the appropriate `event`. The `event` is then consumed to create
    /// the new `state` using the corresponding `From` trait
    /// implementation if available.
    fn run(&mut self, board: &mut Board) -> Event;
}

// AwaitingMedia State =========================================================

/// The initial state: nothing can happen without media in the tray.
///
/// From `AwaitingMediaState`, the machine can evolve via the following
/// transitions:
///
///  * **[`HostDetectedEvent`] => `HostExposedState`** when a host
///    requests mass-storage access, which takes priority over logging,
///  * **[`MediaReadyEvent`] => `LoggingState`** when writable media is
///    present and the storage device came up,
///  * **[`FaultEvent`] => `FaultState`** when the media stays write
///    protected past its poll window, or the storage device fails to
///    come up.
#[derive(Debug)]
pub(crate) struct AwaitingMediaState {}
impl Runnable for AwaitingMediaState {
    fn run(&mut self, board: &mut Board) -> Event {
        info!("=> AwaitingMedia");

        // A reboot transition lands here with whatever the previous life
        // left mounted; start from a clean slate.
        let _ = board.disk.release();

        // Wait for media, breaking out early when a host shows up.
        let mut host_requested = false;
        while !board.signals.media_present() {
            if board.signals.host_present() {
                host_requested = true;
                break;
            }
            board.indicators.fault_on();
            board.watchdog.refresh();
            board.timer.delay_ms(ON_ERROR_MS);
        }

        // Give the write-protect line a bounded window to settle clear;
        // a host connection skips straight past it.
        if !board.signals.host_present() {
            for _ in 0..WRITE_PROTECT_POLL_CYCLES {
                board.watchdog.refresh();
                board.timer.delay_ms(SCAN_MEDIA_MS);
                if !board.signals.write_protected() {
                    board.watchdog.refresh();
                    board.timer.delay_ms(SCAN_MEDIA_MS);
                    break;
                }
            }
        }

        if !host_requested && board.signals.write_protected() {
            return Event::Fault(FaultEvent {
                reason: Fault::WriteProtected,
            });
        }

        // Bring up the storage device itself.
        if let Err(reason) = board.disk.init() {
            return Event::Fault(FaultEvent { reason });
        }

        if board.signals.host_present() {
            Event::HostDetected(HostDetectedEvent {})
        } else {
            Event::MediaReady(MediaReadyEvent {})
        }
    }
}

// HostExposed State ===========================================================

/// A host owns the storage: the device exposes the media over the host
/// link and stays out of the way.
///
/// The only way out is **[`RebootEvent`] => `AwaitingMediaState`**: once
/// the host lets go or the media is pulled, the storage geometry can no
/// longer be trusted, so the device waits for media and restarts from
/// scratch rather than resuming in place.
#[derive(Debug)]
pub(crate) struct HostExposedState {}
impl Runnable for HostExposedState {
    fn run(&mut self, board: &mut Board) -> Event {
        info!("=> HostExposed");
        board.indicators.run_on();
        board.indicators.fault_on();

        board.host_link.expose();

        // Serve the host until it lets go or the media is pulled.
        while board.signals.host_present() && board.signals.media_present() {
            board.watchdog.refresh();
            board.timer.delay_ms(SCAN_MEDIA_MS);
        }

        while !board.signals.media_present() {
            board.watchdog.refresh();
            board.timer.delay_ms(SCAN_MEDIA_MS);
        }

        board.timer.delay_ms(BEFORE_REBOOT_MS);
        Event::Reboot(RebootEvent {})
    }
}

// Logging State ===============================================================

/// The steady state: configuration is loaded from the media, the link is
/// brought up (directly or via rate detection), and complete storage
/// blocks of captured bytes flow through the rotation pipeline.
///
/// This state can transition as follows:
///
///  * **[`FaultEvent`] => `FaultState`** on any mount, configuration or
///    pipeline failure,
///  * **[`RebootEvent`] => `AwaitingMediaState`** when a host appears
///    (restart-over-resume, same as leaving `HostExposed`) or when media
///    is pulled and later reinserted.
#[derive(Debug)]
pub(crate) struct LoggingState {}
impl Runnable for LoggingState {
    fn run(&mut self, board: &mut Board) -> Event {
        info!("=> Logging");
        board.indicators.run_on();
        board.indicators.fault_off();

        if let Err(reason) = board.disk.acquire() {
            return Event::Fault(FaultEvent { reason });
        }

        let mut settings = match config_file::load(board.volume.as_mut()) {
            Ok(settings) => settings,
            Err(error) => {
                // No usable configuration on the media: persist the
                // defaults and remount so the fresh file is visible.
                debug!("configuration unavailable ({}), creating defaults", error);
                let defaults = SettingsBuilder::new().finalize();
                if let Err(reason) = create_config_file(board, &defaults) {
                    return Event::Fault(FaultEvent { reason });
                }
                if let Err(reason) = board.disk.release() {
                    return Event::Fault(FaultEvent { reason });
                }
                if let Err(reason) = board.disk.acquire() {
                    return Event::Fault(FaultEvent { reason });
                }
                defaults
            }
        };

        // Bring up the link, detecting the rate when asked to.
        if settings.is_auto_baud() {
            settings.baud_rate = autobaud::scan(
                board.link.as_mut(),
                board.watchdog.as_mut(),
                board.timer.as_mut(),
                &settings,
            );
        } else {
            board.link.initialize(&settings);
        }
        board.link.clear_receive();

        info!(
            "logging at {} baud, rotating every {} KB",
            settings.baud_rate, settings.max_log_kb
        );

        let block = board.disk.block_size();
        let mut pipeline = LogPipeline::new(settings.max_log_bytes());
        let mut buffer = vec![0u8; block];

        loop {
            board.watchdog.refresh();

            // A host taking over the storage invalidates everything this
            // state holds; restart from scratch.
            if board.signals.host_present() {
                return Event::Reboot(RebootEvent {});
            }

            // Drain only complete blocks; a remainder keeps buffering in
            // the link until it fills out.
            let available = board.link.available_len();
            if available > 0 && available % block == 0 {
                let mut remaining = available;
                while remaining > 0 {
                    board.watchdog.refresh();
                    board.indicators.run_off();

                    let len = remaining.min(block);
                    let received = board.link.receive(&mut buffer[..len]);
                    let captured = &buffer[..received];

                    // Echo the capture back out the line.
                    board.link.transmit(captured);

                    // Dump the captured data in a hex table for debugging
                    if log_enabled!(Debug) {
                        let view = HexViewBuilder::new(captured)
                            .address_offset(0)
                            .row_width(16)
                            .finish();
                        println!("{}", view);
                    }

                    if let Err(reason) = pipeline.write_chunk(
                        &mut board.disk,
                        board.volume.as_mut(),
                        board.clock.as_mut(),
                        captured,
                    ) {
                        return Event::Fault(FaultEvent { reason });
                    }

                    board.indicators.run_on();
                    remaining -= len;
                }
            }

            // Media pulled mid-capture: hold under the fault light until
            // it returns, then restart from scratch.
            if !board.signals.media_present() {
                board.indicators.run_off();
                board.indicators.fault_on();
                while !board.signals.media_present() {
                    board.watchdog.refresh();
                    board.timer.delay_ms(SCAN_MEDIA_MS);
                }
                return Event::Reboot(RebootEvent {});
            }

            board.timer.delay_ms(CAPTURE_POLL_MS);
        }
    }
}

/// Bounded attempts at writing a default configuration file.
fn create_config_file(board: &mut Board, defaults: &Settings) -> Result<(), Fault> {
    for attempt in 1..=CONFIG_CREATE_ATTEMPTS {
        if config_file::save(board.volume.as_mut(), defaults).is_ok() {
            return Ok(());
        }
        debug!("creating the configuration file failed (attempt {})", attempt);
        board.watchdog.refresh();
        board.timer.delay_ms(SCAN_MEDIA_MS);
    }
    Err(Fault::CreateConfigFile)
}

// Fault State =================================================================

/// Terminal until reboot: the fault indicator blinks and the device
/// demands a media reinsertion before anything else can happen.
///
/// The only way out is **[`RebootEvent`] => `AwaitingMediaState`**: the
/// reboot arms when the media leaves the tray and fires once it is back,
/// after the fixed pre-reboot delay.
#[derive(Debug)]
pub(crate) struct FaultState {
    /// The fault kind assigned at the point of detection.
    pub reason: Fault,
}
impl Runnable for FaultState {
    fn run(&mut self, board: &mut Board) -> Event {
        info!("=> Fault: {}", self.reason);
        println!("{}", style(format!("[LC] 💥 {}!", self.reason)).red());
        println!("[LC] 🔌 Remove and reinsert the media to restart!");

        board.indicators.run_off();
        let mut reboot_armed = false;
        loop {
            board.indicators.fault_on();
            board.watchdog.refresh();
            board.timer.delay_ms(ON_ERROR_MS);

            if board.signals.media_present() {
                board.indicators.fault_off();
                board.watchdog.refresh();
                board.timer.delay_ms(ON_ERROR_MS);
            } else {
                reboot_armed = true;
            }

            if reboot_armed && board.signals.media_present() {
                board.watchdog.refresh();
                board.timer.delay_ms(BEFORE_REBOOT_MS);
                return Event::Reboot(RebootEvent {});
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
