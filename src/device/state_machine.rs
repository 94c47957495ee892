//! The device lifecycle state machine.
//!
//! The device is always in exactly one of four states:
//!
//! ```text
//!                 START
//!                   |
//!                   v
//!           .---------------.     host     .-------------.
//!     .---->| AwaitingMedia |------------->| HostExposed |
//!     |     '---------------'   detected   '-------------'
//!     |        |         |                        |
//!   reboot     |         | media ready            | host gone /
//!     |        | fault   v                        | media pulled
//!     |        |     .---------.    fault         v
//!     |        |     | Logging |-------------> (reboot)
//!     |        v     '---------'
//!     |     .-------.    |
//!     '-----| Fault |<---'        media reinserted
//!           '-------'------------------> (reboot)
//! ```
//!
//! "Reboot" is a transition back to `AwaitingMedia` that discards every
//! resource the previous states owned and re-derives all state from
//! scratch, preserving the contract of a hardware reset without one.

use log::info;

use super::events::*;
use super::states::*;
use crate::hardware::Board;

// =============================================================================
// Public Interface
// =============================================================================

/// Represents the data logger device. Use the `factory()` function to
/// get an instance wired to a hardware [`Board`], then run it by calling
/// its `run()` method.
pub struct DataLogger {
    board: Board,
    sm: DeviceStates,
}
impl DataLogger {
    /// The device event loop. A physical logger never stops on its own
    /// and neither does this loop: every state either hands control to
    /// the next state or blocks under watchdog refresh until it can.
    /// Stopping the process is the hosted equivalent of pulling power.
    pub fn run(&mut self) -> ! {
        loop {
            self.sm = self.sm.step(&mut self.board);
        }
    }
}

/// Factory function for the data logger. Use it to get an instance bound
/// to the given hardware board, starting in the `AwaitingMedia` state.
pub fn factory(board: Board) -> DataLogger {
    DataLogger {
        board,
        sm: DeviceStates::AwaitingMedia(AwaitingMediaState {}),
    }
}

// =============================================================================
// Private stuff
// =============================================================================

/// Wraps the states of the device lifecycle state machine into a simple
/// enum, which can also be used for pattern matching during state
/// transitions.
enum DeviceStates {
    AwaitingMedia(AwaitingMediaState),
    HostExposed(HostExposedState),
    Logging(LoggingState),
    Fault(FaultState),
}
impl DeviceStates {
    /// The unit of work in the state machine event loop. It runs the
    /// current state and decides the next transition from the event it
    /// returns. State transitions from events are implemented using the
    /// rust `From`/`Into` pattern, so most state/event/transition
    /// mismatches are caught at compile time.
    fn step(&mut self, board: &mut Board) -> Self {
        match self {
            DeviceStates::AwaitingMedia(sm) => {
                let event = sm.run(board);
                match event {
                    Event::HostDetected(ev) => DeviceStates::HostExposed(ev.into()),
                    Event::MediaReady(ev) => DeviceStates::Logging(ev.into()),
                    Event::Fault(ev) => DeviceStates::Fault(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            DeviceStates::HostExposed(sm) => {
                let event = sm.run(board);
                match event {
                    Event::Reboot(ev) => DeviceStates::AwaitingMedia(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            DeviceStates::Logging(sm) => {
                let event = sm.run(board);
                match event {
                    Event::Fault(ev) => DeviceStates::Fault(ev.into()),
                    Event::Reboot(ev) => DeviceStates::AwaitingMedia(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
            DeviceStates::Fault(sm) => {
                let event = sm.run(board);
                match event {
                    Event::Reboot(ev) => DeviceStates::AwaitingMedia(ev.into()),
                    _ => unreachable!("illegal event {:#?} at current state {:#?}", event, sm),
                }
            }
        }
    }
}

// -----------------------------------------------------------------------------
// State from Event transitions
// -----------------------------------------------------------------------------

impl From<HostDetectedEvent> for HostExposedState {
    fn from(_event: HostDetectedEvent) -> HostExposedState {
        HostExposedState {}
    }
}

impl From<MediaReadyEvent> for LoggingState {
    fn from(_event: MediaReadyEvent) -> LoggingState {
        LoggingState {}
    }
}

impl From<FaultEvent> for FaultState {
    fn from(event: FaultEvent) -> FaultState {
        info!("entering the fault state: {}", event.reason);
        FaultState {
            reason: event.reason,
        }
    }
}

impl From<RebootEvent> for AwaitingMediaState {
    fn from(_event: RebootEvent) -> AwaitingMediaState {
        AwaitingMediaState {}
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
impl DataLogger {
    pub(crate) fn step_once(&mut self) {
        self.sm = self.sm.step(&mut self.board);
    }

    pub(crate) fn state_name(&self) -> &'static str {
        match self.sm {
            DeviceStates::AwaitingMedia(_) => "AwaitingMedia",
            DeviceStates::HostExposed(_) => "HostExposed",
            DeviceStates::Logging(_) => "Logging",
            DeviceStates::Fault(_) => "Fault",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file;
    use crate::hardware::mock::MockBoard;
    use crate::settings::SettingsBuilder;
    use std::collections::VecDeque;

    #[test]
    fn a_full_life_runs_from_media_wait_back_to_media_wait() {
        let (board, handles) = MockBoard::new();
        {
            let mut signals = handles.signals.borrow_mut();
            signals.media_last = true;
            // Absent while the machine validates media, present once the
            // logging loop starts, then a host barges in.
            signals.host = VecDeque::from(vec![false, false, false, true]);
        }
        let settings = SettingsBuilder::new().baud_rate(19_200).finalize();
        handles.volume.borrow_mut().files.insert(
            config_file::CONFIG_FILE_NAME.to_owned(),
            config_file::render(&settings).into_bytes(),
        );

        let mut logger = factory(board);
        assert_eq!(logger.state_name(), "AwaitingMedia");

        logger.step_once();
        assert_eq!(logger.state_name(), "Logging");

        // The logging loop runs until the host shows up, then starts the
        // machine over.
        logger.step_once();
        assert_eq!(logger.state_name(), "AwaitingMedia");
    }

    #[test]
    fn a_host_request_routes_to_host_exposed() {
        let (board, handles) = MockBoard::new();
        {
            let mut signals = handles.signals.borrow_mut();
            signals.media_last = false;
            signals.host_last = true;
        }

        let mut logger = factory(board);
        logger.step_once();
        assert_eq!(logger.state_name(), "HostExposed");
    }

    #[test]
    fn write_protected_media_routes_to_fault_and_reinsertion_recovers() {
        let (board, handles) = MockBoard::new();
        {
            let mut signals = handles.signals.borrow_mut();
            signals.media_last = true;
            signals.write_protect_last = true;
        }

        let mut logger = factory(board);
        logger.step_once();
        assert_eq!(logger.state_name(), "Fault");

        // Pull the media, put it back: the fault state arms and reboots.
        handles.signals.borrow_mut().media = VecDeque::from(vec![false, false, true]);
        logger.step_once();
        assert_eq!(logger.state_name(), "AwaitingMedia");
    }
}
