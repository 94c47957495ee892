//! Events for the device lifecycle state machine.
//!
//! This module is private and restricted to the
//! [`device`](crate::device) scope. The public interface of the state
//! machine is provided by [`device`](crate::device).
//!
//! ```ignore
//! use super::events::*;
//! ```
//!
//! Refer to the [`state_machine`](super::state_machine) module for an
//! overview of states, events and transitions.

use crate::fault::Fault;

// =============================================================================
// Crate-Public Interface
// =============================================================================

// HostDetectedEvent ===========================================================

/// Event fired while waiting for media when a host requests mass-storage
/// access instead. It triggers a transition to the `HostExposed` state,
/// where the host owns the storage until the device reboots.
#[derive(Debug)]
pub(crate) struct HostDetectedEvent {}

// MediaReadyEvent =============================================================

/// Event fired when media sits in the tray, is writable, and the storage
/// device came up. It triggers the transition to the `Logging` state.
#[derive(Debug)]
pub(crate) struct MediaReadyEvent {}

// FaultEvent ==================================================================

/// Event fired when an operation failed in a way the device cannot
/// recover in place. Carries the one fault kind assigned at the point of
/// detection and triggers the transition to the `Fault` state.
///
/// Success never reaches this event: the taxonomy has no "no error"
/// value, so a fault entry is always a real fault.
#[derive(Debug)]
pub(crate) struct FaultEvent {
    pub reason: Fault,
}

// RebootEvent =================================================================

/// Event fired when the device gives up its current life and starts
/// over: the host released the storage, media came back after removal,
/// or a fault was acknowledged by media reinsertion.
///
/// The transition back to `AwaitingMedia` discards everything the old
/// states owned — open files, link configuration, the mount — and
/// re-derives all of it from scratch, which is safer than patching live
/// state that may describe storage that has been physically swapped.
#[derive(Debug)]
pub(crate) struct RebootEvent {}

// Events enum ==================================================================

/// Events that can be triggered within the device lifecycle state
/// machine.
///
/// Each possible value holds an `event`, which in turn may hold
/// additional data for the state transition.
#[derive(Debug)]
pub(crate) enum Event {
    HostDetected(HostDetectedEvent),
    MediaReady(MediaReadyEvent),
    Fault(FaultEvent),
    Reboot(RebootEvent),
}
