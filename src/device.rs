//! The device lifecycle state machine.
//!
//! **Example** - Executing the state machine event loop:
//! ```ignore
//! use logcom::{self as lc};
//!
//! let board = build_board(); // one handle per hardware collaborator
//! let mut logger = lc::factory(board);
//! logger.run(); // never returns; a hard stop is the only way out
//! ```

mod events;
mod state_machine;
mod states;

pub use state_machine::{factory, DataLogger};
