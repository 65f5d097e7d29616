//! Slave capture/transfer state machine
//!
//! Explicit, finite and deterministic. The dispatcher drives it; the link
//! state and READY line follow from it.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::SlaveState;
