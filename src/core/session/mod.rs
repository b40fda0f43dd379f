//! Query session state machine
//!
//! - **state**: the session reducer (items, progress, stage, timings)
//! - **machine**: single-writer session task with an action API and snapshots

pub mod machine;
pub mod state;

pub use machine::{SearchSession, SessionSnapshot, SessionWatcher};
pub use state::{QuerySession, SessionStage, SessionTimings};
