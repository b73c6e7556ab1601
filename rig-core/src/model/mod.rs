// Core data models for sensor readings and state snapshots.

mod reading;
mod state;

pub use reading::{Derived, RawReading};
pub use state::RigState;
