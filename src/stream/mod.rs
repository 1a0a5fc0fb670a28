//! Stream combinators for event consumers

mod tick_drain;

pub use tick_drain::{MIN_TICK, TickDrain, TickDrainExt};
