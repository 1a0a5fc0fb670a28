//! Provider implementations

pub mod live;
pub mod simulated;

pub use live::LiveProvider;
pub use simulated::SimulatedProvider;
