//! Cost terms evaluated on the device.
//!
//! Every term implements [`CostFunction`]. [`CostTerm`] collects the
//! built-in terms and user-defined ones behind a single type.

pub mod trait_;
pub mod accumulator;
pub mod constant;
pub mod composite;
pub mod term;

pub use trait_::{CostFunction, RegionCost};
pub use accumulator::CostAccumulator;
pub use constant::ConstantCost;
pub use composite::CompositeCost;
pub use term::CostTerm;
