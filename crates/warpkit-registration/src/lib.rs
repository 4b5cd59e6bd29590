pub mod cost;
pub mod error;
pub mod settings;
pub mod stream;

pub use cost::{CompositeCost, ConstantCost, CostAccumulator, CostFunction, CostTerm, RegionCost};
pub use error::{RegistrationError, Result};
pub use settings::{RegistrationSettings, StreamConfig};
pub use stream::{Completion, Stream};
