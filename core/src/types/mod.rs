pub mod enums;
pub mod input;
pub mod uncertain;

pub use enums::{GlandularityGroup, TargetFilter};
pub use input::ExposureInput;
pub use uncertain::{propagate_uncertainty, round_to, UncertainValue};
