mod look_angle;
mod types;

pub use look_angle::look_angle;
pub use types::{GeoPosition, LookAngle};
