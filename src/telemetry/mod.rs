mod error;
mod loader;
mod types;

pub use error::TelemetryError;
pub use loader::{json_files, parse_flights, parse_summary, read_flights, read_summary};
pub use types::{Flight, TelemetryRecord};
