pub mod record;

pub use record::{parse_frame, LogSeverity, TelemetryRecord};
