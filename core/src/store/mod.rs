pub mod history;
pub mod hub;

pub use history::HistoryBuffer;
pub use hub::{StoreSnapshot, TelemetryStore};
