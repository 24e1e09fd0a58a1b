//! Telemetry ingestion and state-synchronization core for the Sentinel
//! C-UAS console.
//!
//! The modules own the live feed link, the canonical record model, and the
//! process-wide store that every operator surface reads from. Presentation
//! code never touches the transport; it subscribes to store snapshots.

pub mod feed;
pub mod prelude;
pub mod store;
pub mod stream;
pub mod telemetry;

pub use prelude::{StreamConfig, StreamError, StreamResult};
