pub mod client;
pub mod link;

pub use client::StreamClient;
pub use link::LinkPhase;
