pub mod bridge;
pub mod notice;

pub use bridge::FeedBridge;
pub use notice::LogNotice;
