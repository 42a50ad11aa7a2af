pub mod api_types;
pub mod client;
pub mod repository;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{FeedClient, FeedSource};
pub use repository::{FeedItemStream, FeedRepository};
pub use types::FeedItem;
