//! Published content: the item type and the remote fetcher.

mod client;
mod fetcher;
mod types;

pub use client::RestContentFetcher;
pub use fetcher::ContentFetcher;
pub use types::ContentItem;
