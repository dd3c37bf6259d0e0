pub mod content_source;
pub mod listener;
pub mod transfer_feed;
