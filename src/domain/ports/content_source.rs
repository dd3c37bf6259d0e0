use crate::domain::error::FeedError;
use async_trait::async_trait;

/// Turns a URL into plain page text. Rendering, HTTP and caching are the
/// implementation's concern.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Name of this source for logging (e.g., "http", "fixture").
    fn name(&self) -> &str;

    /// Fetch the text of `url`.
    async fn fetch(&self, url: &str) -> Result<String, FeedError>;
}
