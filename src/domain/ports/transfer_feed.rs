use crate::domain::entities::transfer_record::TransferRecord;
use crate::domain::error::FeedError;
use async_trait::async_trait;

/// A structured API that already yields transfer records, merged into each
/// cycle after the scraped documents.
#[async_trait]
pub trait TransferFeed: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<Vec<TransferRecord>, FeedError>;
}
