use async_trait::async_trait;

use crate::error::Result;
use crate::pubmed::client::PubMedClient;
use crate::pubmed::parser::ParsedBatch;

/// Where the pipeline gets ids and records from.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>>;
    async fn fetch_details(&self, ids: &[String]) -> Result<ParsedBatch>;
    /// Ids per detail request.
    fn batch_size(&self) -> usize;
    fn name(&self) -> &str;
}

#[async_trait]
impl LiteratureSource for PubMedClient {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        PubMedClient::search(self, query, max_results).await
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<ParsedBatch> {
        PubMedClient::fetch_details(self, ids).await
    }

    fn batch_size(&self) -> usize {
        self.config().batch_size as usize
    }

    fn name(&self) -> &str {
        "PubMed"
    }
}
