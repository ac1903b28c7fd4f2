use std::collections::HashSet;

use crate::error::Result;
use crate::pubmed::client::PubMedClient;

/// ESearch will not page past this offset; deeper results need the history
/// server.
pub const MAX_SEARCH_OFFSET: u32 = 9_999;

/// Walks ESearch result pages with `retstart`/`retmax`.
pub struct Paginator<'a> {
    client: &'a PubMedClient,
    page_size: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(client: &'a PubMedClient, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }

    /// Collects up to `max_items` distinct ids in server order.
    pub async fn fetch_limited(&self, query: &str, max_items: u32) -> Result<Vec<String>> {
        let mut all_ids = Vec::new();
        let mut seen = HashSet::new();
        let mut offset: u32 = 0;

        while (all_ids.len() as u32) < max_items {
            if offset > MAX_SEARCH_OFFSET {
                tracing::warn!(
                    "ESearch cannot page beyond {} results, stopping at {} ids",
                    MAX_SEARCH_OFFSET + 1,
                    all_ids.len()
                );
                break;
            }

            let remaining = max_items - all_ids.len() as u32;
            let size = self.page_size.min(remaining);

            tracing::debug!("Fetching ids {}..{}", offset, offset + size);
            let page = self.client.search_page(query, offset, size).await?;
            let page_len = page.ids.len() as u32;

            if offset == 0 {
                tracing::info!("PubMed reports {} matches", page.total);
            }

            for id in page.ids {
                if seen.insert(id.clone()) {
                    all_ids.push(id);
                }
            }

            offset += page_len;
            if page_len == 0 || u64::from(offset) >= page.total {
                break;
            }
        }

        all_ids.truncate(max_items as usize);
        tracing::debug!("Retrieved {} PubMed ids", all_ids.len());
        Ok(all_ids)
    }
}
