//! Page retrieval.

use crate::error::Result;
use crate::notion::blocks::fetch_all_blocks;
use crate::notion::client::NotionClient;
use crate::notion::types::{Block, Page};

/// Retrieve a single page with its properties.
pub async fn retrieve_page(client: &NotionClient, page_id: &str) -> Result<Page> {
    client
        .get_json(&format!("/v1/pages/{}", page_id), &[])
        .await
}

/// Retrieve a page together with its full block tree.
pub async fn page_with_blocks(client: &NotionClient, page_id: &str) -> Result<(Page, Vec<Block>)> {
    let (page, blocks) = tokio::try_join!(
        retrieve_page(client, page_id),
        fetch_all_blocks(client, page_id)
    )?;
    Ok((page, blocks))
}
