//! Block tree retrieval.

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::notion::client::NotionClient;
use crate::notion::types::{Block, PaginatedList};

const PAGE_SIZE: &str = "100";

/// Fetch every child block of `block_id`, recursing into blocks that have
/// children of their own.
///
/// Blocks the API returns only partially (or of a shape we cannot decode)
/// are skipped.
pub fn fetch_all_blocks<'a>(
    client: &'a NotionClient,
    block_id: &'a str,
) -> BoxFuture<'a, Result<Vec<Block>>> {
    async move {
        let path = format!("/v1/blocks/{}/children", block_id);
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("page_size", PAGE_SIZE.to_string())];
            if let Some(cursor) = &cursor {
                query.push(("start_cursor", cursor.clone()));
            }

            let list: PaginatedList<Value> = client.get_json(&path, &query).await?;
            let next = list.next().map(str::to_string);

            for raw in list.results {
                match serde_json::from_value::<Block>(raw) {
                    Ok(mut block) => {
                        if block.has_children {
                            let children = fetch_all_blocks(client, &block.id).await?;
                            block.children = children;
                        }
                        blocks.push(block);
                    }
                    Err(err) => debug!(block_id, error = %err, "Skipping undecodable block"),
                }
            }

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(blocks)
    }
    .boxed()
}

/// Like [`fetch_all_blocks`], but a failure yields no blocks instead of an
/// error.
pub async fn fetch_all_blocks_lenient(client: &NotionClient, block_id: &str) -> Vec<Block> {
    match fetch_all_blocks(client, block_id).await {
        Ok(blocks) => blocks,
        Err(err) => {
            warn!(block_id, error = %err, "Failed to fetch Notion blocks");
            Vec::new()
        }
    }
}
