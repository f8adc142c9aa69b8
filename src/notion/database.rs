//! Database queries.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::PropertyNames;
use crate::error::Result;
use crate::notion::client::NotionClient;
use crate::notion::pages::retrieve_page;
use crate::notion::types::{PaginatedList, Page};

const PAGE_SIZE: u32 = 100;

/// Query a database, following pagination to the end.
///
/// Partial results (pages returned without properties) are resolved with a
/// page retrieval so every returned [`Page`] is full.
pub async fn query_database(
    client: &NotionClient,
    database_id: &str,
    filter: Option<&Value>,
    sorts: Option<&Value>,
) -> Result<Vec<Page>> {
    let path = format!("/v1/databases/{}/query", database_id);
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let mut body = Map::new();
        body.insert("page_size".into(), json!(PAGE_SIZE));
        if let Some(filter) = filter {
            body.insert("filter".into(), filter.clone());
        }
        if let Some(sorts) = sorts {
            body.insert("sorts".into(), sorts.clone());
        }
        if let Some(cursor) = &cursor {
            body.insert("start_cursor".into(), json!(cursor));
        }

        let list: PaginatedList<Page> = client.post_json(&path, &Value::Object(body)).await?;
        debug!(database_id, count = list.results.len(), "Queried Notion database");
        let next = list.next().map(str::to_string);

        for page in list.results {
            if page.is_full() {
                pages.push(page);
            } else {
                debug!(page_id = %page.id, "Resolving partial page");
                pages.push(retrieve_page(client, &page.id).await?);
            }
        }

        match next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(pages)
}

/// Filter and sort selecting published posts, newest first.
///
/// A post is published when its status column equals the published value
/// and its title is not empty.
pub fn published_posts_query(names: &PropertyNames) -> (Value, Value) {
    let title = names.title.first().map(String::as_str).unwrap_or("Titulo");
    let date = names.date.first().map(String::as_str).unwrap_or("Published Date");

    let filter = json!({
        "and": [
            { "property": names.status, "status": { "equals": names.published_status } },
            { "property": title, "title": { "is_not_empty": true } }
        ]
    });
    let sorts = json!([{ "property": date, "direction": "descending" }]);

    (filter, sorts)
}
