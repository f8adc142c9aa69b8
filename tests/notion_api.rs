use std::time::Duration;

use serde_json::{json, Value};
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use notion_blog::blog::{ContentSource, NotionSource};
use notion_blog::notion::{
    fetch_all_blocks, fetch_all_blocks_lenient, page_with_blocks, retrieve_page, BlockKind,
    ClientOptions, NotionClient,
};
use notion_blog::{Error, NotionError};

fn client(server: &MockServer) -> NotionClient {
    NotionClient::new(
        ClientOptions::new("secret")
            .base_url(server.uri())
            .retry_delay(Duration::from_millis(5)),
    )
    .unwrap()
}

fn text(content: &str) -> Value {
    json!({
        "type": "text",
        "plain_text": content,
        "href": null,
        "annotations": { "bold": false, "italic": false, "strikethrough": false,
                         "underline": false, "code": false, "color": "default" }
    })
}

fn bold(content: &str) -> Value {
    let mut value = text(content);
    value["annotations"]["bold"] = json!(true);
    value
}

fn page(id: &str, title: &str, date: &str, tags: &[&str]) -> Value {
    json!({
        "object": "page",
        "id": id,
        "created_time": "2024-04-30T10:00:00.000Z",
        "last_edited_time": "2024-05-02T10:00:00.000Z",
        "cover": { "type": "external", "external": { "url": format!("https://img.test/{}.png", id) } },
        "properties": {
            "Titulo": { "id": "title", "type": "title", "title": [text(title)] },
            "Published Date": { "id": "d", "type": "date", "date": { "start": date, "end": null } },
            "Tags": { "id": "t", "type": "multi_select",
                      "multi_select": tags.iter().map(|t| json!({ "name": t })).collect::<Vec<_>>() },
            "Estado": { "id": "s", "type": "status", "status": { "name": "Publicado" } },
            "Description": { "id": "r", "type": "rich_text", "rich_text": [text("Resumen")] }
        },
        "url": format!("https://www.notion.so/{}", id)
    })
}

fn list(results: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "object": "list",
        "results": results,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor
    })
}

#[tokio::test]
async fn test_notion_source_renders_published_posts() {
    let server = MockServer::start().await;

    // First page of the query; the second page returns a partial page
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .and(header("Authorization", "Bearer secret"))
        .and(header("Notion-Version", "2022-06-28"))
        .and(body_partial_json(json!({ "start_cursor": "c2" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list(vec![json!({ "id": "page-2" })], None)),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/databases/db-1/query"))
        .and(body_partial_json(json!({
            "page_size": 100,
            "filter": { "and": [
                { "property": "Estado", "status": { "equals": "Publicado" } },
                { "property": "Titulo", "title": { "is_not_empty": true } }
            ] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(list(
            vec![page("page-1", "Hola Mundo", "2024-05-01", &["rust", "web"])],
            Some("c2"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/pages/page-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page("page-2", "Segundo", "2024-04-01", &[])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/blocks/page-1/children"))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list(
            vec![
                json!({ "object": "block", "id": "b1", "type": "heading_1", "has_children": false,
                        "heading_1": { "rich_text": [text("Intro")] } }),
                json!({ "object": "block", "id": "b2", "type": "paragraph", "has_children": false,
                        "paragraph": { "rich_text": [bold("Hola"), text(" mundo")] } }),
                json!({ "object": "block", "id": "t1", "type": "toggle", "has_children": true,
                        "toggle": { "rich_text": [text("Más")] } }),
                json!({ "object": "block", "id": "b3", "type": "unsupported", "has_children": false,
                        "unsupported": {} }),
            ],
            None,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/t1/children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list(
            vec![json!({ "object": "block", "id": "b4", "type": "paragraph", "has_children": false,
                         "paragraph": { "rich_text": [text("dentro")] } })],
            None,
        )))
        .mount(&server)
        .await;

    // The second post's content keeps failing, so it is published empty
    Mock::given(method("GET"))
        .and(path("/v1/blocks/page-2/children"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "object": "error", "status": 500, "code": "internal_server_error", "message": "boom"
        })))
        .mount(&server)
        .await;

    let source = NotionSource::new(client(&server), "db-1").default_cover("/assets/first_img.png");
    let posts = source.published_posts().await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].id, "page-2");
    assert_eq!(posts[1].title, "Segundo");
    assert!(posts[1].content.trim().is_empty());

    let post = &posts[0];
    assert_eq!(post.id, "page-1");
    assert_eq!(post.title, "Hola Mundo");
    assert_eq!(post.slug, "hola-mundo");
    assert_eq!(post.description, "Resumen");
    assert_eq!(post.date, "2024-05-01");
    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
    assert_eq!(post.cover_image, "https://img.test/page-1.png");
    assert!(post.content.contains("<h1 id=\"intro\""));
    assert!(post.content.contains("<strong>Hola</strong> mundo"));
    assert!(post.content.contains("<details><summary>Más</summary>"));
    assert!(post.content.contains("<p>dentro</p>"));
}

#[tokio::test]
async fn test_retries_server_errors_and_rate_limits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/pages/p"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/p"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/pages/p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page("p", "Ok", "2024-01-01", &[])))
        .expect(1)
        .mount(&server)
        .await;

    let page = retrieve_page(&client(&server), "p").await.unwrap();
    assert_eq!(page.id, "p");
    assert!(page.is_full());
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/pages/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find page"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = retrieve_page(&client(&server), "missing").await.unwrap_err();
    match err {
        Error::Notion(NotionError::Api {
            status,
            code,
            message,
        }) => {
            assert_eq!(status, 404);
            assert_eq!(code, "object_not_found");
            assert_eq!(message, "Could not find page");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_get_requests_are_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/pages/cached"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page("cached", "Uno", "2024-01-01", &[])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let first = retrieve_page(&client, "cached").await.unwrap();
    let second = retrieve_page(&client, "cached").await.unwrap();
    assert_eq!(first, second);
}

fn paragraph(id: &str, content: &str) -> Value {
    json!({ "object": "block", "id": id, "type": "paragraph", "has_children": false,
            "paragraph": { "rich_text": [text(content)] } })
}

#[tokio::test]
async fn test_block_children_are_paginated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/blocks/long/children"))
        .and(query_param("start_cursor", "next-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list(vec![paragraph("b3", "tres")], None)),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/long/children"))
        .and(query_param("page_size", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list(
            vec![paragraph("b1", "uno"), paragraph("b2", "dos")],
            Some("next-1"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let blocks = fetch_all_blocks(&client(&server), "long").await.unwrap();
    let ids: Vec<&str> = blocks.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["b1", "b2", "b3"]);
}

#[tokio::test]
async fn test_page_with_blocks_joins_page_and_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/pages/full"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page("full", "Completo", "2024-03-01", &[])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/blocks/full/children"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(list(vec![paragraph("b1", "hola")], None)),
        )
        .mount(&server)
        .await;

    let (page, blocks) = page_with_blocks(&client(&server), "full").await.unwrap();
    assert_eq!(page.id, "full");
    assert_eq!(blocks.len(), 1);
    assert!(matches!(blocks[0].kind, BlockKind::Paragraph { .. }));
}

#[tokio::test]
async fn test_lenient_block_fetch_returns_nothing_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/blocks/gone/children"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error", "status": 404, "code": "object_not_found", "message": "missing"
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(fetch_all_blocks(&client, "gone").await.is_err());
    assert!(fetch_all_blocks_lenient(&client, "gone").await.is_empty());
}
