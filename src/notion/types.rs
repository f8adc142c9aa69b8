//! Serde models of the Notion REST objects the blog reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One page of a paginated list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedList<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> PaginatedList<T> {
    /// Cursor for the following request, if any.
    pub fn next(&self) -> Option<&str> {
        if self.has_more {
            self.next_cursor.as_deref()
        } else {
            None
        }
    }
}

/// A database row or standalone page.
///
/// Partial pages (as returned for some integrations) carry only an id;
/// `properties` is `None` for them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub cover: Option<FileObject>,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, PropertyValue>>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Page {
    /// Whether the page carries its properties.
    pub fn is_full(&self) -> bool {
        self.properties.is_some()
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.as_ref()?.get(name)
    }

    /// Plain text of the first property in `names` that has any.
    pub fn first_text<S: AsRef<str>>(&self, names: &[S]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| self.property(name.as_ref()))
            .find_map(PropertyValue::plain_text)
    }

    /// All property values, in name order.
    pub fn property_values(&self) -> impl Iterator<Item = &PropertyValue> {
        self.properties.iter().flat_map(|props| props.values())
    }
}

/// A typed page property.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        title: Vec<RichText>,
    },
    RichText {
        rich_text: Vec<RichText>,
    },
    Date {
        date: Option<DateValue>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    Checkbox {
        checkbox: bool,
    },
    Files {
        files: Vec<FileObject>,
    },
    Url {
        url: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl PropertyValue {
    /// Text form of the value; `None` when empty or not textual.
    pub fn plain_text(&self) -> Option<String> {
        let text = match self {
            PropertyValue::Title { title: text } | PropertyValue::RichText { rich_text: text } => {
                rich_text_plain(text)
            }
            PropertyValue::Date { date } => date.as_ref()?.start.clone(),
            PropertyValue::Select { select: option } | PropertyValue::Status { status: option } => {
                option.as_ref()?.name.clone()
            }
            PropertyValue::Url { url } => url.clone()?,
            _ => return None,
        };
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Option names of a multi-select property.
    pub fn names(&self) -> Vec<String> {
        match self {
            PropertyValue::MultiSelect { multi_select } => {
                multi_select.iter().map(|option| option.name.clone()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// First file of a files property.
    pub fn first_file(&self) -> Option<&FileObject> {
        match self {
            PropertyValue::Files { files } => files.first(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DateValue {
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A span of formatted text.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct RichText {
    /// `text`, `mention` or `equation`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub plain_text: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
}

impl RichText {
    /// Unformatted text span.
    pub fn plain(text: &str) -> Self {
        Self {
            kind: "text".to_string(),
            plain_text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn is_equation(&self) -> bool {
        self.kind == "equation"
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: String,
}

/// Concatenated plain text of rich text spans.
pub fn rich_text_plain(text: &[RichText]) -> String {
    text.iter().map(|t| t.plain_text.as_str()).collect()
}

/// An uploaded (`file`) or linked (`external`) file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    External {
        external: FileUrl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    File {
        file: FileUrl,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl FileObject {
    pub fn url(&self) -> &str {
        match self {
            FileObject::External { external, .. } => &external.url,
            FileObject::File { file, .. } => &file.url,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            FileObject::External { name, .. } | FileObject::File { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<String>,
}

/// A content block. `children` is filled in by the block fetcher.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(skip)]
    pub children: Vec<Block>,
}

impl Block {
    pub fn new(id: &str, kind: BlockKind) -> Self {
        Self {
            id: id.to_string(),
            has_children: false,
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.has_children = !children.is_empty();
        self.children = children;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    Paragraph {
        paragraph: TextBlock,
    },
    #[serde(rename = "heading_1")]
    Heading1 {
        heading_1: TextBlock,
    },
    #[serde(rename = "heading_2")]
    Heading2 {
        heading_2: TextBlock,
    },
    #[serde(rename = "heading_3")]
    Heading3 {
        heading_3: TextBlock,
    },
    BulletedListItem {
        bulleted_list_item: TextBlock,
    },
    NumberedListItem {
        numbered_list_item: TextBlock,
    },
    ToDo {
        to_do: ToDoBlock,
    },
    Toggle {
        toggle: TextBlock,
    },
    Quote {
        quote: TextBlock,
    },
    Callout {
        callout: CalloutBlock,
    },
    Code {
        code: CodeContent,
    },
    Divider,
    Image {
        image: MediaBlock,
    },
    Video {
        video: MediaBlock,
    },
    File {
        file: MediaBlock,
    },
    Pdf {
        pdf: MediaBlock,
    },
    Embed {
        embed: LinkBlock,
    },
    Bookmark {
        bookmark: LinkBlock,
    },
    LinkPreview {
        link_preview: LinkBlock,
    },
    Equation {
        equation: EquationBlock,
    },
    Table {
        table: TableBlock,
    },
    TableRow {
        table_row: TableRowBlock,
    },
    ColumnList,
    Column,
    SyncedBlock,
    ChildPage {
        child_page: ChildPageBlock,
    },
    #[serde(other)]
    Unsupported,
}

/// Rich text payload shared by paragraphs, headings, list items and friends.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub is_toggleable: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ToDoBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CalloutBlock {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub icon: Option<Icon>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji {
        emoji: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CodeContent {
    #[serde(default)]
    pub rich_text: Vec<RichText>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

/// Image, video, file and PDF payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MediaBlock {
    #[serde(flatten)]
    pub source: FileObject,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LinkBlock {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub caption: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EquationBlock {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TableBlock {
    #[serde(default)]
    pub table_width: usize,
    #[serde(default)]
    pub has_column_header: bool,
    #[serde(default)]
    pub has_row_header: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TableRowBlock {
    #[serde(default)]
    pub cells: Vec<Vec<RichText>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChildPageBlock {
    #[serde(default)]
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_page() -> Page {
        serde_json::from_value(json!({
            "object": "page",
            "id": "page-1",
            "created_time": "2024-03-01T10:00:00.000Z",
            "cover": { "type": "external", "external": { "url": "https://img.test/cover.png" } },
            "properties": {
                "Titulo": { "id": "title", "type": "title", "title": [
                    { "type": "text", "plain_text": "Hola ", "annotations": { "bold": true } },
                    { "type": "text", "plain_text": "Mundo" }
                ]},
                "Resumen": { "id": "r", "type": "rich_text", "rich_text": [] },
                "Published Date": { "id": "d", "type": "date", "date": { "start": "2024-03-01" } },
                "Tags": { "id": "t", "type": "multi_select", "multi_select": [
                    { "name": "rust", "color": "red" }, { "name": "web" }
                ]},
                "Estado": { "id": "s", "type": "status", "status": { "name": "Publicado" } },
                "Votes": { "id": "v", "type": "rollup", "rollup": {} }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_page_properties() {
        let page = sample_page();
        assert!(page.is_full());
        assert_eq!(page.first_text(&["Titulo", "Name"]).as_deref(), Some("Hola Mundo"));
        assert_eq!(page.first_text(&["Description", "Resumen"]), None);
        assert_eq!(
            page.first_text(&["Published Date"]).as_deref(),
            Some("2024-03-01")
        );
        assert_eq!(page.first_text(&["Estado"]).as_deref(), Some("Publicado"));
        assert_eq!(
            page.property("Tags").map(PropertyValue::names),
            Some(vec!["rust".to_string(), "web".to_string()])
        );
        assert_eq!(page.property("Votes"), Some(&PropertyValue::Unknown));
        assert_eq!(
            page.cover.as_ref().map(FileObject::url),
            Some("https://img.test/cover.png")
        );
    }

    #[test]
    fn test_partial_page() {
        let page: Page = serde_json::from_value(json!({ "object": "page", "id": "p" })).unwrap();
        assert!(!page.is_full());
        assert_eq!(page.first_text(&["Titulo"]), None);
    }

    #[test]
    fn test_paginated_list_cursor() {
        let list: PaginatedList<Page> = serde_json::from_value(json!({
            "results": [], "has_more": true, "next_cursor": "abc"
        }))
        .unwrap();
        assert_eq!(list.next(), Some("abc"));

        let done: PaginatedList<Page> = serde_json::from_value(json!({
            "results": [], "has_more": false, "next_cursor": "stale"
        }))
        .unwrap();
        assert_eq!(done.next(), None);
    }

    #[test]
    fn test_block_kinds() {
        let heading: Block = serde_json::from_value(json!({
            "object": "block", "id": "b1", "type": "heading_2", "has_children": false,
            "heading_2": { "rich_text": [{ "type": "text", "plain_text": "Intro" }], "is_toggleable": false }
        }))
        .unwrap();
        assert!(matches!(heading.kind, BlockKind::Heading2 { .. }));

        let divider: Block = serde_json::from_value(json!({
            "object": "block", "id": "b2", "type": "divider", "divider": {}
        }))
        .unwrap();
        assert_eq!(divider.kind, BlockKind::Divider);

        let image: Block = serde_json::from_value(json!({
            "object": "block", "id": "b3", "type": "image",
            "image": { "type": "file", "file": { "url": "https://s3.test/a.png", "expiry_time": "x" }, "caption": [] }
        }))
        .unwrap();
        let BlockKind::Image { image } = image.kind else {
            panic!("Expected image");
        };
        assert_eq!(image.source.url(), "https://s3.test/a.png");

        let unknown: Block = serde_json::from_value(json!({
            "object": "block", "id": "b4", "type": "breadcrumb", "breadcrumb": {}
        }))
        .unwrap();
        assert_eq!(unknown.kind, BlockKind::Unsupported);
    }

    #[test]
    fn test_partial_block_fails_to_decode() {
        let result = serde_json::from_value::<Block>(json!({ "object": "block", "id": "b5" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_equation_rich_text() {
        let text: RichText = serde_json::from_value(json!({
            "type": "equation", "equation": { "expression": "e=mc^2" }, "plain_text": "e=mc^2"
        }))
        .unwrap();
        assert!(text.is_equation());
        assert!(!text.annotations.bold);
    }
}
