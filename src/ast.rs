//! Abstract Syntax Tree definitions for blog Markdown.

/// A complete parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Front matter metadata
    pub front_matter: FrontMatter,
    /// Document content as a sequence of blocks
    pub blocks: Vec<Block>,
}

/// Post metadata from YAML (`---`) or TOML (`+++`) front matter.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Publication date as written in the source (usually `YYYY-MM-DD`).
    pub date: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    /// Drafts set this to `false`.
    pub published: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            description: None,
            date: None,
            cover_image: None,
            tags: Vec::new(),
            published: true,
        }
    }
}

/// Block-level elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph of inline content
    Paragraph(Vec<Inline>),

    /// A heading with level (1-6) and content
    Heading { level: u8, content: Vec<Inline> },

    /// A fenced code block
    CodeBlock {
        language: Option<String>,
        content: String,
    },

    /// A block quote
    BlockQuote(Vec<Block>),

    /// An ordered or unordered list
    List {
        ordered: bool,
        start: Option<u32>,
        items: Vec<ListItem>,
    },

    /// A thematic break (horizontal rule)
    ThematicBreak,

    /// Raw HTML block, kept verbatim
    HtmlBlock(String),

    /// A pipe table
    Table {
        headers: Vec<Vec<Inline>>,
        alignments: Vec<Alignment>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
}

/// List item containing blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<Block>,
    /// `Some` for task list items.
    pub checked: Option<bool>,
}

/// Table column alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Inline-level elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Plain text
    Text(String),

    /// Emphasized text (italic)
    Emphasis(Vec<Inline>),

    /// Strong text (bold)
    Strong(Vec<Inline>),

    /// Strikethrough text
    Strikethrough(Vec<Inline>),

    /// Inline code
    Code(String),

    /// A link
    Link {
        url: String,
        title: Option<String>,
        content: Vec<Inline>,
    },

    /// An image
    Image {
        url: String,
        alt: String,
        title: Option<String>,
    },

    /// A soft line break
    SoftBreak,

    /// A hard line break
    HardBreak,

    /// Raw HTML inline
    RawHtml(String),
}

impl Inline {
    /// Plain text of an inline tree, used for heading slugs and image alt text.
    pub fn plain_text(inlines: &[Inline]) -> String {
        let mut out = String::new();
        collect_text(inlines, &mut out);
        out
    }
}

fn collect_text(inlines: &[Inline], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(t) | Inline::Code(t) => out.push_str(t),
            Inline::Emphasis(inner) | Inline::Strong(inner) | Inline::Strikethrough(inner) => {
                collect_text(inner, out)
            }
            Inline::Link { content, .. } => collect_text(content, out),
            Inline::Image { alt, .. } => out.push_str(alt),
            Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            Inline::RawHtml(_) => {}
        }
    }
}
