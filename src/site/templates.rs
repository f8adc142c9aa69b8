//! Page templates.
//!
//! Built-in templates are compiled into the binary. A template directory
//! can override any of them by providing a file with the same name.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use minijinja::{context, AutoEscape, Environment, ErrorKind, Output, State, Value};
use serde::Serialize;

use crate::blog::{category_url, parse_date, post_url, BlogPost, GridState};
use crate::config::{SiteConfig, SiteSection};
use crate::error::Result;
use crate::render::escape_html;

/// Number of posts shown on the home page.
pub const LATEST_POSTS: usize = 3;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("blog.html", include_str!("../../templates/blog.html")),
    ("post.html", include_str!("../../templates/post.html")),
    ("post_card.html", include_str!("../../templates/post_card.html")),
];

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Look up a built-in template by name.
pub fn builtin_template(name: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == name)
        .map(|(_, source)| *source)
}

/// Format a post date as `1 de mayo de 2024`; unparseable input is returned as is.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => format!(
            "{} de {} de {}",
            date.day(),
            MONTHS[date.month0() as usize],
            date.year()
        ),
        None => raw.to_string(),
    }
}

/// A category filter button of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryButton {
    pub label: String,
    /// Category value; empty for the button showing every post.
    pub category: String,
    pub url: String,
    pub active: bool,
}

/// Filter buttons for `state`, starting with "Todos".
pub fn category_buttons(state: &GridState) -> Vec<CategoryButton> {
    std::iter::once(String::new())
        .chain(state.categories.iter().cloned())
        .map(|category| CategoryButton {
            label: if category.is_empty() {
                "Todos".to_string()
            } else {
                category.clone()
            },
            url: category_url(&category),
            active: state.is_selected(&category),
            category,
        })
        .collect()
}

/// Renders the site pages.
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
    site: SiteSection,
}

impl Templates {
    pub fn new(site: SiteSection, templates_dir: Option<&Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(template_loader(templates_dir.map(Path::to_path_buf)));
        env.set_formatter(format_value);
        env.add_filter("format_date", format_date);
        env.add_filter("category_url", category_url);
        env.add_filter("post_url", post_url);
        env.add_global("year", Utc::now().year());
        Self { env, site }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.site.clone(), config.build.templates_dir.as_deref())
    }

    /// Home page with the latest posts.
    pub fn render_index(&self, posts: &[BlogPost]) -> Result<String> {
        let latest = &posts[..posts.len().min(LATEST_POSTS)];
        self.render(
            "index.html",
            context! {
                site => &self.site,
                path => "",
                posts => latest,
            },
        )
    }

    /// Post grid filtered by the state's selected category.
    pub fn render_blog(&self, posts: &[BlogPost], state: &GridState) -> Result<String> {
        let path = match &state.selected {
            Some(category) => category_url(category),
            None => category_url(""),
        };
        self.render(
            "blog.html",
            context! {
                site => &self.site,
                path => path,
                posts => state.visible(posts),
                buttons => category_buttons(state),
                categories => &state.categories,
                selected => &state.selected,
            },
        )
    }

    pub fn render_post(&self, post: &BlogPost) -> Result<String> {
        self.render(
            "post.html",
            context! {
                site => &self.site,
                path => post_url(&post.slug),
                post => post,
            },
        )
    }

    fn render(&self, name: &str, ctx: Value) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}

/// HTML-escape output with the same entities as rendered post content, so
/// URLs keep their slashes.
fn format_value(
    out: &mut Output,
    state: &State,
    value: &Value,
) -> std::result::Result<(), minijinja::Error> {
    if !value.is_safe() && matches!(state.auto_escape(), AutoEscape::Html) {
        write!(out, "{}", escape_html(&value.to_string()))?;
    } else {
        write!(out, "{}", value)?;
    }
    Ok(())
}

/// Resolve `name` from the override directory first, then the built-ins.
fn template_loader(
    dir: Option<PathBuf>,
) -> impl Fn(&str) -> std::result::Result<Option<String>, minijinja::Error> + Send + Sync + 'static
{
    move |name| {
        if let Some(path) = dir.as_deref().and_then(|dir| safe_join(dir, name)) {
            match fs::read_to_string(&path) {
                Ok(source) => return Ok(Some(source)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => {
                    return Err(minijinja::Error::new(
                        ErrorKind::InvalidOperation,
                        "could not read template",
                    )
                    .with_source(err))
                }
            }
        }
        Ok(builtin_template(name).map(str::to_string))
    }
}

/// Join a template name onto `base`, refusing hidden segments and backslashes.
fn safe_join(base: &Path, name: &str) -> Option<PathBuf> {
    let mut path = base.to_path_buf();
    for segment in name.split('/') {
        if segment.starts_with('.') || segment.contains('\\') {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn post(slug: &str, tags: &[&str]) -> BlogPost {
        BlogPost {
            id: slug.into(),
            title: format!("Título {}", slug),
            slug: slug.into(),
            description: "Descripción <breve>".into(),
            date: "2024-05-01".into(),
            cover_image: "/assets/first_img.png".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content: "<p>Hola <strong>mundo</strong></p>".into(),
            published: true,
        }
    }

    fn templates() -> Templates {
        Templates::new(SiteSection::default(), None)
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01"), "1 de mayo de 2024");
        assert_eq!(format_date("2023-12-24T10:00:00.000Z"), "24 de diciembre de 2023");
        assert_eq!(format_date("pronto"), "pronto");
    }

    #[test]
    fn test_category_buttons() {
        let posts = vec![post("a", &["web", "rust"])];
        let mut state = GridState::new(&posts);
        state.select("rust");

        let buttons = category_buttons(&state);
        let labels: Vec<&str> = buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Todos", "rust", "web"]);
        assert!(!buttons[0].active);
        assert!(buttons[1].active);
        assert_eq!(buttons[0].url, "/blog");
        assert_eq!(buttons[1].url, "/blog?category=rust");
    }

    #[test]
    fn test_render_post_keeps_content_html() {
        let html = templates().render_post(&post("hola", &["rust"])).unwrap();
        assert!(html.contains("<title>Título hola | Carlos Quinza</title>"));
        assert!(html.contains("<p>Hola <strong>mundo</strong></p>"));
        assert!(html.contains("Descripción &lt;breve&gt;"));
        assert!(html.contains("1 de mayo de 2024"));
        assert!(html.contains("href=\"/blog?category=rust\""));
        assert!(html.contains("<link rel=\"canonical\" href=\"https://carlosquinza.es/blog/hola\">"));
    }

    #[test]
    fn test_render_blog_filters_by_selection() {
        let posts = vec![post("a", &["rust"]), post("b", &["web"])];
        let mut state = GridState::new(&posts);
        state.select("web");

        let html = templates().render_blog(&posts, &state).unwrap();
        assert!(html.contains("href=\"/blog/b\""));
        assert!(!html.contains("href=\"/blog/a\""));
        assert!(html.contains(">Todos</a>"));
        assert!(html.contains("category-button active\" href=\"/blog?category=web\""));
    }

    #[test]
    fn test_render_blog_empty_messages() {
        let html = templates().render_blog(&[], &GridState::new(&[])).unwrap();
        assert!(html.contains("No hay artículos disponibles."));
    }

    #[test]
    fn test_render_index_limits_posts() {
        let posts: Vec<BlogPost> = (0..5).map(|i| post(&format!("p{}", i), &[])).collect();
        let html = templates().render_index(&posts).unwrap();
        assert!(html.contains("href=\"/blog/p2\""));
        assert!(!html.contains("href=\"/blog/p3\""));
    }

    #[test]
    fn test_post_links_encode_slug() {
        let posts = vec![post("mi post", &[])];
        let html = templates().render_index(&posts).unwrap();
        assert!(html.contains("href=\"/blog/mi%20post\""));

        let html = templates().render_post(&posts[0]).unwrap();
        assert!(html.contains("href=\"https://carlosquinza.es/blog/mi%20post\""));
    }

    #[test]
    fn test_override_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("post.html"), "custom {{ post.slug }}").unwrap();

        let templates = Templates::new(SiteSection::default(), Some(dir.path()));
        assert_eq!(templates.render_post(&post("x", &[])).unwrap(), "custom x");
        // Templates without an override still come from the built-ins
        assert!(templates.render_index(&[]).unwrap().contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_safe_join_rejects_hidden_segments() {
        let base = Path::new("/tmp/templates");
        assert_eq!(safe_join(base, "a/b.html"), Some(base.join("a").join("b.html")));
        assert_eq!(safe_join(base, "../secret"), None);
        assert_eq!(safe_join(base, "a\\b"), None);
    }
}
