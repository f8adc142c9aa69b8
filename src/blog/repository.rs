//! Build-scoped access to published posts.

use tokio::sync::OnceCell;

use crate::blog::grid::filter_posts;
use crate::blog::post::BlogPost;
use crate::blog::source::ContentSource;
use crate::error::Result;

/// Loads posts from a source once and serves lookups from memory.
#[derive(Debug)]
pub struct BlogRepository<S> {
    source: S,
    posts: OnceCell<Vec<BlogPost>>,
}

impl<S: ContentSource> BlogRepository<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            posts: OnceCell::new(),
        }
    }

    /// All published posts; the source is queried on first use only.
    pub async fn all_posts(&self) -> Result<&[BlogPost]> {
        let posts = self
            .posts
            .get_or_try_init(|| self.source.published_posts())
            .await?;
        Ok(posts.as_slice())
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<Option<&BlogPost>> {
        Ok(self.all_posts().await?.iter().find(|post| post.slug == slug))
    }

    pub async fn posts_by_category(&self, category: &str) -> Result<Vec<&BlogPost>> {
        Ok(filter_posts(self.all_posts().await?, category))
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
