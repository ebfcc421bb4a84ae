use std::sync::Arc;

use futures::future::try_join_all;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::application::sources::{EmbedSource, PostQuery, PostSource, SourceError};
use crate::cache::{CacheSlot, FeedCache, FeedData};
use crate::domain::posts::{Poem, Post, is_empty_embed};

pub const ESSAY_TAG: &str = "essay";
pub const POEM_TAG: &str = "instapoem";
pub const FEED_LIMIT: u32 = 10;
pub const FEED_FILTER: &str = "html";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch posts: {0}")]
    Upstream(#[source] SourceError),
    #[error("failed to enrich `{url}`: {source}")]
    Enrichment {
        url: String,
        #[source]
        source: SourceError,
    },
    #[error("failed to encode feed item: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Serves the cached `/posts` and `/poems` feeds, refreshing from upstream on miss.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostSource>,
    embeds: Arc<dyn EmbedSource>,
    cache: Arc<FeedCache>,
    blog: String,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostSource>,
        embeds: Arc<dyn EmbedSource>,
        cache: Arc<FeedCache>,
        blog: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            embeds,
            cache,
            blog: blog.into(),
        }
    }

    /// Posts tagged `essay`.
    #[instrument(skip_all, fields(slot = "posts"))]
    pub async fn posts(&self) -> Result<FeedData, FeedError> {
        if let Some(data) = self.cache.fresh(CacheSlot::Posts) {
            return Ok(data);
        }

        let query = PostQuery::new(ESSAY_TAG, FEED_LIMIT, FEED_FILTER);
        let posts = self.fetch_posts(&query).await?;
        let data = posts.into_iter().map(Post::into_value).collect::<Vec<_>>();

        info!(
            target = "tumbleproxy::feed",
            slot = "posts",
            items = data.len(),
            "refreshed feed"
        );
        Ok(self.cache.set(CacheSlot::Posts, data))
    }

    /// Posts tagged `instapoem`, each enriched with its oEmbed content.
    #[instrument(skip_all, fields(slot = "poems"))]
    pub async fn poems(&self) -> Result<FeedData, FeedError> {
        if let Some(data) = self.cache.fresh(CacheSlot::Poems) {
            return Ok(data);
        }

        let query = PostQuery::new(POEM_TAG, FEED_LIMIT, FEED_FILTER);
        let posts = self.fetch_posts(&query).await?;
        let poems = self.enrich(&posts).await?;
        let data = poems
            .into_iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            target = "tumbleproxy::feed",
            slot = "poems",
            items = data.len(),
            "refreshed feed"
        );
        Ok(self.cache.set(CacheSlot::Poems, data))
    }

    pub async fn fetch_posts(&self, query: &PostQuery) -> Result<Vec<Post>, FeedError> {
        self.posts
            .posts_by_tag(&self.blog, query)
            .await
            .map_err(|err| {
                warn!(
                    target = "tumbleproxy::feed",
                    blog = %self.blog,
                    tag = %query.tag,
                    error = %err,
                    "post fetch failed"
                );
                FeedError::Upstream(err)
            })
    }

    /// Look up every post's embed concurrently. The first failure fails the
    /// whole batch; on success poems are in the same order as `posts`.
    pub async fn enrich(&self, posts: &[Post]) -> Result<Vec<Poem>, FeedError> {
        let embeds = self.embeds.as_ref();
        let lookups = posts.iter().map(move |post| {
            let url = post.source_url();
            async move {
                match embeds.fetch_oembed(&url).await {
                    Ok(content) if !is_empty_embed(&content) => Ok(Poem { content, url }),
                    Ok(_) => Err(FeedError::Enrichment {
                        url,
                        source: SourceError::EmptyEmbed,
                    }),
                    Err(source) => Err(FeedError::Enrichment { url, source }),
                }
            }
        });

        try_join_all(lookups).await
    }
}
