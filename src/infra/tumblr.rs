//! Tumblr v2 API adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::application::sources::{PostQuery, PostSource, SourceError};
use crate::config::TumblrSettings;
use crate::domain::posts::Post;

use super::upstream::error_message;

/// Reads public blog posts with a consumer key.
#[derive(Clone)]
pub struct TumblrClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl TumblrClient {
    pub fn new(client: Client, base_url: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn from_settings(client: Client, settings: &TumblrSettings) -> Self {
        Self::new(
            client,
            settings.base_url.clone(),
            settings.credentials.api_key.clone(),
        )
    }

    fn posts_url(&self, blog: &str, query: &PostQuery) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        let blog = blog_identifier(blog);
        url.path_segments_mut()
            .map_err(|_| SourceError::transport("tumblr base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["v2", "blog", blog.as_str(), "posts"]);

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(key) = self.api_key.as_deref() {
                pairs.append_pair("api_key", key);
            }
            pairs
                .append_pair("tag", &query.tag)
                .append_pair("limit", &query.limit.to_string())
                .append_pair("filter", &query.filter);
        }

        Ok(url)
    }
}

#[async_trait]
impl PostSource for TumblrClient {
    async fn posts_by_tag(&self, blog: &str, query: &PostQuery) -> Result<Vec<Post>, SourceError> {
        let url = self.posts_url(blog, query)?;
        debug!(
            target = "tumbleproxy::tumblr",
            blog,
            tag = %query.tag,
            limit = query.limit,
            "fetching posts"
        );

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SourceError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(SourceError::transport)?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        let mut envelope: Value = serde_json::from_str(&body).map_err(SourceError::decode)?;
        match envelope.pointer_mut("/response/posts").map(Value::take) {
            Some(Value::Array(posts)) => Ok(posts.into_iter().map(Post::new).collect()),
            _ => Err(SourceError::decode("response.posts is missing or not an array")),
        }
    }
}

/// Expand a bare blog name into its `*.tumblr.com` hostname.
pub fn blog_identifier(blog: &str) -> String {
    if blog.contains('.') {
        blog.to_string()
    } else {
        format!("{blog}.tumblr.com")
    }
}
