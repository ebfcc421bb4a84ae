//! Traits describing the upstream content sources.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::posts::Post;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upstream responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("embed response was empty")]
    EmptyEmbed,
}

impl SourceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Query parameters for a tagged post listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub tag: String,
    pub limit: u32,
    pub filter: String,
}

impl PostQuery {
    pub fn new(tag: impl Into<String>, limit: u32, filter: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            limit,
            filter: filter.into(),
        }
    }
}

/// A blogging platform that lists a blog's posts by tag.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn posts_by_tag(&self, blog: &str, query: &PostQuery) -> Result<Vec<Post>, SourceError>;
}

/// An oEmbed provider.
#[async_trait]
pub trait EmbedSource: Send + Sync {
    /// Fetch the embed representation of `url`. Implementations must reject
    /// missing or empty bodies with [`SourceError::EmptyEmbed`].
    async fn fetch_oembed(&self, url: &str) -> Result<Value, SourceError>;
}
