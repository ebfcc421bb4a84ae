//! Caching proxy in front of a Tumblr blog's tagged posts.
//!
//! `/posts` serves the blog's `essay` posts and `/poems` serves its
//! `instapoem` posts enriched with Instagram oEmbed content. Both feeds are
//! cached for a configurable time-to-live.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
