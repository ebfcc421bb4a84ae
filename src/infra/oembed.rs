//! oEmbed provider adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::application::sources::{EmbedSource, SourceError};
use crate::domain::posts::is_empty_embed;

use super::upstream::error_message;

#[derive(Clone)]
pub struct OEmbedClient {
    client: Client,
    endpoint: Url,
}

impl OEmbedClient {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn lookup_url(&self, url: &str) -> Url {
        let mut lookup = self.endpoint.clone();
        lookup
            .query_pairs_mut()
            .append_pair("url", url)
            .append_pair("beta", "true")
            .append_pair("omitscript", "true");
        lookup
    }
}

#[async_trait]
impl EmbedSource for OEmbedClient {
    async fn fetch_oembed(&self, url: &str) -> Result<Value, SourceError> {
        debug!(target = "tumbleproxy::oembed", url, "fetching embed");

        let response = self
            .client
            .get(self.lookup_url(url))
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
        if body.trim().is_empty() {
            return Err(SourceError::EmptyEmbed);
        }

        let content: Value = serde_json::from_str(&body).map_err(SourceError::decode)?;
        if is_empty_embed(&content) {
            return Err(SourceError::EmptyEmbed);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn client(server: &MockServer) -> OEmbedClient {
        OEmbedClient::new(
            Client::new(),
            Url::parse(&server.url("/oembed")).expect("endpoint"),
        )
    }

    #[tokio::test]
    async fn sends_fixed_options() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("GET")
                .path("/oembed")
                .query_param("url", "https://instagram.com/p/abc")
                .query_param("beta", "true")
                .query_param("omitscript", "true");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"html":"<blockquote>poem</blockquote>","author_name":"dbow"}"#);
        });

        let content = client(&server)
            .fetch_oembed("https://instagram.com/p/abc")
            .await
            .expect("embed");

        mock.assert();
        assert_eq!(
            content,
            json!({ "html": "<blockquote>poem</blockquote>", "author_name": "dbow" })
        );
    }

    #[tokio::test]
    async fn empty_object_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/oembed");
            then.status(200)
                .header("content-type", "application/json")
                .body("{}");
        });

        let err = client(&server)
            .fetch_oembed("https://instagram.com/p/abc")
            .await
            .expect_err("empty body should fail");
        assert!(matches!(err, SourceError::EmptyEmbed));
    }

    #[tokio::test]
    async fn missing_body_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/oembed");
            then.status(200);
        });

        let err = client(&server)
            .fetch_oembed("https://instagram.com/p/abc")
            .await
            .expect_err("missing body should fail");
        assert!(matches!(err, SourceError::EmptyEmbed));
    }

    #[tokio::test]
    async fn non_json_body_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/oembed");
            then.status(200).body("<html>login</html>");
        });

        let err = client(&server)
            .fetch_oembed("https://instagram.com/p/abc")
            .await
            .expect_err("html body should fail");
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/oembed");
            then.status(404).body("not found");
        });

        let err = client(&server)
            .fetch_oembed("")
            .await
            .expect_err("404 should fail");
        assert!(matches!(err, SourceError::Status { status: 404, .. }));
    }
}
