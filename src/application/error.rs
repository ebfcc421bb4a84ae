use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{application::feed::FeedError, config::LoadError, infra::error::InfraError};

/// Diagnostic attached to failed responses and logged by the response middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// A failed request. Renders as a bare status code; details stay server-side.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    report: ErrorReport,
}

impl HttpError {
    pub fn new(source: &'static str, status: StatusCode, detail: impl Into<String>) -> Self {
        let report = ErrorReport::from_message(source, status, detail);
        Self { status, report }
    }

    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self { status, report }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn report(&self) -> &ErrorReport {
        &self.report
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<FeedError> for HttpError {
    fn from(error: FeedError) -> Self {
        let source = match &error {
            FeedError::Upstream(_) => "application::feed::fetch_posts",
            FeedError::Enrichment { .. } => "application::feed::enrich",
            FeedError::Encode(_) => "application::feed::encode",
        };
        HttpError::from_error(source, StatusCode::INTERNAL_SERVER_ERROR, &error)
    }
}

/// Top-level failure of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
}
