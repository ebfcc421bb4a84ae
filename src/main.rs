use std::{process, sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;
use tumbleproxy::{
    application::{error::AppError, feed::FeedService},
    cache::{CacheConfig, FeedCache, SystemClock},
    config::{self, TUMBLR_API_KEY_VAR},
    infra::{
        error::InfraError,
        http::{self, HttpState},
        oembed::OEmbedClient,
        telemetry,
        tumblr::TumblrClient,
        upstream,
    },
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;
    settings.env_file.log();

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    if settings.tumblr.credentials.api_key.is_none() {
        warn!(
            target = "tumbleproxy::config",
            variable = TUMBLR_API_KEY_VAR,
            "no Tumblr API key configured, upstream requests will likely be rejected"
        );
    }

    let feed = build_feed_service(&settings)?;
    serve_http(&settings, HttpState::new(feed)).await
}

fn build_feed_service(settings: &config::Settings) -> Result<Arc<FeedService>, AppError> {
    let client = upstream::build_client()?;
    let posts = TumblrClient::from_settings(client.clone(), &settings.tumblr);
    let embeds = OEmbedClient::new(client, settings.oembed.endpoint.clone());
    let cache = FeedCache::new(
        CacheConfig::from(&settings.cache),
        Arc::new(SystemClock),
    );

    Ok(Arc::new(FeedService::new(
        Arc::new(posts),
        Arc::new(embeds),
        Arc::new(cache),
        settings.tumblr.blog.clone(),
    )))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;
    info!(
        target = "tumbleproxy::http",
        addr = %settings.server.addr,
        blog = %settings.tumblr.blog,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(InfraError::from)?;

    info!(target = "tumbleproxy::http", "server stopped");
    Ok(())
}

/// Resolve on ctrl-c, arming a watchdog that exits once `grace` elapses.
async fn shutdown_signal(grace: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    info!(
        target = "tumbleproxy::http",
        grace_seconds = grace.as_secs(),
        "shutdown requested, draining connections"
    );

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "tumbleproxy::http",
            "graceful shutdown timed out, exiting"
        );
        process::exit(1);
    });
}
