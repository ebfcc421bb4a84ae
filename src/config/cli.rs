use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

use super::env_file::DEFAULT_ENV_FILE;

/// Command-line arguments for the tumbleproxy binary.
#[derive(Debug, Parser)]
#[command(
    name = "tumbleproxy",
    version,
    about = "Caching proxy for tagged Tumblr posts and their Instagram embeds"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "TUMBLEPROXY_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// JSON file supplying defaults for unset environment variables.
    #[arg(
        long = "env-file",
        env = "TUMBLEPROXY_ENV_FILE",
        value_name = "PATH",
        default_value = DEFAULT_ENV_FILE
    )]
    pub env_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP proxy.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the blog whose posts are proxied.
    #[arg(long = "tumblr-blog", value_name = "BLOG")]
    pub tumblr_blog: Option<String>,

    /// Override the Tumblr API base URL.
    #[arg(long = "tumblr-base-url", value_name = "URL")]
    pub tumblr_base_url: Option<String>,

    /// Override the oEmbed endpoint used to enrich poems.
    #[arg(long = "oembed-endpoint", value_name = "URL")]
    pub oembed_endpoint: Option<String>,

    /// Override the feed cache time-to-live.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,
}
