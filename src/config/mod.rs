//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
mod env_file;

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{CliArgs, Command, ServeArgs, ServeOverrides};
pub use env_file::{DEFAULT_ENV_FILE, EnvDefaults, EnvFileError, EnvFileOutcome};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "tumbleproxy";
const ENV_PREFIX: &str = "TUMBLEPROXY";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_TUMBLR_BLOG: &str = "dbow1234";
const DEFAULT_TUMBLR_BASE_URL: &str = "https://api.tumblr.com";
const DEFAULT_OEMBED_ENDPOINT: &str = "http://api.instagram.com/oembed";
const DEFAULT_CACHE_TTL_SECS: u64 = 60 * 60;

pub const TUMBLR_API_KEY_VAR: &str = "TUMBLR_API_KEY";
pub const TUMBLR_API_SECRET_VAR: &str = "TUMBLR_API_SECRET";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub tumblr: TumblrSettings,
    pub oembed: OEmbedSettings,
    pub cache: CacheSettings,
    pub env_file: EnvFileOutcome,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct TumblrSettings {
    pub blog: String,
    pub base_url: Url,
    pub credentials: TumblrCredentials,
}

/// Consumer key and secret for the Tumblr API. Never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TumblrCredentials {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl TumblrCredentials {
    /// Read credentials from the process environment, defaulted from the env file.
    pub fn from_env(defaults: &EnvDefaults) -> Self {
        Self::resolve_with(defaults, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(defaults: &EnvDefaults, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |value: Option<String>| value.filter(|value| !value.is_empty());
        Self {
            api_key: non_empty(defaults.resolve_with(TUMBLR_API_KEY_VAR, &lookup)),
            api_secret: non_empty(defaults.resolve_with(TUMBLR_API_SECRET_VAR, &lookup)),
        }
    }
}

impl fmt::Debug for TumblrCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("TumblrCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct OEmbedSettings {
    pub endpoint: Url,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    let (defaults, env_file) = EnvDefaults::load(&cli.env_file);
    let credentials = TumblrCredentials::from_env(&defaults);

    let mut settings = Settings::from_raw(raw, credentials)?;
    settings.env_file = env_file;
    Ok(settings)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    use clap::Parser;

    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    tumblr: RawTumblrSettings,
    oembed: RawOEmbedSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(blog) = overrides.tumblr_blog.as_ref() {
            self.tumblr.blog = Some(blog.clone());
        }
        if let Some(url) = overrides.tumblr_base_url.as_ref() {
            self.tumblr.base_url = Some(url.clone());
        }
        if let Some(endpoint) = overrides.oembed_endpoint.as_ref() {
            self.oembed.endpoint = Some(endpoint.clone());
        }
        if let Some(ttl) = overrides.cache_ttl_seconds {
            self.cache.ttl_seconds = Some(ttl);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings, credentials: TumblrCredentials) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            tumblr,
            oembed,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            tumblr: build_tumblr_settings(tumblr, credentials)?,
            oembed: build_oembed_settings(oembed)?,
            cache: build_cache_settings(cache)?,
            env_file: EnvFileOutcome::Missing {
                path: DEFAULT_ENV_FILE.into(),
            },
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_tumblr_settings(
    tumblr: RawTumblrSettings,
    credentials: TumblrCredentials,
) -> Result<TumblrSettings, LoadError> {
    let blog = tumblr
        .blog
        .unwrap_or_else(|| DEFAULT_TUMBLR_BLOG.to_string())
        .trim()
        .to_string();
    if blog.is_empty() {
        return Err(LoadError::invalid("tumblr.blog", "must not be empty"));
    }

    let base_url = parse_http_url(
        tumblr.base_url.as_deref().unwrap_or(DEFAULT_TUMBLR_BASE_URL),
        "tumblr.base_url",
    )?;

    Ok(TumblrSettings {
        blog,
        base_url,
        credentials,
    })
}

fn build_oembed_settings(oembed: RawOEmbedSettings) -> Result<OEmbedSettings, LoadError> {
    let endpoint = parse_http_url(
        oembed.endpoint.as_deref().unwrap_or(DEFAULT_OEMBED_ENDPOINT),
        "oembed.endpoint",
    )?;
    Ok(OEmbedSettings { endpoint })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let ttl_seconds = cache.ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS);
    if ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.ttl_seconds",
            "must be greater than zero",
        ));
    }
    Ok(CacheSettings {
        ttl: Duration::from_secs(ttl_seconds),
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawTumblrSettings {
    blog: Option<String>,
    base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOEmbedSettings {
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    ttl_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_http_url(value: &str, key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(value.trim())
        .map_err(|err| LoadError::invalid(key, format!("invalid url `{value}`: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(LoadError::invalid(
            key,
            format!("`{value}` must be an absolute http(s) url"),
        ));
    }
    Ok(url)
}
