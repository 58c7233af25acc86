//! Command-line and layered configuration for the `serve` command.

use std::net::SocketAddr;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pota_cache_data::{DEFAULT_OVERPASS_URL, DEFAULT_PARK_FEED_URL};
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

pub(crate) const ARG_BIND: &str = "bind";
pub(crate) const ARG_OVERPASS_URL: &str = "overpass-url";
pub(crate) const ARG_PARK_FEED_URL: &str = "park-feed-url";
pub(crate) const ARG_CACHE_DIR: &str = "cache-dir";
pub(crate) const ARG_REFRESH_INTERVAL: &str = "refresh-interval-secs";
pub(crate) const ARG_FEED_MAX_AGE: &str = "feed-max-age-secs";
pub(crate) const ARG_UPSTREAM_TIMEOUT: &str = "upstream-timeout-secs";
pub(crate) const ARG_ACTIVE_ONLY: &str = "active-only";
pub(crate) const ARG_RELOAD_PATH: &str = "reload-path";

/// Listen address when none is configured.
pub const DEFAULT_BIND: &str = "0.0.0.0:5005";
/// Directory for the park feed's local copy.
pub const DEFAULT_CACHE_DIR: &str = "pota-cache";
/// Seconds between scheduled refreshes.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 5 * 60;
/// Seconds a local park feed copy stays fresh.
pub const DEFAULT_FEED_MAX_AGE_SECS: u64 = 60 * 60;
/// Seconds an upstream request may take.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 180;
/// Route of the force-refresh endpoint.
pub const DEFAULT_RELOAD_PATH: &str = "/reload";

#[derive(Debug, Parser)]
#[command(
    name = "pota-cache",
    about = "Read-through Overpass cache for Parks on the Air references",
    version
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Refresh the cache in the background and answer Overpass queries.
    Serve(ServeArgs),
}

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve bounding-box queries from a merged snapshot of Overpass \
                 and the POTA park feed. Settings can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Run the cache server"
)]
#[ortho_config(prefix = "POTA_CACHE")]
pub struct ServeArgs {
    /// Socket address to listen on.
    #[arg(long = ARG_BIND, value_name = "addr")]
    #[serde(default)]
    pub bind: Option<String>,
    /// Overpass interpreter endpoint.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub overpass_url: Option<String>,
    /// POTA park CSV endpoint.
    #[arg(long = ARG_PARK_FEED_URL, value_name = "url")]
    #[serde(default)]
    pub park_feed_url: Option<String>,
    /// Directory for the park feed's local copy.
    #[arg(long = ARG_CACHE_DIR, value_name = "path")]
    #[serde(default)]
    pub cache_dir: Option<Utf8PathBuf>,
    /// Seconds between scheduled refreshes.
    #[arg(long = ARG_REFRESH_INTERVAL, value_name = "secs")]
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    /// Seconds a local park feed copy stays fresh.
    #[arg(long = ARG_FEED_MAX_AGE, value_name = "secs")]
    #[serde(default)]
    pub feed_max_age_secs: Option<u64>,
    /// Seconds an upstream request may take.
    #[arg(long = ARG_UPSTREAM_TIMEOUT, value_name = "secs")]
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
    /// Keep only parks the feed marks active.
    #[arg(long = ARG_ACTIVE_ONLY, value_name = "bool")]
    #[serde(default)]
    pub active_only: Option<bool>,
    /// Route of the force-refresh endpoint.
    #[arg(long = ARG_RELOAD_PATH, value_name = "path")]
    #[serde(default)]
    pub reload_path: Option<String>,
}

impl ServeArgs {
    /// Merge configuration layers and validate the result.
    ///
    /// # Errors
    ///
    /// Fails when layering fails or a setting is invalid.
    pub fn into_config(self) -> Result<ServeConfig, ServerError> {
        let merged = self.load_and_merge().map_err(ServerError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Validated server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Overpass interpreter endpoint.
    pub overpass_url: String,
    /// POTA park CSV endpoint.
    pub park_feed_url: String,
    /// Directory for the park feed's local copy.
    pub cache_dir: Utf8PathBuf,
    /// Period of the refresh loop.
    pub refresh_interval: Duration,
    /// Freshness window of the park feed's local copy.
    pub feed_max_age: Duration,
    /// Request timeout for both upstreams.
    pub upstream_timeout: Duration,
    /// Keep only parks the feed marks active.
    pub active_only: bool,
    /// Route of the force-refresh endpoint.
    pub reload_path: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5005)),
            overpass_url: DEFAULT_OVERPASS_URL.to_owned(),
            park_feed_url: DEFAULT_PARK_FEED_URL.to_owned(),
            cache_dir: Utf8PathBuf::from(DEFAULT_CACHE_DIR),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            feed_max_age: Duration::from_secs(DEFAULT_FEED_MAX_AGE_SECS),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            active_only: true,
            reload_path: DEFAULT_RELOAD_PATH.to_owned(),
        }
    }
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = ServerError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let bind_text = args.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind = bind_text
            .parse::<SocketAddr>()
            .map_err(|err| invalid(ARG_BIND, format!("{bind_text:?} is not a socket address: {err}")))?;
        let reload_path = args
            .reload_path
            .unwrap_or_else(|| DEFAULT_RELOAD_PATH.to_owned());
        if !reload_path.starts_with('/') || reload_path.len() < 2 {
            return Err(invalid(
                ARG_RELOAD_PATH,
                format!("{reload_path:?} must be an absolute route such as /reload"),
            ));
        }
        if reload_path.starts_with("/api/") || reload_path == "/health" {
            return Err(invalid(
                ARG_RELOAD_PATH,
                format!("{reload_path:?} collides with the query routes"),
            ));
        }

        Ok(Self {
            bind,
            overpass_url: args
                .overpass_url
                .unwrap_or_else(|| DEFAULT_OVERPASS_URL.to_owned()),
            park_feed_url: args
                .park_feed_url
                .unwrap_or_else(|| DEFAULT_PARK_FEED_URL.to_owned()),
            cache_dir: args
                .cache_dir
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CACHE_DIR)),
            refresh_interval: positive_secs(
                ARG_REFRESH_INTERVAL,
                args.refresh_interval_secs,
                DEFAULT_REFRESH_INTERVAL_SECS,
            )?,
            feed_max_age: Duration::from_secs(
                args.feed_max_age_secs.unwrap_or(DEFAULT_FEED_MAX_AGE_SECS),
            ),
            upstream_timeout: positive_secs(
                ARG_UPSTREAM_TIMEOUT,
                args.upstream_timeout_secs,
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?,
            active_only: args.active_only.unwrap_or(true),
            reload_path,
        })
    }
}

fn positive_secs(
    field: &'static str,
    value: Option<u64>,
    default: u64,
) -> Result<Duration, ServerError> {
    match value.unwrap_or(default) {
        0 => Err(invalid(field, "must be greater than zero".to_owned())),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn invalid(field: &'static str, reason: String) -> ServerError {
    ServerError::InvalidSetting { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_args_resolve_to_defaults() {
        let config = ServeConfig::try_from(ServeArgs::default()).expect("defaults are valid");
        assert_eq!(config, ServeConfig::default());
    }

    #[rstest]
    fn explicit_args_override_defaults() {
        let args = ServeArgs {
            bind: Some("127.0.0.1:8080".to_owned()),
            cache_dir: Some(Utf8PathBuf::from("/var/cache/pota")),
            refresh_interval_secs: Some(60),
            active_only: Some(false),
            reload_path: Some("/reload2024".to_owned()),
            ..ServeArgs::default()
        };
        let config = ServeConfig::try_from(args).expect("args are valid");
        assert_eq!(config.bind, SocketAddr::from(([127, 0, 0, 1], 8080)));
        assert_eq!(config.cache_dir, Utf8PathBuf::from("/var/cache/pota"));
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert!(!config.active_only);
        assert_eq!(config.reload_path, "/reload2024");
    }

    #[rstest]
    #[case::refresh_interval(
        ServeArgs { refresh_interval_secs: Some(0), ..ServeArgs::default() },
        ARG_REFRESH_INTERVAL
    )]
    #[case::upstream_timeout(
        ServeArgs { upstream_timeout_secs: Some(0), ..ServeArgs::default() },
        ARG_UPSTREAM_TIMEOUT
    )]
    #[case::bind(
        ServeArgs { bind: Some("localhost".to_owned()), ..ServeArgs::default() },
        ARG_BIND
    )]
    #[case::relative_reload(
        ServeArgs { reload_path: Some("reload".to_owned()), ..ServeArgs::default() },
        ARG_RELOAD_PATH
    )]
    #[case::api_reload(
        ServeArgs { reload_path: Some("/api/reload".to_owned()), ..ServeArgs::default() },
        ARG_RELOAD_PATH
    )]
    fn invalid_settings_are_rejected(#[case] args: ServeArgs, #[case] expected: &'static str) {
        let err = ServeConfig::try_from(args).expect_err("setting should be rejected");
        match err {
            ServerError::InvalidSetting { field, .. } => assert_eq!(field, expected),
            other => panic!("expected InvalidSetting, found {other:?}"),
        }
    }

    #[rstest]
    fn zero_feed_age_is_allowed() {
        let args = ServeArgs {
            feed_max_age_secs: Some(0),
            ..ServeArgs::default()
        };
        let config = ServeConfig::try_from(args).expect("zero age forces every fetch");
        assert_eq!(config.feed_max_age, Duration::ZERO);
    }

    #[rstest]
    fn serve_subcommand_parses_flags() {
        let cli = Cli::try_parse_from([
            "pota-cache",
            "serve",
            "--bind",
            "127.0.0.1:9000",
            "--active-only",
            "false",
        ])
        .expect("flags should parse");
        let Command::Serve(args) = cli.command;
        assert_eq!(args.bind.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(args.active_only, Some(false));
    }
}
