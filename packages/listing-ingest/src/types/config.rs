//! Configuration for ingestion runs.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::enums::Source;
use crate::error::ConfigError;

/// Politeness pacing for one source: `min_delay_ms + random(0, max_extra_delay_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    pub min_delay_ms: u64,
    pub max_extra_delay_ms: u64,
}

impl Pacing {
    pub const NONE: Pacing = Pacing {
        min_delay_ms: 0,
        max_extra_delay_ms: 0,
    };

    pub fn new(min_delay_ms: u64, max_extra_delay_ms: u64) -> Self {
        Self {
            min_delay_ms,
            max_extra_delay_ms,
        }
    }

    /// Draw one delay in milliseconds.
    pub fn draw(&self) -> u64 {
        self.min_delay_ms + fastrand::u64(0..=self.max_extra_delay_ms)
    }
}

/// Configuration for the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Root of the fetched-HTML cache.
    pub cache_dir: PathBuf,

    /// Directory holding the persisted `searches` and `posts` documents.
    pub data_dir: PathBuf,

    /// Pacing applied before each craigslist fetch completes.
    ///
    /// Default: 3000ms + up to 4000ms.
    pub craigslist_pacing: Pacing,

    /// Pacing for facebook. Default: none.
    pub facebook_pacing: Pacing,

    /// Replace all pacing with `debug_delay_ms`.
    pub debug_mode: bool,

    pub debug_delay_ms: u64,

    /// Extra attempts for a failing job. Default: 0 (no retry).
    pub max_retries: u32,

    /// Last results page followed for any one job chain.
    pub max_pages: u32,

    /// User agent sent by the HTTP browser.
    pub user_agent: String,

    pub request_timeout_secs: u64,

    /// Hard ceiling on HTTP requests per second, on top of pacing.
    pub requests_per_second: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            data_dir: PathBuf::from("./data"),
            craigslist_pacing: Pacing::new(3000, 4000),
            facebook_pacing: Pacing::NONE,
            debug_mode: false,
            debug_delay_ms: 500,
            max_retries: 0,
            max_pages: 50,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"
                .to_string(),
            request_timeout_secs: 30,
            requests_per_second: 1,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables, reading `.env` if present.
    ///
    /// Unset variables keep their defaults; set but unparseable ones are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let craigslist_pacing = Pacing::new(
            env_or("INGEST_CRAIGSLIST_MIN_DELAY_MS", defaults.craigslist_pacing.min_delay_ms)?,
            env_or(
                "INGEST_CRAIGSLIST_MAX_EXTRA_DELAY_MS",
                defaults.craigslist_pacing.max_extra_delay_ms,
            )?,
        );

        Ok(Self {
            cache_dir: env::var("INGEST_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            data_dir: env::var("INGEST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            craigslist_pacing,
            facebook_pacing: defaults.facebook_pacing,
            debug_mode: env_or("INGEST_DEBUG", defaults.debug_mode)?,
            debug_delay_ms: env_or("INGEST_DEBUG_DELAY_MS", defaults.debug_delay_ms)?,
            max_retries: env_or("INGEST_MAX_RETRIES", defaults.max_retries)?,
            max_pages: env_or("INGEST_MAX_PAGES", defaults.max_pages)?,
            user_agent: env::var("INGEST_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_secs: defaults.request_timeout_secs,
            requests_per_second: env_or(
                "INGEST_REQUESTS_PER_SECOND",
                defaults.requests_per_second,
            )?,
        })
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    pub fn with_debug_delay_ms(mut self, ms: u64) -> Self {
        self.debug_delay_ms = ms;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    pub fn with_pacing(mut self, source: Source, pacing: Pacing) -> Self {
        match source {
            Source::Craigslist => self.craigslist_pacing = pacing,
            Source::Facebook => self.facebook_pacing = pacing,
        }
        self
    }

    /// Disable all waiting. Used by tests.
    pub fn without_pacing(self) -> Self {
        self.with_pacing(Source::Craigslist, Pacing::NONE)
            .with_pacing(Source::Facebook, Pacing::NONE)
            .with_debug_mode(false)
    }

    /// Politeness delay for the next job of `source`, in milliseconds.
    pub fn draw_wait_ms(&self, source: Source) -> u64 {
        if self.debug_mode {
            return self.debug_delay_ms;
        }
        match source {
            Source::Craigslist => self.craigslist_pacing.draw(),
            Source::Facebook => self.facebook_pacing.draw(),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidVar {
            key: key.to_string(),
            value: raw.clone(),
            source: Box::new(e),
        }),
        Err(_) => Ok(default),
    }
}
