//! Rate-limited browser wrapper.
//!
//! Wraps any BrowserClient with a hard request ceiling using the governor
//! crate. This sits underneath the scheduler's randomized pacing and only
//! matters if pacing is configured below the ceiling.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;

use crate::error::FetchResult;
use crate::traits::browser::{BrowserClient, FetchedPage};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A browser wrapper that enforces a request ceiling.
pub struct RateLimitedBrowser<B: BrowserClient> {
    inner: B,
    limiter: DefaultRateLimiter,
}

impl<B: BrowserClient> RateLimitedBrowser<B> {
    /// Create a rate-limited browser.
    ///
    /// A `requests_per_second` of zero is treated as one.
    pub fn new(browser: B, requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self::with_quota(browser, Quota::per_second(rps))
    }

    /// Create with a custom quota.
    pub fn with_quota(browser: B, quota: Quota) -> Self {
        Self {
            inner: browser,
            limiter: RateLimiter::direct(quota),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: BrowserClient> BrowserClient for RateLimitedBrowser<B> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.limiter.until_ready().await;
        self.inner.fetch(url).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Extension trait for easy rate limiting.
pub trait BrowserExt: BrowserClient + Sized {
    /// Wrap this browser with a request ceiling.
    fn rate_limited(self, requests_per_second: u32) -> RateLimitedBrowser<Self> {
        RateLimitedBrowser::new(self, requests_per_second)
    }
}

impl<B: BrowserClient + Sized> BrowserExt for B {}
