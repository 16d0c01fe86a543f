#![forbid(unsafe_code)]

pub mod client;
pub mod fetch;
pub mod middleware;
pub mod rewrite;

pub use client::FunctionsClient;
pub use fetch::{Fetch, FetchError, FetchInit, FetchInput, ReqwestFetch};
pub use middleware::{LegacyRewrite, LegacyRewriteLayer};
pub use rewrite::{rewrite_legacy_str, rewrite_legacy_url};

use url::Url;

/// Client for `origin` with legacy function URLs rewritten, as an app's
/// entry point would wire it.
pub fn compat_client(origin: Url) -> Result<FunctionsClient<LegacyRewrite<ReqwestFetch>>, FetchError> {
    let fetch = ReqwestFetch::new(origin.clone())?;
    Ok(FunctionsClient::from_env(LegacyRewrite::new(fetch, origin)))
}
