use std::task::{Context, Poll};

use async_trait::async_trait;
use tower::{Layer, Service};
use url::Url;

use crate::fetch::{Fetch, FetchInit, FetchInput};
use crate::rewrite::{rewrite_legacy_str, rewrite_legacy_url};

/// Wraps a network client so calls aimed at `/.netlify/functions/` on the
/// client's own origin go to `/api/netlify/` instead.
///
/// Works both as a [`Fetch`] decorator and as a tower [`Service`] over
/// `http::Request`s. Wrapping an already wrapped client is harmless since a
/// rewritten URL never matches the legacy prefix again.
#[derive(Clone, Debug)]
pub struct LegacyRewrite<T> {
    inner: T,
    origin: Url,
}

impl<T> LegacyRewrite<T> {
    pub fn new(inner: T, origin: Url) -> Self {
        Self { inner, origin }
    }

    fn rewrite_input(&self, input: FetchInput) -> FetchInput {
        match input {
            FetchInput::Text(raw) => match rewrite_legacy_str(&self.origin, &raw) {
                Some(url) => {
                    tracing::debug!(from = %raw, to = %url, "rewrote legacy function url");
                    FetchInput::Text(url.into())
                }
                None => FetchInput::Text(raw),
            },
            FetchInput::Url(url) => match rewrite_legacy_url(&self.origin, &url) {
                Some(rewritten) => {
                    tracing::debug!(from = %url, to = %rewritten, "rewrote legacy function url");
                    FetchInput::Text(rewritten.into())
                }
                None => FetchInput::Url(url),
            },
            FetchInput::Request(mut request) => {
                if let Some(rewritten) = rewrite_legacy_url(&self.origin, request.url()) {
                    tracing::debug!(from = %request.url(), to = %rewritten, "rewrote legacy function url");
                    *request.url_mut() = rewritten;
                }
                FetchInput::Request(request)
            }
        }
    }

    fn rewrite_uri(&self, uri: &http::Uri) -> Option<http::Uri> {
        let absolute = uri.scheme().is_some();
        let rewritten = rewrite_legacy_str(&self.origin, &uri.to_string())?;
        let target = if absolute {
            rewritten.to_string()
        } else {
            match rewritten.query() {
                Some(query) => format!("{}?{query}", rewritten.path()),
                None => rewritten.path().to_string(),
            }
        };
        target.parse().ok()
    }
}

#[async_trait]
impl<F> Fetch for LegacyRewrite<F>
where
    F: Fetch,
{
    type Response = F::Response;
    type Error = F::Error;

    async fn fetch(
        &self,
        input: FetchInput,
        init: Option<FetchInit>,
    ) -> Result<Self::Response, Self::Error> {
        let input = self.rewrite_input(input);
        self.inner.fetch(input, init).await
    }
}

impl<S, B> Service<http::Request<B>> for LegacyRewrite<S>
where
    S: Service<http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: http::Request<B>) -> Self::Future {
        if let Some(uri) = self.rewrite_uri(request.uri()) {
            tracing::debug!(from = %request.uri(), to = %uri, "rewrote legacy function uri");
            *request.uri_mut() = uri;
        }
        self.inner.call(request)
    }
}

/// [`Layer`] that applies [`LegacyRewrite`] to a tower service.
#[derive(Clone, Debug)]
pub struct LegacyRewriteLayer {
    origin: Url,
}

impl LegacyRewriteLayer {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }
}

impl<S> Layer<S> for LegacyRewriteLayer {
    type Service = LegacyRewrite<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LegacyRewrite::new(inner, self.origin.clone())
    }
}
