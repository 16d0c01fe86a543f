use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Request};
use thiserror::Error;
use url::Url;

/// The target of a network call, in any of the forms callers hand over.
#[derive(Debug)]
pub enum FetchInput {
    Text(String),
    Url(Url),
    Request(Request),
}

impl From<&str> for FetchInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FetchInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Url> for FetchInput {
    fn from(value: Url) -> Self {
        Self::Url(value)
    }
}

impl From<Request> for FetchInput {
    fn from(value: Request) -> Self {
        Self::Request(value)
    }
}

/// Per-call options. Anything set here overrides the same property of the
/// input.
#[derive(Clone, Debug, Default)]
pub struct FetchInit {
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("{message}")]
    Decode { message: String },
}

/// A network client. Implementations are composed rather than patched in
/// globally.
#[async_trait]
pub trait Fetch: Send + Sync {
    type Response: Send;
    type Error: Send;

    async fn fetch(
        &self,
        input: FetchInput,
        init: Option<FetchInit>,
    ) -> Result<Self::Response, Self::Error>;
}

/// [`Fetch`] backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestFetch {
    client: Client,
    origin: Url,
}

impl ReqwestFetch {
    pub fn new(origin: Url) -> Result<Self, FetchError> {
        Ok(Self {
            client: Client::builder().build()?,
            origin,
        })
    }

    pub fn with_client(client: Client, origin: Url) -> Self {
        Self { client, origin }
    }

    fn build(&self, input: FetchInput, init: Option<FetchInit>) -> Result<Request, FetchError> {
        let mut request = match input {
            FetchInput::Text(raw) => {
                let url = self
                    .origin
                    .join(&raw)
                    .map_err(|source| FetchError::InvalidUrl { url: raw, source })?;
                Request::new(Method::GET, url)
            }
            FetchInput::Url(url) => Request::new(Method::GET, url),
            FetchInput::Request(request) => request,
        };

        if let Some(init) = init {
            if let Some(method) = init.method {
                *request.method_mut() = method;
            }
            for (name, value) in &init.headers {
                request.headers_mut().insert(name.clone(), value.clone());
            }
            if let Some(body) = init.body {
                *request.body_mut() = Some(body.into());
            }
            if let Some(timeout) = init.timeout {
                *request.timeout_mut() = Some(timeout);
            }
        }
        Ok(request)
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    type Response = reqwest::Response;
    type Error = FetchError;

    async fn fetch(
        &self,
        input: FetchInput,
        init: Option<FetchInit>,
    ) -> Result<Self::Response, Self::Error> {
        let request = self.build(input, init)?;
        tracing::trace!(method = %request.method(), url = %request.url(), "fetch");
        Ok(self.client.execute(request).await?)
    }
}
