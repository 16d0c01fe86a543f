use std::env;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde_json::{Value, json};

use crate::fetch::{Fetch, FetchError, FetchInit, FetchInput};

const DEFAULT_FUNCTIONS_BASE: &str = "/api/netlify";

/// JSON helper for calling bridged functions.
pub struct FunctionsClient<F> {
    fetch: F,
    base: String,
}

impl<F> FunctionsClient<F>
where
    F: Fetch<Response = reqwest::Response, Error = FetchError>,
{
    pub fn new(fetch: F, base: impl Into<String>) -> Self {
        Self {
            fetch,
            base: base.into(),
        }
    }

    /// Uses `FUNCTIONS_BASE` when set, `/api/netlify` otherwise.
    pub fn from_env(fetch: F) -> Self {
        let base = env::var("FUNCTIONS_BASE")
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_FUNCTIONS_BASE.to_string());
        Self::new(fetch, base)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub async fn get(&self, path: &str) -> Result<Value, FetchError> {
        self.request::<()>(Method::GET, path, None, HeaderMap::new())
            .await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, FetchError> {
        self.request(Method::POST, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, FetchError> {
        self.request(Method::PUT, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, FetchError> {
        self.request(Method::PATCH, path, Some(body), HeaderMap::new())
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, FetchError> {
        self.request::<()>(Method::DELETE, path, None, HeaderMap::new())
            .await
    }

    pub async fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        mut headers: HeaderMap,
    ) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        let body = match body {
            Some(body) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Some(serde_json::to_vec(body).map_err(|err| FetchError::Decode {
                    message: err.to_string(),
                })?)
            }
            None => None,
        };
        let init = FetchInit {
            method: Some(method),
            headers,
            body,
            timeout: None,
        };

        let response = self.fetch.fetch(FetchInput::Text(url), Some(init)).await?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        let text = response.text().await?;

        if !status.is_success() {
            let message = if text.is_empty() {
                format!(
                    "{} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
            } else {
                text
            };
            return Err(FetchError::Status { status, message });
        }

        if !is_json {
            return Ok(Value::String(text));
        }
        if text.is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&text).map_err(|_| FetchError::Decode { message: text.clone() })
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("{}{separator}{path}", self.base)
    }
}
