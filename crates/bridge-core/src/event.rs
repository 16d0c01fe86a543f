use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::LOCAL_BASE;
use crate::error::BridgeResult;

/// Normalized request handed to a legacy handler.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    pub http_method: String,
    pub path: String,
    pub query_string_parameters: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// A header as an HTTP runtime hands it over: one value, several, or none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderInput {
    Single(String),
    Multi(Vec<String>),
    Absent,
}

impl HeaderInput {
    fn flatten(self) -> String {
        match self {
            Self::Single(value) => value,
            Self::Multi(values) => values.join(", "),
            Self::Absent => String::new(),
        }
    }
}

impl InvocationEvent {
    /// Builds an event from request parts. Relative URLs are resolved
    /// against [`LOCAL_BASE`]; header names are lower-cased.
    pub fn from_request<I, K>(
        method: &str,
        url: &str,
        headers: I,
        body: String,
    ) -> BridgeResult<Self>
    where
        I: IntoIterator<Item = (K, HeaderInput)>,
        K: AsRef<str>,
    {
        let url = Url::parse(LOCAL_BASE)?.join(url)?;
        let query_string_parameters = url.query_pairs().into_owned().collect();
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.flatten()))
            .collect();

        Ok(Self {
            http_method: method.to_string(),
            path: url.path().to_string(),
            query_string_parameters,
            headers,
            body,
            is_base64_encoded: false,
        })
    }
}

/// Empty context object passed as the handler's second argument.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationContext {}

/// What a legacy handler hands back. Every field is optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl InvocationResult {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status_code.unwrap_or(200)
    }

    /// Headers to emit, with null values dropped and scalars stringified.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        let Some(headers) = &self.headers else {
            return Vec::new();
        };
        headers
            .iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Some((name.clone(), text))
            })
            .collect()
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
