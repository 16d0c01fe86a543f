use thiserror::Error;

use crate::INTERNAL_ERROR_BODY;

/// Failures raised while bridging a request to a legacy handler.
///
/// The `Display` output of each variant is exactly what the HTTP boundary
/// sends back as the 500 body.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to read request body: {reason}")]
    BodyRead { reason: String },

    #[error("invalid request url: {reason}")]
    InvalidUrl { reason: String },

    #[error("failed to load module {module_path}: {reason}")]
    ModuleLoad { module_path: String, reason: String },

    #[error("No Netlify handler export in {module_path}")]
    ModuleResolution { module_path: String },

    #[error("{message}")]
    HandlerExecution { message: String },

    #[error("invalid handler result: {reason}")]
    InvalidResult { reason: String },
}

impl BridgeError {
    pub fn handler(err: anyhow::Error) -> Self {
        Self::HandlerExecution {
            message: err.to_string(),
        }
    }

    /// Body text for the internal-error response.
    pub fn response_body(&self) -> String {
        let message = self.to_string();
        if message.is_empty() {
            INTERNAL_ERROR_BODY.to_string()
        } else {
            message
        }
    }
}

impl From<url::ParseError> for BridgeError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl {
            reason: err.to_string(),
        }
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
