use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8888;

/// Environment-driven configuration for the bridge host.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub port: u16,
    /// Where the legacy function sources live. Informational only: it is
    /// reported at startup and does not change which functions are served.
    pub functions_dir: PathBuf,
}

impl BridgeConfig {
    /// Build a [`BridgeConfig`] from `BRIDGE_PORT` and `BRIDGE_FUNCTIONS_DIR`.
    pub fn from_env() -> Result<Self> {
        let port = env::var("BRIDGE_PORT")
            .ok()
            .map(|value| {
                value
                    .parse::<u16>()
                    .with_context(|| format!("BRIDGE_PORT `{value}` is not a valid port"))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let functions_dir = env::var("BRIDGE_FUNCTIONS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("netlify/functions"));

        Ok(Self {
            port,
            functions_dir,
        })
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            functions_dir: PathBuf::from("netlify/functions"),
        }
    }
}
