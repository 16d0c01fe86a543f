#![forbid(unsafe_code)]

pub mod env;
pub mod error;
pub mod event;
pub mod handler;
pub mod module;

pub use env::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use event::{HeaderInput, InvocationContext, InvocationEvent, InvocationResult};
pub use handler::{FnHandler, LegacyHandler};
pub use module::{
    Export, ExportShape, HandlerModule, ModuleLoader, ModuleRegistry, ModuleRoute,
    ResolvedHandler, load_handler, resolve_handler,
};

/// Path prefix the retired Netlify runtime served functions from.
pub const LEGACY_PREFIX: &str = "/.netlify/functions/";

/// Path prefix the bridge serves the same functions from.
pub const ROUTE_PREFIX: &str = "/api/netlify/";

/// Base used to resolve relative request URLs into absolute ones.
pub const LOCAL_BASE: &str = "http://localhost";

/// Fallback response body when a failure carries no message.
pub const INTERNAL_ERROR_BODY: &str = "Internal Error";
