//! Functions built into the host binary.

use bridge_core::{FnHandler, HandlerModule, InvocationResult, ModuleRegistry};
use serde_json::json;

/// Echo function served at `/api/netlify/landhome-demo`; reports what the
/// legacy handler saw, which makes it handy for checking a deployment.
pub fn landhome_demo() -> HandlerModule {
    HandlerModule::new().with_named_handler(
        FnHandler::new(|event, _context| async move {
            let payload = json!({
                "ok": true,
                "method": event.http_method,
                "path": event.path,
                "query": event.query_string_parameters,
                "received": event.body.len(),
            });
            Ok(Some(
                InvocationResult::new(200)
                    .with_header("content-type", "application/json")
                    .with_body(payload.to_string()),
            ))
        })
        .into_arc(),
    )
}

pub fn builtin_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::default();
    registry.register(
        "landhome-demo",
        "../../netlify/functions/landhome-demo.ts",
        landhome_demo(),
    );
    registry
}
