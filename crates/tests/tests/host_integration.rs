use anyhow::Result;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use bridge_core::{
    BridgeError, Export, FnHandler, HandlerModule, InvocationResult, ModuleLoader, ModuleRegistry,
};
use bridge_host::{ServerState, router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn echo_module(status: Option<u16>) -> HandlerModule {
    HandlerModule::new().with_default_handler(
        FnHandler::new(move |event, _| async move {
            let echo = serde_json::to_string(&event)?;
            Ok::<_, anyhow::Error>(Some(InvocationResult {
                status_code: status,
                headers: None,
                body: Some(echo),
            }))
        })
        .into_arc(),
    )
}

struct FailingLoader;

#[async_trait::async_trait]
impl ModuleLoader for FailingLoader {
    async fn load(&self, module_path: &str) -> Result<HandlerModule, BridgeError> {
        Err(BridgeError::ModuleLoad {
            module_path: module_path.to_string(),
            reason: "syntax error".into(),
        })
    }
}

fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::default();
    registry.register("echo", "../../netlify/functions/echo.ts", echo_module(None));
    registry.register("created", "../../netlify/functions/created.ts", echo_module(Some(201)));
    registry.register(
        "broken",
        "../../netlify/functions/broken.ts",
        HandlerModule::new().with_export("handler", Export::Value(json!("nope"))),
    );
    registry.register(
        "silent",
        "../../netlify/functions/silent.ts",
        HandlerModule::new()
            .with_named_handler(FnHandler::new(|_, _| async move { Ok(None) }).into_arc()),
    );
    registry.register(
        "throws",
        "../../netlify/functions/throws.ts",
        HandlerModule::new().with_named_handler(
            FnHandler::new(|_, _| async move { Err(anyhow::anyhow!("")) }).into_arc(),
        ),
    );
    registry.register_loader(
        "unloadable",
        "../../netlify/functions/unloadable.ts",
        Arc::new(FailingLoader),
    );
    registry
}

async fn send(request: Request<Body>) -> Result<(StatusCode, String)> {
    let response = router(ServerState::new(registry())).oneshot(request).await?;
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, String::from_utf8(body.to_vec())?))
}

#[tokio::test]
async fn absent_status_defaults_to_ok_and_event_is_built() -> Result<()> {
    let request = Request::builder()
        .method("PATCH")
        .uri("/api/netlify/echo/extra?tag=suv&tag=truck")
        .header("x-a", "1")
        .header("x-a", "2")
        .body(Body::from("{\"price\":1}"))?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::OK);

    let event: Value = serde_json::from_str(&body)?;
    assert_eq!(event["httpMethod"], "PATCH");
    assert_eq!(event["path"], "/api/netlify/echo/extra");
    assert_eq!(event["queryStringParameters"]["tag"], "truck");
    assert_eq!(event["headers"]["x-a"], "1, 2");
    assert_eq!(event["body"], "{\"price\":1}");
    assert_eq!(event["isBase64Encoded"], false);
    Ok(())
}

#[tokio::test]
async fn present_status_is_passed_through() -> Result<()> {
    let request = Request::builder()
        .uri("/api/netlify/created")
        .body(Body::empty())?;
    let (status, _) = send(request).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}

#[tokio::test]
async fn missing_handler_reports_module_path() -> Result<()> {
    let request = Request::builder()
        .uri("/api/netlify/broken")
        .body(Body::empty())?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("../../netlify/functions/broken.ts"));
    Ok(())
}

#[tokio::test]
async fn handler_returning_nothing_is_an_empty_ok() -> Result<()> {
    let request = Request::builder()
        .uri("/api/netlify/silent")
        .body(Body::empty())?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
    Ok(())
}

#[tokio::test]
async fn messageless_failure_uses_fallback_body() -> Result<()> {
    let request = Request::builder()
        .uri("/api/netlify/throws")
        .body(Body::empty())?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Error");
    Ok(())
}

#[tokio::test]
async fn module_load_failure_is_internal_error() -> Result<()> {
    let request = Request::builder()
        .uri("/api/netlify/unloadable")
        .body(Body::empty())?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("syntax error"));
    Ok(())
}

#[tokio::test]
async fn unknown_function_is_not_found() -> Result<()> {
    let request = Request::builder()
        .uri("/api/netlify/nowhere")
        .body(Body::empty())?;
    let (status, body) = send(request).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let payload: Value = serde_json::from_str(&body)?;
    assert_eq!(payload["error"], "function not found");
    Ok(())
}

#[tokio::test]
async fn health_counts_functions_and_failures() -> Result<()> {
    let state = ServerState::new(registry());
    let app = router(state.clone());
    let failing = Request::builder()
        .uri("/api/netlify/broken")
        .body(Body::empty())?;
    app.clone().oneshot(failing).await?;

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty())?)
        .await?;
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let health: Value = serde_json::from_slice(&body)?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["functions"], 6);
    assert_eq!(health["failures"], 1);
    assert!(
        health["last_error"]
            .as_str()
            .is_some_and(|err| err.contains("broken.ts"))
    );
    Ok(())
}
