use std::collections::HashMap;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{
    HeaderMap, HeaderName, HeaderValue, Method, Response as AxumResponse, StatusCode, Uri,
};
use axum::response::IntoResponse;
use bridge_core::{
    BridgeError, BridgeResult, InvocationContext, InvocationEvent, InvocationResult, ModuleRoute,
};
use serde_json::json;

use crate::ingress_util::{collect_body, header_inputs};
use crate::server::ServerState;

pub async fn dispatch(
    State(state): State<ServerState>,
    Path(params): Path<HashMap<String, String>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> AxumResponse<Body> {
    let Some(name) = params.get("name") else {
        return build_error(StatusCode::NOT_FOUND, "function not found");
    };
    let Some(route) = state.registry.get(name) else {
        tracing::debug!(function = %name, "no module registered for route");
        return build_error(StatusCode::NOT_FOUND, "function not found");
    };

    match bridge(&route, &method, &uri, &headers, body).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(
                function = %name,
                module_path = %route.module_path,
                error = %err,
                "legacy handler failed"
            );
            state.health.record_failure(&err);
            internal_error(&err)
        }
    }
}

/// Runs one request through `route`: buffer, build the event, resolve and
/// invoke the handler, then render its result.
pub async fn bridge(
    route: &ModuleRoute,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Body,
) -> BridgeResult<AxumResponse<Body>> {
    let body = collect_body(body).await?;
    let event = to_event(method, uri, headers, String::from_utf8_lossy(&body).into_owned())?;
    let resolved = route.resolve().await?;
    tracing::debug!(
        module_path = %route.module_path,
        method = %event.http_method,
        path = %event.path,
        "invoking legacy handler"
    );
    let result = resolved
        .handler
        .call(event, InvocationContext::default())
        .await
        .map_err(BridgeError::handler)?;
    into_response(result.unwrap_or_default())
}

pub fn to_event(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: String,
) -> BridgeResult<InvocationEvent> {
    InvocationEvent::from_request(
        method.as_str(),
        &uri.to_string(),
        header_inputs(headers),
        body,
    )
}

pub fn into_response(result: InvocationResult) -> BridgeResult<AxumResponse<Body>> {
    let status = StatusCode::from_u16(result.status()).map_err(|err| BridgeError::InvalidResult {
        reason: err.to_string(),
    })?;

    let mut headers = HeaderMap::new();
    for (name, value) in result.header_pairs() {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| BridgeError::InvalidResult {
                reason: format!("header `{name}`: {err}"),
            })?;
        let header_value =
            HeaderValue::from_str(&value).map_err(|err| BridgeError::InvalidResult {
                reason: format!("header `{name}`: {err}"),
            })?;
        headers.insert(header_name, header_value);
    }

    let mut response = AxumResponse::new(Body::from(result.body_text().to_owned()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

fn internal_error(err: &BridgeError) -> AxumResponse<Body> {
    (StatusCode::INTERNAL_SERVER_ERROR, err.response_body()).into_response()
}

fn build_error(status: StatusCode, message: &'static str) -> AxumResponse<Body> {
    let payload = json!({ "error": message });
    (status, axum::Json(payload)).into_response()
}
