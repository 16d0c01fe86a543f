use std::net::SocketAddr;

use anyhow::Result;
use bridge_fetch::{
    Fetch, FetchError, FetchInput, FunctionsClient, LegacyRewrite, ReqwestFetch, compat_client,
};
use bridge_host::{ServerState, router};
use netlify_bridge::functions::builtin_registry;
use serial_test::serial;
use tokio::net::TcpListener;
use url::Url;

async fn spawn_host() -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(ServerState::new(builtin_registry()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

#[tokio::test]
async fn legacy_base_reaches_bridged_function() -> Result<()> {
    let addr = spawn_host().await?;
    let origin = Url::parse(&format!("http://{addr}"))?;
    let fetch = LegacyRewrite::new(ReqwestFetch::new(origin.clone())?, origin);
    let client = FunctionsClient::new(fetch, "/.netlify/functions");

    let value = client.get("landhome-demo?lot=7").await?;
    assert_eq!(value["ok"], true);
    assert_eq!(value["path"], "/api/netlify/landhome-demo");
    assert_eq!(value["query"]["lot"], "7");

    let value = client
        .post("landhome-demo", &serde_json::json!({ "vin": "1HGCM" }))
        .await?;
    assert_eq!(value["method"], "POST");
    assert_eq!(value["received"], 15);
    Ok(())
}

#[tokio::test]
async fn cross_origin_calls_are_not_rewritten() -> Result<()> {
    let addr = spawn_host().await?;
    let origin = Url::parse(&format!("http://localhost:{}", addr.port()))?;
    let fetch = LegacyRewrite::new(ReqwestFetch::new(origin.clone())?, origin);

    let target = format!("http://{addr}/.netlify/functions/landhome-demo");
    let response = fetch.fetch(FetchInput::Text(target), None).await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn transport_errors_propagate() -> Result<()> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);

    let origin = Url::parse(&format!("http://{addr}"))?;
    let fetch = LegacyRewrite::new(ReqwestFetch::new(origin.clone())?, origin);
    let err = fetch
        .fetch("/.netlify/functions/landhome-demo".into(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
    Ok(())
}

#[tokio::test]
#[serial]
async fn compat_client_reads_functions_base() -> Result<()> {
    let addr = spawn_host().await?;
    let origin = Url::parse(&format!("http://{addr}"))?;

    // SAFETY: serialized with the other env-mutating tests in this binary.
    unsafe { std::env::set_var("FUNCTIONS_BASE", "/.netlify/functions") };
    let client = compat_client(origin.clone());
    unsafe { std::env::remove_var("FUNCTIONS_BASE") };
    let client = client?;
    assert_eq!(client.base(), "/.netlify/functions");
    let value = client.get("/landhome-demo").await?;
    assert_eq!(value["path"], "/api/netlify/landhome-demo");

    let default_client = compat_client(origin)?;
    assert_eq!(default_client.base(), "/api/netlify");
    Ok(())
}
