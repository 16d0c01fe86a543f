use axum::body::Body;
use axum::http::HeaderMap;
use bridge_core::{BridgeError, HeaderInput};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;

/// Buffers the whole request body. Legacy handlers only accept a fully
/// materialized body.
pub async fn collect_body(body: Body) -> Result<Bytes, BridgeError> {
    let mut stream = body.into_data_stream();
    let mut data = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| BridgeError::BodyRead {
            reason: err.to_string(),
        })?;
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}

/// Groups repeated header entries under one name, preserving arrival order.
pub fn header_inputs(headers: &HeaderMap) -> Vec<(String, HeaderInput)> {
    headers
        .keys()
        .map(|name| {
            let mut values: Vec<String> = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            let input = match values.len() {
                0 => HeaderInput::Absent,
                1 => HeaderInput::Single(values.remove(0)),
                _ => HeaderInput::Multi(values),
            };
            (name.as_str().to_string(), input)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn collect_body_concatenates_chunks() {
        let chunks: Vec<Result<&'static str, std::io::Error>> = vec![Ok("{\"a\":"), Ok("1}")];
        let body = Body::from_stream(futures::stream::iter(chunks));
        let bytes = collect_body(body).await.unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }

    #[test]
    fn repeated_headers_become_multi() {
        let mut headers = HeaderMap::new();
        headers.append("x-a", HeaderValue::from_static("1"));
        headers.append("x-a", HeaderValue::from_static("2"));
        headers.insert("accept", HeaderValue::from_static("*/*"));
        let inputs = header_inputs(&headers);
        assert!(inputs.contains(&(
            "x-a".to_string(),
            HeaderInput::Multi(vec!["1".into(), "2".into()])
        )));
        assert!(inputs.contains(&("accept".to_string(), HeaderInput::Single("*/*".into()))));
    }
}
