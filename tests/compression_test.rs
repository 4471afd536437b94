mod common;

use bytes::Bytes;
use chainfetch::http::{Body, ParseAs};
use chainfetch::NetError;
use common::{gzip, zlib, MockTransport, Reply};
use futures::StreamExt;

#[tokio::test]
async fn test_gzip_response_is_decoded() {
    let compressed = gzip(b"hello");
    let (head, tail) = compressed.split_at(compressed.len() / 2);
    let mock = MockTransport::new([Reply::ok("")
        .header("content-encoding", "gzip")
        .chunks([Bytes::copy_from_slice(head), Bytes::copy_from_slice(tail)])]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .compress()
        .parse(ParseAs::Text)
        .send()
        .await
        .unwrap();

    assert_eq!(mock.calls()[0].headers["accept-encoding"], "gzip, deflate");
    let response = outcome.into_response().unwrap();
    assert_eq!(response.body(), &Body::Text("hello".into()));
}

#[tokio::test]
async fn test_deflate_response_is_decoded() {
    let mock = MockTransport::new([Reply::ok("")
        .header("content-encoding", "Deflate")
        .chunks([Bytes::from(zlib(br#"{"ok":true}"#))])]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .compress()
        .parse(ParseAs::Json)
        .send()
        .await
        .unwrap();

    let response = outcome.into_response().unwrap();
    assert_eq!(response.body(), &Body::Json(serde_json::json!({"ok": true})));
}

#[tokio::test]
async fn test_compressed_body_untouched_without_compress() {
    let compressed = gzip(b"hello");
    let mock = MockTransport::new([Reply::ok("")
        .header("content-encoding", "gzip")
        .chunks([Bytes::from(compressed.clone())])]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .send()
        .await
        .unwrap();

    assert!(!mock.calls()[0].headers.contains_key("accept-encoding"));
    let response = outcome.into_response().unwrap();
    assert_eq!(response.body(), &Body::Bytes(Bytes::from(compressed)));
}

#[tokio::test]
async fn test_unknown_encoding_passes_through() {
    let mock = MockTransport::new([Reply::ok("plain").header("content-encoding", "br")]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .compress()
        .send()
        .await
        .unwrap();

    let response = outcome.into_response().unwrap();
    assert_eq!(response.text().unwrap(), "plain");
}

#[tokio::test]
async fn test_corrupt_gzip_fails() {
    let mock = MockTransport::new([Reply::ok("definitely not gzip").header("content-encoding", "gzip")]);

    let err = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .compress()
        .send()
        .await
        .unwrap_err();

    assert!(matches!(err, NetError::ContentDecodingFailed(_)));
}

#[tokio::test]
async fn test_streamed_gzip_is_decoded() {
    let mock = MockTransport::new([Reply::ok("")
        .header("content-encoding", "gzip")
        .chunks([Bytes::from(gzip(b"streamed hello"))])]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .compress()
        .stream()
        .send()
        .await
        .unwrap();

    let mut stream = outcome.into_stream().unwrap();
    let mut data = Vec::new();
    while let Some(chunk) = stream.next().await {
        data.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(data, b"streamed hello");
}

#[tokio::test]
async fn test_empty_gzip_body_on_head() {
    let mock = MockTransport::new([Reply::ok("").header("content-encoding", "gzip")]);

    let outcome = mock
        .context()
        .request_with_method(http::Method::HEAD, "http://example.test/")
        .unwrap()
        .compress()
        .send()
        .await
        .unwrap();

    assert_eq!(mock.calls()[0].method, http::Method::HEAD);
    let response = outcome.into_response().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), &Body::Bytes(Bytes::new()));
}

#[tokio::test]
async fn test_empty_gzip_body_on_no_content() {
    let mock = MockTransport::new([Reply::status(204, "")
        .header("content-encoding", "gzip")
        .chunks(Vec::<Bytes>::new())]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .compress()
        .send()
        .await
        .unwrap();

    assert_eq!(outcome.status(), 204);
}
