mod common;

use bytes::Bytes;
use chainfetch::http::ParseAs;
use chainfetch::NetError;
use common::{MockTransport, Reply};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_streamed_delivery_skips_parse() {
    let polled = Arc::new(AtomicBool::new(false));
    let mock = MockTransport::new([Reply::ok("")
        .header("content-type", "text/plain")
        .chunks([Bytes::from_static(b"not "), Bytes::from_static(b"json")])
        .track(&polled)]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .stream()
        .parse(ParseAs::Json)
        .send()
        .await
        .unwrap();

    assert!(outcome.is_streamed());
    assert!(!polled.load(Ordering::SeqCst), "body is handed over unread");

    let stream = outcome.into_stream().unwrap();
    assert_eq!(stream.status(), 200);
    assert_eq!(stream.headers()["content-type"], "text/plain");

    let chunks: Vec<Bytes> = stream.map(|chunk| chunk.unwrap()).collect().await;
    assert_eq!(chunks, vec![Bytes::from_static(b"not "), Bytes::from_static(b"json")]);
}

#[tokio::test]
async fn test_streamed_redirect_is_not_followed() {
    let mock = MockTransport::new([Reply::status(302, "").header("location", "/elsewhere")]);

    let outcome = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .stream()
        .follow_redirects(true)
        .send()
        .await
        .unwrap();

    assert_eq!(mock.call_count(), 1);
    assert_eq!(outcome.status(), 302);
}

#[tokio::test]
async fn test_transport_error_is_reported() {
    let mock = MockTransport::new([Reply::Fail(NetError::Transport("reset".into()))]);

    let err = mock
        .context()
        .request("http://example.test/")
        .unwrap()
        .stream()
        .send()
        .await
        .unwrap_err();

    assert_eq!(err, NetError::Transport("reset".into()));
}
