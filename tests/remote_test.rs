//! Integration tests for the remote client that need no live server
use runlog::error::RemoteError;
use runlog::{RemoteClient, share_url};

#[test]
fn test_upload_to_closed_port_is_unreachable() {
    let client = RemoteClient::new("http://127.0.0.1:1", "test-client");
    let err = client.upload(r#"{"type":"user","message":{"content":"hi"}}"#).unwrap_err();

    assert!(matches!(err, RemoteError::Unreachable { .. }));
    assert_eq!(err.to_string(), "No response from server. Is the server running?");
}

#[test]
fn test_delete_to_closed_port_is_unreachable() {
    let client = RemoteClient::new("http://127.0.0.1:1/", "test-client");
    assert_eq!(client.endpoint(), "http://127.0.0.1:1");

    let err = client.delete("550e8400-e29b-41d4-a716-446655440000").unwrap_err();
    assert!(matches!(err, RemoteError::Unreachable { .. }));
}

#[test]
fn test_share_url_by_endpoint() {
    assert_eq!(share_url("https://api.runlog.io", "abc"), "https://runlog.io/c/abc");
    assert_eq!(
        share_url("http://localhost:3000", "abc"),
        "http://localhost:8080/share.html?id=abc"
    );

    let client = RemoteClient::new("https://api.runlog.io/", "test-client");
    assert_eq!(client.share_url("abc"), "https://runlog.io/c/abc");
}
