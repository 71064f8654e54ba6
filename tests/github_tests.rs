//! Publisher tests against an in-process HTTP stub.
//!
//! A minimal HTTP/1.1 responder on a loopback listener stands in for the
//! GitHub API; responses close the connection so each request arrives on a
//! fresh socket.

use ipa_uploader::{GitHubPublisher, PublishError};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type Responder = Arc<dyn Fn(&str) -> (u16, String) + Send + Sync>;

async fn spawn_api_stub(respond: Responder) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");

    let handle = tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                while !buf.windows(4).any(|window| window == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let request_line = request.lines().next().unwrap_or("").to_string();

                let (status, body) = respond(&request_line);
                let reason = match status {
                    200 => "OK",
                    401 => "Unauthorized",
                    _ => "Error",
                };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), handle)
}

fn release_json(id: u64, tag: &str, draft: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "tag_name": tag,
        "html_url": format!("http://github.invalid/acme/rocket/releases/tag/{tag}"),
        "upload_url": format!("http://uploads.invalid/repos/acme/rocket/releases/{id}/assets{{?name,label}}"),
        "draft": draft,
        "prerelease": false,
        "assets": [],
    })
}

#[tokio::test]
async fn draft_release_beyond_the_first_page_is_reused() {
    // A full first page (100 non-matching releases) forces a second request;
    // the reusable draft only appears on page two. Any other request (in
    // particular a release creation) fails the test with a 422.
    let page_one: Vec<_> = (1..=100)
        .map(|i| release_json(i, &format!("v{i}"), false))
        .collect();
    let page_two = vec![release_json(777, "rel_1.2.3_45", true)];

    let respond: Responder = Arc::new(move |line: &str| {
        if line.starts_with("GET") && line.contains("&page=1") {
            (200, serde_json::to_string(&page_one).expect("page one json"))
        } else if line.starts_with("GET") && line.contains("&page=2") {
            (200, serde_json::to_string(&page_two).expect("page two json"))
        } else {
            (422, r#"{"message":"unexpected request"}"#.to_string())
        }
    });
    let (api_url, stub) = spawn_api_stub(respond).await;

    let publisher = GitHubPublisher::new("t0ken")
        .expect("publisher")
        .with_api_url(api_url.as_str());
    let release = publisher
        .publish("acme", "rocket", "rel_1.2.3_45", &[], None)
        .await
        .expect("publish");

    assert_eq!(release.id, 777);
    assert!(release.draft);
    stub.abort();
}

#[tokio::test]
async fn bad_credentials_surface_as_authentication_errors() {
    let respond: Responder =
        Arc::new(|_line: &str| (401, r#"{"message":"Bad credentials"}"#.to_string()));
    let (api_url, stub) = spawn_api_stub(respond).await;

    let publisher = GitHubPublisher::new("wrong")
        .expect("publisher")
        .with_api_url(api_url.as_str());
    let error = publisher
        .publish("acme", "rocket", "v1", &[], None)
        .await
        .expect_err("must fail");

    assert!(matches!(
        error,
        PublishError::Authentication { ref reason } if reason == "Bad credentials"
    ));
    stub.abort();
}
