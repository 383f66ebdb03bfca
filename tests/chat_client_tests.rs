//! HTTP transport tests against a one-shot mock backend on a local port.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tutor_chat::chat::{ChatRequest, ChatResponse, ChatTransport, HttpChatClient};
use tutor_chat::history::{ChatMessage, History, Role};
use tutor_chat::storage::MemoryStore;
use tutor_chat::{ChatSession, TutorError};

/// What the mock backend received.
#[derive(Debug)]
struct Captured {
    method: String,
    path: String,
    content_type: Option<String>,
    body: serde_json::Value,
}

/// Accept one connection, parse the request with httparse, answer with
/// `status` and `body`, and hand back what was received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let captured = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending a full request");
            buf.extend_from_slice(&chunk[..n]);

            let mut headers = [httparse::EMPTY_HEADER; 32];
            let mut req = httparse::Request::new(&mut headers);
            let httparse::Status::Complete(header_len) = req.parse(&buf).unwrap() else {
                continue;
            };
            let header = |name: &str| {
                req.headers
                    .iter()
                    .find(|h| h.name.eq_ignore_ascii_case(name))
                    .map(|h| String::from_utf8_lossy(h.value).into_owned())
            };
            let content_len: usize = header("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            if buf.len() < header_len + content_len {
                continue;
            }

            break Captured {
                method: req.method.unwrap_or_default().to_string(),
                path: req.path.unwrap_or_default().to_string(),
                content_type: header("content-type"),
                body: serde_json::from_slice(&buf[header_len..header_len + content_len])
                    .unwrap_or(serde_json::Value::Null),
            };
        };

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
        captured
    });

    (endpoint, handle)
}

fn client(endpoint: &str) -> HttpChatClient {
    HttpChatClient::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_send_posts_json_and_parses_reply() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"response":"Salut !","audio_url":"/api/audio/salut.mp3","intent":"conversation"}"#,
    )
    .await;

    let mut history = History::new();
    history.push(ChatMessage::new(Role::User, "bonjour"));
    let request = ChatRequest {
        message: "bonjour",
        history: &history,
    };
    let response = client(&endpoint).send(&request).await.unwrap();

    assert_eq!(
        response,
        ChatResponse {
            response: Some("Salut !".to_string()),
            audio_url: Some("/api/audio/salut.mp3".to_string()),
            error: None,
        }
    );

    let captured = server.await.unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/api/chat");
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
    assert_eq!(captured.body["message"], "bonjour");
    assert_eq!(captured.body["history"][0]["role"], "user");
}

#[tokio::test]
async fn test_send_non_success_status_is_http_error() {
    let (endpoint, server) =
        serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;
    let history = History::new();
    let request = ChatRequest {
        message: "x",
        history: &history,
    };
    let err = client(&endpoint).send(&request).await.unwrap_err();
    assert!(matches!(err, TutorError::Http { status: 500 }));
    server.await.unwrap();
}

#[tokio::test]
async fn test_send_invalid_body_is_json_error() {
    let (endpoint, server) = serve_once("200 OK", "<html>oops</html>").await;
    let history = History::new();
    let request = ChatRequest {
        message: "x",
        history: &history,
    };
    let err = client(&endpoint).send(&request).await.unwrap_err();
    assert!(matches!(err, TutorError::Json(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_send_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let history = History::new();
    let request = ChatRequest {
        message: "x",
        history: &history,
    };
    let err = client(&endpoint).send(&request).await.unwrap_err();
    assert!(matches!(err, TutorError::Transport(_)));
}

#[tokio::test]
async fn test_session_renders_backend_failure_inline() {
    let (endpoint, server) = serve_once("503 Service Unavailable", "{}").await;
    let mut session = ChatSession::new(client(&endpoint), MemoryStore::new());

    let turn = session.submit_message("Comment ça va ?").await.unwrap();
    server.await.unwrap();

    assert_eq!(turn.messages.len(), 2);
    assert_eq!(turn.messages[1].role, Role::Assistant);
    assert!(turn.messages[1].content.contains("HTTP error! status: 503"));
    assert!(!session.is_busy());
}

#[tokio::test]
async fn test_session_end_to_end_reply_is_formatted() {
    let (endpoint, server) = serve_once(
        "200 OK",
        r#"{"response":"**Très bien** <script>x</script>","audio_url":"/api/audio/a.mp3"}"#,
    )
    .await;
    let mut session = ChatSession::new(client(&endpoint), MemoryStore::new());

    let turn = session.submit_message("Je vais bien").await.unwrap();
    let captured = server.await.unwrap();

    assert_eq!(captured.body["message"], "Je vais bien");
    assert_eq!(captured.body["history"].as_array().unwrap().len(), 1);

    let reply = &turn.messages[1];
    assert!(reply.html.starts_with("<strong>"));
    assert!(reply.html.contains("&lt;script&gt;"));
    assert!(!reply.html.contains("<script>"));
    assert_eq!(turn.audio_url.as_deref(), Some("/api/audio/a.mp3"));
}
