//! WebSocket transport tests against a real listener on an ephemeral port.

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use streamscribe::config::Config;
use streamscribe::protocol::ServerEvent;
use streamscribe::server::{ServerState, serve_with_listener};
use streamscribe::stt::MockTranscriber;
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};

const SR: usize = 16000;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn start_server(mock: Arc<MockTranscriber>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = ServerState {
        transcriber: mock,
        config: Arc::new(Config::default()),
    };
    tokio::spawn(async move {
        let _ = serve_with_listener(listener, state).await;
    });
    addr
}

async fn connect(addr: std::net::SocketAddr) -> WsStream {
    let (stream, _) = connect_async(format!("ws://{}/", addr)).await.unwrap();
    stream
}

async fn next_event(ws: &mut WsStream) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for server event")
            .expect("connection closed unexpectedly")
            .unwrap();
        if let Message::Text(text) = msg {
            return ServerEvent::from_json(&text).unwrap();
        }
    }
}

fn two_seconds_pcm() -> Vec<u8> {
    vec![1000i16; 2 * SR]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect()
}

#[tokio::test]
async fn greeting_is_sent_on_connect() {
    let mock = Arc::new(MockTranscriber::new("mock"));
    let addr = start_server(mock).await;
    let mut ws = connect(addr).await;

    assert_eq!(
        next_event(&mut ws).await,
        ServerEvent::Info {
            message: "asr-ready".to_string()
        }
    );
}

#[tokio::test]
async fn audio_frame_produces_partial() {
    let mock = Arc::new(MockTranscriber::new("mock").with_response("spoken words"));
    let addr = start_server(mock).await;
    let mut ws = connect(addr).await;

    next_event(&mut ws).await; // greeting

    ws.send(Message::Binary(two_seconds_pcm())).await.unwrap();
    assert_eq!(
        next_event(&mut ws).await,
        ServerEvent::Partial {
            text: "spoken words".to_string()
        }
    );
}

#[tokio::test]
async fn control_message_is_acknowledged() {
    let mock = Arc::new(MockTranscriber::new("mock"));
    let addr = start_server(mock).await;
    let mut ws = connect(addr).await;

    next_event(&mut ws).await; // greeting

    ws.send(Message::Text(
        r#"{"type": "control", "setLanguage": "de"}"#.to_string(),
    ))
    .await
    .unwrap();
    assert_eq!(
        next_event(&mut ws).await,
        ServerEvent::Info {
            message: "lang-set:de".to_string()
        }
    );
}

#[tokio::test]
async fn odd_length_frame_yields_error_but_keeps_connection() {
    let mock = Arc::new(MockTranscriber::new("mock").with_response("still here"));
    let addr = start_server(mock).await;
    let mut ws = connect(addr).await;

    next_event(&mut ws).await; // greeting

    ws.send(Message::Binary(vec![0u8, 1, 2])).await.unwrap();
    assert!(matches!(
        next_event(&mut ws).await,
        ServerEvent::Error { .. }
    ));

    // Connection survives: a valid frame still transcribes.
    ws.send(Message::Binary(two_seconds_pcm())).await.unwrap();
    assert_eq!(
        next_event(&mut ws).await,
        ServerEvent::Partial {
            text: "still here".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_text_yields_error_event() {
    let mock = Arc::new(MockTranscriber::new("mock"));
    let addr = start_server(mock).await;
    let mut ws = connect(addr).await;

    next_event(&mut ws).await; // greeting

    ws.send(Message::Text("not json".to_string())).await.unwrap();
    match next_event(&mut ws).await {
        ServerEvent::Error { message } => assert!(message.starts_with("bad msg:")),
        other => panic!("expected error event, got {:?}", other),
    }
}

#[tokio::test]
async fn sessions_are_independent() {
    let mock = Arc::new(MockTranscriber::new("mock").with_responses(&["from first", "from second"]));
    let addr = start_server(mock.clone()).await;

    let mut first = connect(addr).await;
    let mut second = connect(addr).await;
    next_event(&mut first).await;
    next_event(&mut second).await;

    // A language hint on the first connection must not leak into the second.
    first
        .send(Message::Text(
            r#"{"type": "control", "setLanguage": "de"}"#.to_string(),
        ))
        .await
        .unwrap();
    next_event(&mut first).await; // ack

    second.send(Message::Binary(two_seconds_pcm())).await.unwrap();
    assert!(matches!(
        next_event(&mut second).await,
        ServerEvent::Partial { .. }
    ));
    assert_eq!(mock.calls()[0].language, None);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let mock = Arc::new(MockTranscriber::new("mock"));
    let addr = start_server(mock).await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/health", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}
