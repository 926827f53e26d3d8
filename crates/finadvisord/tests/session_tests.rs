//! WebSocket session tests against a live server on an ephemeral port

use finadvisor_common::{Advice, AdviceResponse};
use finadvisord::config::Config;
use finadvisord::{AdvisorServer, RunningServer};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server() -> RunningServer {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    AdvisorServer::bind(config).await.unwrap().start().unwrap()
}

async fn connect(server: &RunningServer) -> Client {
    let url = format!("ws://{}/ws", server.local_addr());
    let (client, _response) = connect_async(url).await.unwrap();
    client
}

/// Next frame that is not keep-alive traffic
async fn next_frame(client: &mut Client) -> Option<Message> {
    loop {
        let frame = timeout(READ_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for frame");
        match frame {
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            Some(Ok(msg)) => return Some(msg),
            Some(Err(_)) | None => return None,
        }
    }
}

async fn ask(client: &mut Client, income: f64, expenses: f64, savings: f64, debt: f64) -> String {
    let body = serde_json::json!({
        "income": income,
        "expenses": expenses,
        "savings": savings,
        "debt": debt,
    });
    client.send(Message::Text(body.to_string())).await.unwrap();

    match next_frame(client).await {
        Some(Message::Text(text)) => {
            let reply: AdviceResponse = serde_json::from_str(&text).unwrap();
            reply.advice
        }
        other => panic!("expected advice text, got {:?}", other),
    }
}

async fn expect_close(client: &mut Client, code: CloseCode) {
    match next_frame(client).await {
        Some(Message::Close(Some(frame))) => assert_eq!(frame.code, code),
        other => panic!("expected close {:?}, got {:?}", code, other),
    }
}

#[tokio::test]
async fn test_session_answers_each_message_independently() {
    let server = start_server().await;
    let mut client = connect(&server).await;

    assert_eq!(
        ask(&mut client, 1000.0, 500.0, 200.0, 1200.0).await,
        Advice::PayDownDebt.message()
    );
    assert_eq!(
        ask(&mut client, 3000.0, 500.0, 4000.0, 0.0).await,
        Advice::Invest.message()
    );
    // Same input again: no history influences the answer
    assert_eq!(
        ask(&mut client, 1000.0, 500.0, 200.0, 1200.0).await,
        Advice::PayDownDebt.message()
    );
    assert_eq!(
        ask(&mut client, 1000.0, 0.0, 0.0, 0.0).await,
        Advice::KeepSaving.message()
    );

    client.close(None).await.unwrap();
    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_session_ping_does_not_produce_advice() {
    let server = start_server().await;
    let mut client = connect(&server).await;

    client.send(Message::Ping(vec![1, 2, 3])).await.unwrap();
    assert_eq!(
        ask(&mut client, 3000.0, 1000.0, 2000.0, 0.0).await,
        Advice::BuildEmergencyFund.message()
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_session_malformed_message_closes() {
    let server = start_server().await;
    let mut client = connect(&server).await;

    assert_eq!(
        ask(&mut client, 3000.0, 1000.0, 3500.0, 500.0).await,
        Advice::KeepSaving.message()
    );

    client
        .send(Message::Text(r#"{"income": 3000, "expenses": 1000}"#.to_string()))
        .await
        .unwrap();
    expect_close(&mut client, CloseCode::Invalid).await;

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_session_binary_frame_closes() {
    let server = start_server().await;
    let mut client = connect(&server).await;

    client.send(Message::Binary(b"{}".to_vec())).await.unwrap();
    expect_close(&mut client, CloseCode::Invalid).await;

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let server = start_server().await;
    let mut first = connect(&server).await;
    let mut second = connect(&server).await;

    // Breaking one session leaves the other usable
    first
        .send(Message::Text("not json".to_string()))
        .await
        .unwrap();
    expect_close(&mut first, CloseCode::Invalid).await;

    assert_eq!(
        ask(&mut second, 1000.0, 1000.0, 5000.0, 0.0).await,
        Advice::CutExpenses.message()
    );

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_closes_open_sessions() {
    let server = start_server().await;
    let mut client = connect(&server).await;

    // Make sure the session task is running before stopping
    assert_eq!(
        ask(&mut client, 3000.0, 500.0, 4000.0, 0.0).await,
        Advice::Invest.message()
    );

    let stopping = tokio::spawn(server.stop());
    expect_close(&mut client, CloseCode::Away).await;

    stopping.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_session_accepts_numeric_strings() {
    let server = start_server().await;
    let mut client = connect(&server).await;

    client
        .send(Message::Text(
            r#"{"income": "3000", "expenses": "500", "savings": 4000, "debt": "0"}"#.to_string(),
        ))
        .await
        .unwrap();
    match next_frame(&mut client).await {
        Some(Message::Text(text)) => {
            let reply: AdviceResponse = serde_json::from_str(&text).unwrap();
            assert_eq!(reply.advice, Advice::Invest.message());
        }
        other => panic!("expected advice text, got {:?}", other),
    }

    client
        .send(Message::Text(
            r#"{"income": "lots", "expenses": 500, "savings": 4000, "debt": 0}"#.to_string(),
        ))
        .await
        .unwrap();
    expect_close(&mut client, CloseCode::Invalid).await;

    server.stop().await.unwrap();
}

/// Mirrors the daemon's exit path: `stop()` returns, then the runtime that
/// served the session is dropped. The close frame must already be on the wire.
#[test]
fn test_close_sent_before_server_runtime_drops() {
    let client_rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    for _ in 0..10 {
        let server_rt = tokio::runtime::Runtime::new().unwrap();
        let server = server_rt.block_on(start_server());

        let mut client = client_rt.block_on(async {
            let mut client = connect(&server).await;
            assert_eq!(
                ask(&mut client, 3000.0, 500.0, 4000.0, 0.0).await,
                Advice::Invest.message()
            );
            client
        });

        server_rt.block_on(server.stop()).unwrap();
        drop(server_rt);

        client_rt.block_on(expect_close(&mut client, CloseCode::Away));
    }
}
