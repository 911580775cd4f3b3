//! Local stand-in for the Telegram Bot API
//!
//! Serves one request per connection. `getUpdates` answers come from a script;
//! once it runs out, an empty batch is returned after a short pause.
//! `sendMessage` always succeeds. Every request is recorded.

use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const TOKEN: &str = "123456:test-token";

/// A request the fake received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub body: Value,
}

/// Scripted reply: HTTP status and raw body
pub type Reply = (u16, String);

pub struct FakeBotApi {
    pub url: String,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
    task: tokio::task::JoinHandle<()>,
}

impl FakeBotApi {
    pub async fn start(updates: Vec<Reply>) -> Self {
        bypass_proxy();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(Mutex::new(VecDeque::from(updates)));

        let recorded = requests.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(serve(stream, recorded.clone(), script.clone()));
            }
        });

        Self {
            url,
            requests,
            task,
        }
    }

    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method)
            .map(|r| r.body.clone())
            .collect()
    }
}

impl Drop for FakeBotApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keep loopback requests away from any proxy configured in the environment.
/// Must run before the shared HTTP client is first used.
pub fn bypass_proxy() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    std::env::set_var("no_proxy", "127.0.0.1,localhost");
}

/// `getUpdates` reply carrying one text message
pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Reply {
    let body = json!({
        "ok": true,
        "result": [{
            "update_id": update_id,
            "message": { "message_id": update_id, "chat": { "id": chat_id }, "text": text }
        }]
    });
    (200, body.to_string())
}

async fn serve(
    mut stream: TcpStream,
    requests: Arc<Mutex<Vec<Recorded>>>,
    script: Arc<Mutex<VecDeque<Reply>>>,
) {
    let Some((path, body)) = read_request(&mut stream).await else {
        return;
    };
    let method = path.rsplit('/').next().unwrap_or_default().to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        body: body.clone(),
    });

    let (status, reply) = match method.as_str() {
        "getUpdates" => {
            let next = script.lock().unwrap().pop_front();
            match next {
                Some(reply) => reply,
                None => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    (200, r#"{"ok":true,"result":[]}"#.to_string())
                }
            }
        }
        "sendMessage" => {
            let chat_id = body["chat_id"].as_str().unwrap_or("0").parse::<i64>().unwrap_or(0);
            let reply = json!({
                "ok": true,
                "result": { "message_id": 1, "chat": { "id": chat_id }, "text": body["text"] }
            });
            (200, reply.to_string())
        }
        _ => (
            404,
            r#"{"ok":false,"error_code":404,"description":"Not Found"}"#.to_string(),
        ),
    };

    let response = format!(
        "HTTP/1.1 {} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Read one HTTP/1.1 request, returning its path and body
async fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head.lines().next()?.split_whitespace().nth(1)?.to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some((path, body))
}
