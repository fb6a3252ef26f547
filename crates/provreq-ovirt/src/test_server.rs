//! Minimal plain-HTTP responder for client tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: String,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self { status, body: body.to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

pub struct TestServer {
    addr: std::net::SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl TestServer {
    /// Serve `routes` (exact path match, 404 otherwise) until the runtime ends.
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: HashMap<String, Reply> =
            routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_by_server = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else { break };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let request = parse_request(&String::from_utf8_lossy(&buf));
                let reply = routes
                    .get(&request.path)
                    .cloned()
                    .unwrap_or_else(|| Reply::json(404, ""));
                seen_by_server.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.body.len(),
                    reply.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { addr, seen }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/ovirt-engine/api", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }
}

fn parse_request(raw: &str) -> SeenRequest {
    let mut lines = raw.lines();
    let path = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    let mut request = SeenRequest { path, ..SeenRequest::default() };
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "authorization" => request.authorization = Some(value.trim().to_string()),
                "accept" => request.accept = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }
    request
}
