//! A stand-in for the Rhino plugin socket.
//!
//! Listens on an ephemeral local port, decodes each request with the same
//! reader the client uses, and answers through a responder function.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use rhino_mcp::config::RhinoConfig;
use rhino_mcp::rhino::connection::read_response;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Decides the reply to request number `index`. `None` hangs up.
pub type Responder = fn(request: &Value, index: usize) -> Option<Value>;

pub struct FakeRhino {
    pub address: SocketAddr,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeRhino {
    pub async fn spawn(responder: Responder) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    while let Ok(request) = read_response(&mut socket).await {
                        let index = {
                            let mut log = log.lock().unwrap();
                            log.push(request.clone());
                            log.len() - 1
                        };
                        let Some(reply) = responder(&request, index) else {
                            return;
                        };
                        if socket.write_all(reply.to_string().as_bytes()).await.is_err() {
                            return;
                        }
                    }
                });
            }
        });

        Self { address, requests }
    }

    /// Accepts connections and reads requests but never answers.
    pub async fn silent() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    if let Ok(request) = read_response(&mut socket).await {
                        log.lock().unwrap().push(request);
                    }
                    // Hold the socket open until the client gives up.
                    let mut rest = Vec::new();
                    let _ = socket.read_to_end(&mut rest).await;
                });
            }
        });

        Self { address, requests }
    }

    pub fn config(&self) -> RhinoConfig {
        config_for(self.address)
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["type"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

pub fn config_for(address: SocketAddr) -> RhinoConfig {
    RhinoConfig {
        host: address.ip().to_string(),
        port: address.port(),
        timeout_secs: 5,
    }
}

/// An address nothing is listening on.
pub async fn unreachable_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    address
}

pub fn success(result: Value) -> Option<Value> {
    Some(json!({ "status": "success", "result": result }))
}

pub fn failure(message: &str) -> Option<Value> {
    Some(json!({ "status": "error", "message": message }))
}

/// Creates everything, echoing the requested name.
pub fn accept_all(request: &Value, _index: usize) -> Option<Value> {
    match request["type"].as_str() {
        Some("create_object") => {
            let name = request["params"]["name"].clone();
            success(json!({ "id": "7f1c", "name": name }))
        }
        Some("get_document_info") => success(json!({
            "name": "bracket.3dm",
            "units": "Millimeters",
            "objects": { "count": 3 }
        })),
        _ => success(json!({})),
    }
}

/// Rejects structured commands but runs scripts.
pub fn scripts_only(request: &Value, _index: usize) -> Option<Value> {
    match request["type"].as_str() {
        Some("execute_rhinoscript_python_code") => success(json!({ "result": "ok" })),
        Some(other) => failure(&format!("Unsupported command: {other}")),
        None => failure("Missing command type"),
    }
}

/// Rejects everything.
pub fn reject_all(_request: &Value, _index: usize) -> Option<Value> {
    failure("Rhino is busy")
}
