//! Connection to the Rhino plugin.
//!
//! The plugin listens on a TCP socket and speaks a simple JSON protocol:
//!
//! ```text
//! client → {"type": "<command>", "params": { ... }}
//! host   → {"status": "success", "result": { ... }}
//!        | {"status": "error", "message": "..."}
//! ```
//!
//! There is no length prefix or delimiter. Every response is a JSON object,
//! and it is complete once the bytes received so far parse as one.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::RhinoConfig;
use crate::rhino::error::{HostError, HostResult};

/// Command that creates an object from a structured description.
pub const CREATE_OBJECT: &str = "create_object";

/// Command that runs RhinoScript (IronPython) source inside Rhino.
pub const EXECUTE_SCRIPT: &str = "execute_rhinoscript_python_code";

/// Command that returns a summary of the active document.
pub const GET_DOCUMENT_INFO: &str = "get_document_info";

const READ_CHUNK: usize = 8192;

/// Largest response accepted from the plugin.
pub const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Something that can deliver commands to a Rhino host.
///
/// The dispatcher only depends on this trait, so tests can substitute a
/// scripted host for the real socket.
#[allow(async_fn_in_trait)] // used with concrete types on a single-threaded runtime
pub trait HostConnection {
    /// Sends `command` with optional `params` and returns the host's result.
    ///
    /// # Errors
    ///
    /// Returns a [`HostError`] if the command cannot be delivered, no valid
    /// answer arrives, or the host reports a failure.
    async fn send_command(&mut self, command: &str, params: Option<Value>) -> HostResult<Value>;

    /// Releases any open connection. The next command reconnects.
    fn disconnect(&mut self) {}
}

/// TCP connection to the Rhino plugin.
///
/// Connects lazily on the first command and drops the socket after any
/// transport or protocol failure so the following command starts fresh.
#[derive(Debug)]
pub struct RhinoConnection {
    config: RhinoConfig,
    stream: Option<TcpStream>,
}

impl RhinoConnection {
    /// Creates an unconnected handle for the configured host.
    #[must_use]
    pub const fn new(config: RhinoConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// `host:port` of the plugin.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Returns `true` while a socket is open.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn stream(&mut self) -> HostResult<&mut TcpStream> {
        if self.stream.is_none() {
            let address = self.address();
            let stream = TcpStream::connect(&address)
                .await
                .map_err(|source| HostError::Connect {
                    address: address.clone(),
                    source,
                })?;
            tracing::info!(address = %address, "Connected to Rhino");
            self.stream = Some(stream);
        }
        self.stream.as_mut().ok_or(HostError::Closed)
    }
}

impl HostConnection for RhinoConnection {
    async fn send_command(&mut self, command: &str, params: Option<Value>) -> HostResult<Value> {
        let request = encode_request(command, params)?;
        let seconds = self.config.timeout_secs;

        tracing::debug!(command, bytes = request.len(), "Sending command to Rhino");

        let outcome = tokio::time::timeout(Duration::from_secs(seconds), async {
            let stream = self.stream().await?;
            exchange(stream, &request).await
        })
        .await
        .unwrap_or(Err(HostError::Timeout { seconds }));

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                if e.poisons_connection() {
                    self.disconnect();
                }
                return Err(e);
            }
        };

        let result = interpret_response(response);
        if let Err(ref e) = result {
            tracing::debug!(command, error = %e, "Rhino rejected command");
        }
        result
    }

    fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            tracing::info!(address = %self.address(), "Disconnected from Rhino");
        }
    }
}

/// Encodes `{"type": command, "params": params}`; missing params become `{}`.
///
/// # Errors
///
/// Returns [`HostError::Encode`] if the payload cannot be serialised.
pub fn encode_request(command: &str, params: Option<Value>) -> HostResult<Vec<u8>> {
    let request = json!({
        "type": command,
        "params": params.unwrap_or_else(|| json!({})),
    });
    serde_json::to_vec(&request).map_err(|source| HostError::Encode {
        command: command.to_string(),
        source,
    })
}

/// Writes one request and reads back one JSON response.
///
/// # Errors
///
/// Returns an error if I/O fails or the response is not valid JSON.
pub async fn exchange<S>(stream: &mut S, request: &[u8]) -> HostResult<Value>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(request).await?;
    stream.flush().await?;
    read_response(stream).await
}

/// Reads until the accumulated bytes form one complete JSON object.
///
/// # Errors
///
/// See [`read_response_within`]; the limit is [`MAX_RESPONSE_BYTES`].
pub async fn read_response<R>(reader: &mut R) -> HostResult<Value>
where
    R: AsyncRead + Unpin,
{
    read_response_within(reader, MAX_RESPONSE_BYTES).await
}

/// Reads one JSON object of at most `limit` bytes.
///
/// Only objects are accepted: a bare scalar split across reads could parse
/// early and leave its tail unread.
///
/// # Errors
///
/// Returns [`HostError::Closed`] on EOF before a complete object,
/// [`HostError::NotAnObject`] if the first non-whitespace byte is not `{`,
/// [`HostError::ResponseTooLarge`] past `limit`, or
/// [`HostError::InvalidResponse`] if the bytes cannot be JSON.
pub async fn read_response_within<R>(reader: &mut R, limit: usize) -> HostResult<Value>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(READ_CHUNK.min(limit));
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(HostError::Closed);
        }
        buffer.extend_from_slice(&chunk[..n]);

        if buffer.len() > limit {
            return Err(HostError::ResponseTooLarge { limit });
        }
        match buffer.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') => {}
            Some(_) => return Err(HostError::NotAnObject),
            None => continue,
        }

        match serde_json::from_slice::<Value>(&buffer) {
            Ok(value) => {
                tracing::trace!(bytes = buffer.len(), "Received response from Rhino");
                return Ok(value);
            }
            Err(e) if e.is_eof() => {}
            Err(e) => return Err(HostError::InvalidResponse(e)),
        }
    }
}

/// Unwraps a host response envelope.
///
/// # Errors
///
/// Returns [`HostError::Rejected`] when `status` is `"error"`.
pub fn interpret_response(response: Value) -> HostResult<Value> {
    if response.get("status").and_then(Value::as_str) == Some("error") {
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(HostError::Rejected(message.to_string()));
    }

    Ok(match response {
        Value::Object(mut envelope) => envelope.remove("result").unwrap_or_else(|| json!({})),
        _ => json!({}),
    })
}
