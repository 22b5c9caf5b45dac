//! Error types for talking to the Rhino host.

use std::io;
use thiserror::Error;

/// Result type for host round trips.
pub type HostResult<T> = Result<T, HostError>;

/// Errors that can occur while sending a command to Rhino.
///
/// The `Display` text of each variant is what ends up in tool responses,
/// so it is written for the agent reading it.
#[derive(Debug, Error)]
pub enum HostError {
    /// The TCP connection to the plugin could not be established.
    #[error("could not connect to Rhino at {address}: {source}")]
    Connect {
        /// `host:port` that was dialled.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to an established connection failed.
    #[error("connection to Rhino failed: {0}")]
    Io(#[from] io::Error),

    /// The host did not answer within the configured timeout.
    #[error("timed out after {seconds}s waiting for Rhino")]
    Timeout {
        /// Configured timeout in seconds.
        seconds: u64,
    },

    /// The host closed the socket before a complete response arrived.
    #[error("Rhino closed the connection before sending a complete response")]
    Closed,

    /// The bytes received were not valid JSON.
    #[error("invalid response from Rhino: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// The response did not start with a JSON object.
    #[error("invalid response from Rhino: expected a JSON object")]
    NotAnObject,

    /// The response grew past the size limit without completing.
    #[error("response from Rhino exceeded {limit} bytes")]
    ResponseTooLarge {
        /// Maximum accepted response size in bytes.
        limit: usize,
    },

    /// A request could not be encoded.
    #[error("failed to encode command '{command}': {source}")]
    Encode {
        /// Command being sent.
        command: String,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// The host processed the command and reported a failure.
    #[error("{0}")]
    Rejected(String),
}

impl HostError {
    /// Returns `true` if the socket should be dropped after this error.
    ///
    /// A rejection is a well-formed answer, so the connection stays usable.
    #[must_use]
    pub const fn poisons_connection(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_displays_host_message_verbatim() {
        let error = HostError::Rejected("Unknown object type: BOX".to_string());
        assert_eq!(error.to_string(), "Unknown object type: BOX");
        assert!(!error.poisons_connection());
    }

    #[test]
    fn connect_error_names_address() {
        let error = HostError::Connect {
            address: "127.0.0.1:1999".to_string(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        let msg = error.to_string();
        assert!(msg.contains("127.0.0.1:1999"));
        assert!(error.poisons_connection());
    }

    #[test]
    fn timeout_display() {
        let error = HostError::Timeout { seconds: 15 };
        assert_eq!(error.to_string(), "timed out after 15s waiting for Rhino");
        assert!(error.poisons_connection());
    }

    #[test]
    fn framing_errors_poison_the_connection() {
        assert!(HostError::NotAnObject.poisons_connection());
        let error = HostError::ResponseTooLarge { limit: 64 };
        assert_eq!(error.to_string(), "response from Rhino exceeded 64 bytes");
        assert!(error.poisons_connection());
    }
}
