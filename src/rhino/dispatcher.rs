//! Two-path command dispatch.
//!
//! Every creation request first goes to the plugin as a structured
//! `create_object` command. If that fails for any reason, the intent is
//! rendered as RhinoScript and sent through `execute_rhinoscript_python_code`
//! instead. Only when both fail does the caller see an error, and even then
//! it arrives as a message rather than an `Err`.

use serde_json::{json, Value};
use thiserror::Error;

use crate::rhino::connection::{HostConnection, CREATE_OBJECT, EXECUTE_SCRIPT, GET_DOCUMENT_INFO};
use crate::rhino::error::HostError;
use crate::rhino::intent::{Intent, ObjectKind};
use crate::rhino::response::{self, ErrorBody};
use crate::rhino::script;

/// Error code attached to failed document queries.
pub const DOC_INFO_ERROR: &str = "DOC_INFO_ERROR";

/// Name reported when the host does not return one.
const UNNAMED: &str = "unnamed";

/// Failures seen by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The generated script could not be executed.
    #[error("{source}")]
    Fallback {
        /// Object type being created.
        kind: ObjectKind,
        /// Underlying host error.
        #[source]
        source: HostError,
    },

    /// `get_document_info` failed. There is no fallback for queries.
    #[error("{0}")]
    DocumentQuery(#[source] HostError),
}

impl DispatchError {
    /// Machine-readable code for the error body.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Fallback { kind, .. } => format!("CREATE_{}_FALLBACK_ERROR", kind.tag()),
            Self::DocumentQuery(_) => DOC_INFO_ERROR.to_string(),
        }
    }

    /// Builds the uniform error body.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        response::from_error(self, Some(&self.code()))
    }
}

/// Which path produced a [`DispatchOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Answered by the structured command.
    Primary,
    /// Answered by the generated script.
    Fallback,
    /// Nothing worked; the message describes the error.
    Failed,
}

/// Message returned to the tool caller together with how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Text handed back to the agent.
    pub message: String,
    /// Path that produced the message.
    pub route: Route,
}

impl DispatchOutcome {
    fn new(message: impl Into<String>, route: Route) -> Self {
        Self {
            message: message.into(),
            route,
        }
    }

    /// A failed creation: `"Error creating <label>: <reason>"`.
    #[must_use]
    pub fn creation_failed(kind: ObjectKind, reason: impl std::fmt::Display) -> Self {
        Self::new(
            format!("Error creating {}: {reason}", kind.label()),
            Route::Failed,
        )
    }

    /// Returns `true` if the call failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.route == Route::Failed
    }
}

/// Sends intents to Rhino, falling back to RhinoScript when needed.
#[derive(Debug)]
pub struct Dispatcher<C> {
    connection: C,
}

impl<C: HostConnection> Dispatcher<C> {
    /// Creates a dispatcher that owns `connection`.
    #[must_use]
    pub const fn new(connection: C) -> Self {
        Self { connection }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// Closes the connection. Called once at shutdown.
    pub fn shutdown(&mut self) {
        self.connection.disconnect();
    }

    /// Creates the object described by `intent`.
    ///
    /// Never fails: errors are folded into the returned message.
    pub async fn dispatch(&mut self, intent: &Intent) -> DispatchOutcome {
        let kind = intent.kind();

        // A failed primary command is only logged; the fallback decides the outcome.
        let primary = match self
            .connection
            .send_command(CREATE_OBJECT, Some(intent.command_params()))
            .await
        {
            Ok(result) => {
                tracing::debug!(%kind, "Created object via plugin command");
                return DispatchOutcome::new(
                    format!("Created {kind}: {}", reported_name(&result)),
                    Route::Primary,
                );
            }
            Err(e) => e,
        };

        tracing::warn!(
            %kind,
            error = %primary,
            "Falling back to RhinoScript for {}",
            kind.label()
        );

        match self.run_fallback(intent).await {
            Ok(()) => {
                let message = intent.name().map_or_else(
                    || format!("Created {kind}"),
                    |name| format!("Created {kind}: {name}"),
                );
                DispatchOutcome::new(message, Route::Fallback)
            }
            Err(e) => {
                tracing::error!(%kind, error = %e, "Error creating {} via fallback", kind.label());
                DispatchOutcome::creation_failed(kind, e.to_body().message)
            }
        }
    }

    async fn run_fallback(&mut self, intent: &Intent) -> Result<(), DispatchError> {
        let code = script::render(intent);
        tracing::trace!(script = %code, "Generated RhinoScript");

        self.connection
            .send_command(EXECUTE_SCRIPT, Some(json!({ "code": code })))
            .await
            .map(|_| ())
            .map_err(|source| DispatchError::Fallback {
                kind: intent.kind(),
                source,
            })
    }

    /// Queries the active document.
    ///
    /// Returns the host's answer as pretty-printed JSON, or a JSON
    /// [`ErrorBody`] with code [`DOC_INFO_ERROR`].
    pub async fn document_info(&mut self) -> DispatchOutcome {
        let result = self
            .connection
            .send_command(GET_DOCUMENT_INFO, None)
            .await
            .map_err(DispatchError::DocumentQuery)
            .and_then(|info| {
                serde_json::to_string_pretty(&info).map_err(|e| {
                    DispatchError::DocumentQuery(HostError::InvalidResponse(e))
                })
            });

        match result {
            Ok(json) => DispatchOutcome::new(json, Route::Primary),
            Err(e) => {
                tracing::error!(error = %e, "Error getting document info from Rhino");
                DispatchOutcome::new(e.to_body().to_json(), Route::Failed)
            }
        }
    }
}

/// Extracts the `name` the host gave the new object.
fn reported_name(result: &Value) -> String {
    match result.get("name") {
        Some(Value::String(name)) => name.clone(),
        None | Some(Value::Null) => UNNAMED.to_string(),
        Some(other) => other.to_string(),
    }
}
