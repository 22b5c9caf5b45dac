//! The tools exposed to MCP clients.
//!
//! Each tool is one row in [`REGISTRY`]: its name, a description for the
//! agent, a JSON schema for its arguments, and a parser that turns the
//! arguments into a [`ToolRequest`]. Executing a request is a thin call
//! into the [`Dispatcher`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};

use crate::rhino::intent::default_text_height;
use crate::rhino::{Color, Coordinate, DispatchOutcome, Dispatcher, HostConnection, Intent};

/// A tool definition for the `tools/list` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if needs fn(&T) -> bool
const fn is_false(b: &bool) -> bool {
    !*b
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    /// The text of the first content item.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|ToolContent::Text { text }| text.as_str())
    }
}

impl From<DispatchOutcome> for ToolCallResult {
    fn from(outcome: DispatchOutcome) -> Self {
        let is_error = outcome.is_error();
        Self {
            is_error,
            ..Self::text(outcome.message)
        }
    }
}

// ==================== Arguments ====================

/// Arguments of `create_text`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTextArgs {
    /// Text content.
    #[serde(default)]
    pub text: Option<String>,
    /// Insertion point.
    pub location: Coordinate,
    /// Text height in model units.
    #[serde(default = "default_text_height")]
    pub height: Number,
    /// Object name.
    #[serde(default)]
    pub name: Option<String>,
    /// Object colour `[r, g, b]`.
    #[serde(default)]
    pub color: Option<Color>,
}

/// Arguments of `create_text_dot`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTextDotArgs {
    /// Text content.
    #[serde(default)]
    pub text: Option<String>,
    /// Dot position.
    pub location: Coordinate,
    /// Object name.
    #[serde(default)]
    pub name: Option<String>,
    /// Object colour `[r, g, b]`.
    #[serde(default)]
    pub color: Option<Color>,
}

/// Arguments of `create_leader`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLeaderArgs {
    /// Polyline vertices, at least two.
    pub points: Vec<Coordinate>,
    /// Leader label.
    #[serde(default)]
    pub text: Option<String>,
    /// Object name.
    #[serde(default)]
    pub name: Option<String>,
    /// Object colour `[r, g, b]`.
    #[serde(default)]
    pub color: Option<Color>,
}

/// A parsed tool invocation.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    /// `create_text`
    CreateText(CreateTextArgs),
    /// `create_text_dot`
    CreateTextDot(CreateTextDotArgs),
    /// `create_leader`
    CreateLeader(CreateLeaderArgs),
    /// `get_document_info`
    GetDocumentInfo,
}

impl ToolRequest {
    /// Runs the request against `dispatcher`.
    pub async fn execute<C: HostConnection>(self, dispatcher: &mut Dispatcher<C>) -> DispatchOutcome {
        match self {
            Self::CreateText(args) => create_text(dispatcher, args).await,
            Self::CreateTextDot(args) => create_text_dot(dispatcher, args).await,
            Self::CreateLeader(args) => create_leader(dispatcher, args).await,
            Self::GetDocumentInfo => get_document_info(dispatcher).await,
        }
    }
}

// ==================== Entry points ====================

/// Creates a `TEXT` annotation.
pub async fn create_text<C: HostConnection>(
    dispatcher: &mut Dispatcher<C>,
    args: CreateTextArgs,
) -> DispatchOutcome {
    let intent = Intent::text(args.text, args.location, args.height)
        .with_name(args.name)
        .with_color(args.color);
    dispatcher.dispatch(&intent).await
}

/// Creates a `TEXT_DOT` annotation.
pub async fn create_text_dot<C: HostConnection>(
    dispatcher: &mut Dispatcher<C>,
    args: CreateTextDotArgs,
) -> DispatchOutcome {
    let intent = Intent::text_dot(args.text, args.location)
        .with_name(args.name)
        .with_color(args.color);
    dispatcher.dispatch(&intent).await
}

/// Creates a `LEADER` annotation.
///
/// Fewer than two points is rejected here; nothing is sent to Rhino.
pub async fn create_leader<C: HostConnection>(
    dispatcher: &mut Dispatcher<C>,
    args: CreateLeaderArgs,
) -> DispatchOutcome {
    match Intent::leader(args.points, args.text) {
        Ok(intent) => {
            let intent = intent.with_name(args.name).with_color(args.color);
            dispatcher.dispatch(&intent).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected leader before dispatch");
            DispatchOutcome::creation_failed(crate::rhino::ObjectKind::Leader, e)
        }
    }
}

/// Returns the active document's description as JSON.
pub async fn get_document_info<C: HostConnection>(
    dispatcher: &mut Dispatcher<C>,
) -> DispatchOutcome {
    dispatcher.document_info().await
}

// ==================== Registry ====================

/// One registered tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    /// Name used in `tools/call`.
    pub name: &'static str,
    /// Description shown to the agent.
    pub description: &'static str,
    schema: fn() -> Value,
    parse: fn(Value) -> Result<ToolRequest, serde_json::Error>,
}

impl ToolSpec {
    /// JSON schema of the arguments.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        (self.schema)()
    }

    /// Parses `arguments` into a request.
    ///
    /// # Errors
    ///
    /// Returns the deserialisation error if the arguments do not fit.
    pub fn parse(&self, arguments: Value) -> Result<ToolRequest, serde_json::Error> {
        (self.parse)(arguments)
    }

    /// The `tools/list` entry for this tool.
    #[must_use]
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            input_schema: self.input_schema(),
        }
    }
}

/// Every tool this server offers.
pub const REGISTRY: &[ToolSpec] = &[
    ToolSpec {
        name: "create_text",
        description: "Create a TEXT annotation at a location in the active Rhino document. \
                      Coordinates are model units. Falls back to RhinoScript if the plugin \
                      cannot create the object directly.",
        schema: create_text_schema,
        parse: parse_create_text,
    },
    ToolSpec {
        name: "create_text_dot",
        description: "Create a TEXT_DOT annotation at a location in the active Rhino document. \
                      Falls back to RhinoScript if the plugin cannot create the object directly.",
        schema: create_text_dot_schema,
        parse: parse_create_text_dot,
    },
    ToolSpec {
        name: "create_leader",
        description: "Create a LEADER annotation through at least two points, with an optional \
                      text label. Falls back to RhinoScript if the plugin cannot create the \
                      object directly.",
        schema: create_leader_schema,
        parse: parse_create_leader,
    },
    ToolSpec {
        name: "get_document_info",
        description: "Get detailed information about the current Rhino document as JSON.",
        schema: empty_schema,
        parse: parse_get_document_info,
    },
];

/// Looks up a tool by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static ToolSpec> {
    REGISTRY.iter().find(|spec| spec.name == name)
}

/// Definitions of all registered tools.
#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    REGISTRY.iter().map(ToolSpec::definition).collect()
}

/// Looks up, parses and runs a tool call.
pub async fn call<C: HostConnection>(
    dispatcher: &mut Dispatcher<C>,
    name: &str,
    arguments: Value,
) -> ToolCallResult {
    let Some(spec) = find(name) else {
        return ToolCallResult::error(format!("Unknown tool: {name}"));
    };

    let request = match spec.parse(arguments) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(tool = name, error = %e, "Rejected tool arguments");
            return ToolCallResult::error(format!("Invalid arguments for {name}: {e}"));
        }
    };

    tracing::debug!(tool = name, "Calling tool");
    request.execute(dispatcher).await.into()
}

fn parse_create_text(arguments: Value) -> Result<ToolRequest, serde_json::Error> {
    serde_json::from_value(arguments).map(ToolRequest::CreateText)
}

fn parse_create_text_dot(arguments: Value) -> Result<ToolRequest, serde_json::Error> {
    serde_json::from_value(arguments).map(ToolRequest::CreateTextDot)
}

fn parse_create_leader(arguments: Value) -> Result<ToolRequest, serde_json::Error> {
    serde_json::from_value(arguments).map(ToolRequest::CreateLeader)
}

#[allow(clippy::unnecessary_wraps, clippy::needless_pass_by_value)] // fits ToolSpec::parse
fn parse_get_document_info(_arguments: Value) -> Result<ToolRequest, serde_json::Error> {
    Ok(ToolRequest::GetDocumentInfo)
}

fn point_schema(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "number" },
        "minItems": 3,
        "maxItems": 3,
        "description": description
    })
}

fn color_schema() -> Value {
    json!({
        "type": "array",
        "items": { "type": "integer", "minimum": 0, "maximum": 255 },
        "description": "Optional [r, g, b] colour, 0-255 per component"
    })
}

fn create_text_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": { "type": "string", "description": "Text content" },
            "location": point_schema("[x, y, z] insertion point"),
            "height": {
                "type": "number",
                "description": "Text height in model units (default: 1.0)"
            },
            "name": { "type": "string", "description": "Optional object name" },
            "color": color_schema()
        },
        "required": ["text", "location"]
    })
}

fn create_text_dot_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": { "type": "string", "description": "Text content" },
            "location": point_schema("[x, y, z] position"),
            "name": { "type": "string", "description": "Optional object name" },
            "color": color_schema()
        },
        "required": ["text", "location"]
    })
}

fn create_leader_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "points": {
                "type": "array",
                "items": point_schema("[x, y, z] vertex"),
                "minItems": 2,
                "description": "Leader vertices (at least two)"
            },
            "text": { "type": "string", "description": "Optional leader text" },
            "name": { "type": "string", "description": "Optional object name" },
            "color": color_schema()
        },
        "required": ["points"]
    })
}

fn empty_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}
