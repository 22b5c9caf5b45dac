//! rhino-mcp: MCP server for creating annotations in Rhino
//!
//! This library lets AI assistants place text, text dots and leaders in a
//! running Rhino document and read document metadata.
//!
//! # Architecture
//!
//! Each creation tool is sent to the Rhino plugin as a structured
//! `create_object` command. If the plugin cannot handle it, the same
//! request is rendered as a RhinoScript program and executed inside Rhino's
//! Python interpreter instead. Failures never escape a tool call; they come
//! back as an error message.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Configuration error types
//! - [`mcp`] - MCP protocol implementation and tool registry
//! - [`rhino`] - Intents, dispatch, script generation and the host connection

pub mod config;
pub mod error;
pub mod mcp;
pub mod rhino;
