//! Model Context Protocol (MCP) server implementation.
//!
//! This module exposes the Rhino annotation operations as MCP tools. The
//! server communicates over stdio transport using JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         MCP Server                           │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │   │  Transport  │───▶│   Server    │───▶│   Tools     │     │
//! │   │   (stdio)   │    │ (lifecycle) │    │ (registry)  │     │
//! │   └─────────────┘    └─────────────┘    └──────┬──────┘     │
//! │                                                │            │
//! │                                         ┌──────▼──────┐     │
//! │                                         │ Dispatcher  │─────┼──▶ Rhino
//! │                                         └─────────────┘     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, Reply, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::{StdioTransport, Transport};
