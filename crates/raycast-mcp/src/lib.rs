//! raycast-mcp - Raycast automation over the Model Context Protocol
//!
//! Exposes Raycast and macOS automation as MCP tools over stdio (JSON-RPC
//! 2.0). Each `tools/call` is parsed into a typed call, resolved to a single
//! command descriptor, confirmed when destructive, executed with a bounded
//! timeout and returned as one text response.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod format;
pub mod gate;
pub mod manifest;
pub mod protocol;
pub mod request;
pub mod resolver;
pub mod server;
pub mod tools;
pub mod workflows;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use server::McpServer;
