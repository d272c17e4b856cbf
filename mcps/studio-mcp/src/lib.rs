//! Studio MCP Library
//!
//! Exposes the studio orchestrator over MCP: named and custom workflows,
//! single agent runs, multi-model consensus and two-phase collaboration.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use studio_mcp::StudioMcpServer;
//!
//! let server = StudioMcpServer::new();
//! // Serve via stdio, or call the handlers directly
//! ```

pub mod error;
pub mod handlers;
pub mod params;
pub mod server;

pub use server::StudioMcpServer;

pub use params::*;
