//! Relay that forwards a user query to the Gemini `generateContent` API and
//! returns the generated text.
//!
//! The HTTP relay accepts loosely-shaped request bodies, normalizes them into
//! a single query, and replies with `{"response": "..."}`. A stdio MCP bridge
//! exposes the same capability as an `ask_gemini` tool.

pub mod adapter;
pub mod ai;
pub mod error;
pub mod mcp;
pub mod models;
pub mod server;

pub use error::{Error, Result};
