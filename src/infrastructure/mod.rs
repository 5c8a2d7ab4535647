//! Infrastructure layer
//!
//! Transport-level adapters behind the domain traits in `crate::mcp`.

pub mod mcp;
