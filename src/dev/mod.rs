//! Device drivers
pub mod mcp23017;
