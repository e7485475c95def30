//! MCP server exposing a single mock `send_whatsapp_message` tool.

pub mod cli;
pub mod clients;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
