//! Core types & traits: transport-agnostic contracts for tools.

pub mod error;
pub mod tool;
