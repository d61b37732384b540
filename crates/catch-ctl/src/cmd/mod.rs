//! CLI command modules.

pub mod http;
pub mod send;
pub mod status;
