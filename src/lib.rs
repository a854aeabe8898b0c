pub mod address;
pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod mcp;
pub mod models;
pub mod search;
pub mod state;
pub mod status;
