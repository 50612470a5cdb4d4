//! # Core Module
//!
//! Configuration and shared text/time utilities.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.0.0: Initial creation with config, response, text and duration modules

pub mod config;
pub mod duration;
pub mod response;
pub mod text;

// Re-export commonly used items
pub use config::Config;
pub use response::{chunk_text, code_block, truncate_for_embed, EMBED_LIMIT, MESSAGE_LIMIT};
pub use text::{ad_check, clean_mention_id, emphasize_perm, parse_snowflake, query_regex};
