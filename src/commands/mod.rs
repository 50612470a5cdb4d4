//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial slash-only command system

pub mod context;
pub mod handler;
pub mod handlers;
pub mod registry;
pub mod slash;

// Re-export handler infrastructure
pub use context::CommandContext;
pub use handler::SlashCommandHandler;
pub use registry::CommandRegistry;

// Re-export commonly used items from submodules
pub use slash::{
    create_commands, get_role_option, get_string_option, get_user_option,
    register_global_commands, register_guild_commands,
};
