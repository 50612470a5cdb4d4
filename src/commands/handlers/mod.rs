//! Per-command handler implementations
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Add ModerationHandler (botban)
//! - 1.1.0: Add NsfwHandler and RankHandler
//! - 1.0.0: Initial handlers (role, server, express commands)

pub mod image;
pub mod info;
pub mod leveling;
pub mod moderation;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
/// `/reload` is not here on purpose: it has to swap the registry itself, so
/// the dispatcher handles it directly.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(info::InfoHandler),
        Arc::new(image::ExpressHandler),
        Arc::new(image::NsfwHandler),
        Arc::new(leveling::RankHandler),
        Arc::new(moderation::ModerationHandler),
    ]
}
