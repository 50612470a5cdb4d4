//! Slash command handler trait
//!
//! Each handler processes one or more slash commands and declares the gates
//! dispatch must enforce before it runs.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Gate flags (owner_only, nsfw_only, guild_only)
//! - 1.0.0: Initial trait for modular command handling

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::prelude::Context;

use super::context::CommandContext;

/// Trait for slash command handlers.
///
/// Handlers are registered with a [`CommandRegistry`](super::CommandRegistry)
/// and dispatched by command name. Gate flags are enforced by the dispatcher,
/// so handler bodies can assume they passed.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Command name(s) this handler processes.
    fn command_names(&self) -> &'static [&'static str];

    /// Only bot owners may run these commands.
    fn owner_only(&self) -> bool {
        false
    }

    /// Only usable in age-restricted channels.
    fn nsfw_only(&self) -> bool {
        false
    }

    /// Only usable inside a guild.
    fn guild_only(&self) -> bool {
        false
    }

    /// Handle the slash command.
    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()>;
}
