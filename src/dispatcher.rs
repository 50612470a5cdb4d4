//! Interaction dispatch
//!
//! Routes slash commands through the registry with per-handler gates, and
//! component interactions to the select-menu handler. `/reload` is handled
//! here directly because it swaps the registry out from under dispatch.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Reload rebuilds the registry and re-registers slash commands
//! - 1.1.0: Silent drop of banned invokers and banned guilds
//! - 1.0.0: Initial registry-based dispatch

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Channel;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandRegistry,
};
use crate::core::response::code_block;
use crate::features::moderation::BanKind;
use crate::select_menus::SelectMenuHandler;

/// Reply sent when a reload goes through cleanly.
const RELOAD_OK_REPLY: &str = "Okkiie thank chu ❤️❤️";

/// What a reload touched, for the log line.
#[derive(Debug)]
pub struct ReloadSummary {
    pub commands: usize,
    pub sessions: usize,
}

pub struct Dispatcher {
    context: Arc<CommandContext>,
    registry: RwLock<CommandRegistry>,
    menu_handler: SelectMenuHandler,
    guild_id: Option<GuildId>,
}

impl Dispatcher {
    /// Build a dispatcher with the default handler set. `guild_id` scopes
    /// command registration (and re-registration on reload) to one guild.
    pub fn new(context: Arc<CommandContext>, guild_id: Option<GuildId>) -> Self {
        let menu_handler = SelectMenuHandler::new(context.select_menus.clone());
        Dispatcher {
            context,
            registry: RwLock::new(CommandRegistry::with_default_handlers()),
            menu_handler,
            guild_id,
        }
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let name = command.data.name.as_str();

        // Banned invokers and banned guilds get silence, not an explanation.
        if self
            .context
            .bans
            .is_banned(BanKind::User, command.user.id.0)
            .await?
        {
            debug!("[{request_id}] Dropping /{name} from banned user {}", command.user.id);
            return Ok(());
        }
        if let Some(guild_id) = command.guild_id {
            if self
                .context
                .bans
                .is_banned(BanKind::Guild, guild_id.0)
                .await?
            {
                debug!("[{request_id}] Dropping /{name} from banned guild {guild_id}");
                return Ok(());
            }
        }

        info!(
            "[{request_id}] Dispatching /{name} | User: {} | Guild: {:?}",
            command.user.id, command.guild_id
        );

        if name == "reload" {
            return self.handle_reload(ctx, command, request_id).await;
        }

        let handler = {
            let registry = self.registry.read().await;
            registry.get(name)
        };
        let Some(handler) = handler else {
            warn!("[{request_id}] No handler registered for /{name}");
            return self
                .ephemeral_reply(ctx, command, "I don't know that command.")
                .await;
        };

        if handler.owner_only() && !self.context.is_owner(command.user.id).await {
            return self
                .ephemeral_reply(ctx, command, "This command is reserved for the bot owner.")
                .await;
        }
        if handler.guild_only() && command.guild_id.is_none() {
            return self
                .ephemeral_reply(ctx, command, "This command only works in a server.")
                .await;
        }
        if handler.nsfw_only() && !is_nsfw_channel(ctx, command).await {
            return self
                .ephemeral_reply(
                    ctx,
                    command,
                    "This command only works in age-restricted channels.",
                )
                .await;
        }

        handler.handle(Arc::clone(&self.context), ctx, command).await
    }

    /// `/reload`: rebuild the registry, push the fresh command set to
    /// Discord, restore persisted sessions and drop the ban caches. A reload
    /// that fails leaves dispatch in an unknown state, so the process exits
    /// and lets the supervisor bring up a clean one.
    async fn handle_reload(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        if !self.context.is_owner(command.user.id).await {
            return self
                .ephemeral_reply(ctx, command, "This command is reserved for the bot owner.")
                .await;
        }

        command
            .create_interaction_response(&ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;

        match self.reload(ctx).await {
            Ok(summary) => {
                info!(
                    "[{request_id}] Reload complete: {} commands, {} sessions restored",
                    summary.commands, summary.sessions
                );
                command
                    .edit_original_interaction_response(&ctx.http, |r| r.content(RELOAD_OK_REPLY))
                    .await?;
                Ok(())
            }
            Err(e) => {
                error!("[{request_id}] Reload failed: {e}");
                command
                    .edit_original_interaction_response(&ctx.http, |r| {
                        r.content(code_block("", &format!("Reload failed: {e}")))
                    })
                    .await?;
                std::process::exit(1);
            }
        }
    }

    /// Rebuild and swap the command registry, re-register the slash
    /// commands, restore persisted sessions and drop the ban caches.
    pub async fn reload(&self, ctx: &Context) -> Result<ReloadSummary> {
        let fresh = CommandRegistry::with_default_handlers();
        let commands = fresh.len();

        match self.guild_id {
            Some(guild_id) => register_guild_commands(ctx, guild_id).await?,
            None => register_global_commands(ctx).await?,
        }

        *self.registry.write().await = fresh;

        let sessions = self.context.select_menus.restore().await?;
        self.context.bans.invalidate().await;

        Ok(ReloadSummary { commands, sessions })
    }

    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        // Banned invokers get the same silence on components.
        if self
            .context
            .bans
            .is_banned(BanKind::User, interaction.user.id.0)
            .await?
        {
            return Ok(());
        }
        self.menu_handler
            .handle_component_interaction(ctx, interaction)
            .await
    }

    async fn ephemeral_reply(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
        content: &str,
    ) -> Result<()> {
        command
            .create_interaction_response(&ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| m.content(content).ephemeral(true))
            })
            .await?;
        Ok(())
    }
}

/// DMs count as age-restricted; guild channels go by their flag.
async fn is_nsfw_channel(ctx: &Context, command: &ApplicationCommandInteraction) -> bool {
    match command.channel_id.to_channel(ctx).await {
        Ok(Channel::Guild(channel)) => channel.is_nsfw(),
        Ok(Channel::Private(_)) => true,
        _ => false,
    }
}
