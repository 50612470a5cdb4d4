//! Leveling command handler
//!
//! Handles: rank
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.4.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::UserId;
use serenity::model::user::User;
use serenity::prelude::Context;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_user_option;
use crate::features::leveling::{exp_for_level, level_for_exp, user_exp};

pub struct RankHandler;

#[async_trait]
impl SlashCommandHandler for RankHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["rank"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let target = match get_user_option(&command.data.options, "user") {
            Some(id) => resolve_user(serenity_ctx, command, UserId(id)).await,
            None => command.user.clone(),
        };

        info!(
            "[{request_id}] /rank command | Target: {} | User: {}",
            target.id, command.user.id
        );

        let exp = user_exp(&ctx.database, target.id.0).await?;
        let level = level_for_exp(exp);
        let current_floor = exp_for_level(level);
        let next_floor = exp_for_level(level + 1);

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| {
                        m.embed(|e| {
                            e.title(format!("{}'s rank", target.name))
                                .color(0x57f287)
                                .field("Level", level.to_string(), true)
                                .field("Experience", format!("{exp:.1}"), true)
                                .field(
                                    "Next level",
                                    format!(
                                        "{:.1} / {:.1}",
                                        exp - current_floor,
                                        next_floor - current_floor
                                    ),
                                    true,
                                )
                                .thumbnail(target.face())
                        })
                    })
            })
            .await?;

        info!("[{request_id}] /rank response sent successfully");
        Ok(())
    }
}

/// Resolved target: interaction payload, then cache, then REST, falling back
/// to the invoker.
async fn resolve_user(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    user_id: UserId,
) -> User {
    if let Some(user) = command.data.resolved.users.get(&user_id) {
        return user.clone();
    }
    if let Some(user) = serenity_ctx.cache.user(user_id) {
        return user;
    }
    match serenity_ctx.http.get_user(user_id.0).await {
        Ok(user) => user,
        Err(_) => command.user.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_handler_commands() {
        let handler = RankHandler;
        assert_eq!(handler.command_names(), &["rank"]);
        assert!(!handler.owner_only());
        assert!(!handler.guild_only());
    }
}
