//! Moderation command handler
//!
//! Handles: botban
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.5.0
//!
//! ## Changelog
//! - 1.0.0: Initial implementation

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::core::response::{chunk_text, code_block, MESSAGE_LIMIT};
use crate::core::text::{clean_mention_id, parse_snowflake};
use crate::features::moderation::{BanKind, BanReport};

pub struct ModerationHandler;

#[async_trait]
impl SlashCommandHandler for ModerationHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["botban"]
    }

    fn owner_only(&self) -> bool {
        true
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let kind = match get_string_option(&command.data.options, "kind").as_deref() {
            Some("guild") => BanKind::Guild,
            Some("user") => BanKind::User,
            other => return Err(anyhow::anyhow!("Bad botban kind: {other:?}")),
        };
        let action = get_string_option(&command.data.options, "action")
            .ok_or_else(|| anyhow::anyhow!("Missing action argument"))?;
        let targets = get_string_option(&command.data.options, "targets");

        info!(
            "[{request_id}] /botban command | Kind: {} | Action: {action} | User: {}",
            kind.label(),
            command.user.id
        );

        if action == "list" {
            return self.handle_list(&ctx, serenity_ctx, command, kind).await;
        }

        let Some(targets) = targets else {
            command
                .create_interaction_response(&serenity_ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| {
                            m.content("Give me at least one target to (un)ban.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        // Name resolution can hit REST, so defer before resolving.
        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;

        let (resolved, unknown) = self
            .resolve_targets(&ctx, serenity_ctx, kind, &targets)
            .await?;

        let banning = action == "ban";
        let report = if banning {
            ctx.bans.ban(kind, &resolved).await?
        } else {
            ctx.bans.unban(kind, &resolved).await?
        };

        if banning && kind == BanKind::Guild {
            self.leave_banned_guilds(serenity_ctx, &report, request_id)
                .await;
        }

        let title = format!(
            "{} {}",
            kind.label(),
            if banning { "bans" } else { "unbans" }
        );
        // Nothing-changed batches get a neutral embed.
        let color = if report.is_noop() {
            0x99aab5
        } else if banning {
            0xed4245
        } else {
            0x57f287
        };
        command
            .edit_original_interaction_response(&serenity_ctx.http, |r| {
                r.embed(|e| {
                    e.title(title).color(color);
                    e.field(
                        if banning { "Banned" } else { "Unbanned" },
                        format_ids(&report.changed),
                        false,
                    );
                    if !report.already.is_empty() {
                        e.field(
                            if banning {
                                "Already banned"
                            } else {
                                "Not banned"
                            },
                            format_ids(&report.already),
                            false,
                        );
                    }
                    let mut invalid = report.invalid.clone();
                    invalid.extend(unknown.iter().cloned());
                    if !invalid.is_empty() {
                        e.field("Not recognized", invalid.join(", "), false);
                    }
                    e
                })
            })
            .await?;

        info!("[{request_id}] /botban response sent successfully");
        Ok(())
    }
}

impl ModerationHandler {
    async fn handle_list(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        kind: BanKind,
    ) -> Result<()> {
        let list = ctx.bans.list(kind).await?;
        if list.is_empty() {
            command
                .create_interaction_response(&serenity_ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| {
                            m.content(format!("No banned {}s.", kind.label()))
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        }

        let body = list
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("\n");

        // Long lists go out as one fenced block per message; chunks leave
        // room for the fences.
        let mut chunks = chunk_text(&body, MESSAGE_LIMIT - 16).into_iter();
        if let Some(first) = chunks.next() {
            command
                .create_interaction_response(&serenity_ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| {
                            m.content(code_block("", &first)).ephemeral(true)
                        })
                })
                .await?;
        }
        for chunk in chunks {
            command
                .create_followup_message(&serenity_ctx.http, |m| {
                    m.content(code_block("", &chunk)).ephemeral(true)
                })
                .await?;
        }
        Ok(())
    }

    /// Turn raw targets into snowflake strings. Mentions and ids pass
    /// through; anything else is looked up by name in the caches. Returns
    /// the resolved ids and the tokens nothing matched.
    async fn resolve_targets(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        kind: BanKind,
        targets: &str,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let mut resolved = Vec::new();
        let mut unknown = Vec::new();

        for token in targets.split_whitespace() {
            let cleaned = clean_mention_id(token);
            if parse_snowflake(cleaned).is_some() {
                resolved.push(cleaned.to_string());
                continue;
            }
            let matches: Vec<u64> = match kind {
                BanKind::Guild => ctx
                    .find_guilds(serenity_ctx, cleaned, true)
                    .into_iter()
                    .map(|(id, _)| id.0)
                    .collect(),
                BanKind::User => ctx
                    .find_users(serenity_ctx, cleaned)
                    .await?
                    .into_iter()
                    .map(|u| u.id.0)
                    .collect(),
            };
            if matches.is_empty() {
                unknown.push(token.to_string());
            } else {
                resolved.extend(matches.iter().map(|id| id.to_string()));
            }
        }
        Ok((resolved, unknown))
    }

    /// Freshly banned guilds the bot is still in get left immediately.
    async fn leave_banned_guilds(
        &self,
        serenity_ctx: &Context,
        report: &BanReport,
        request_id: Uuid,
    ) {
        for id in &report.changed {
            if serenity_ctx.cache.guild(GuildId(*id)).is_none() {
                continue;
            }
            if let Err(e) = serenity_ctx.http.leave_guild(*id).await {
                warn!("[{request_id}] Failed to leave banned guild {id}: {e}");
            } else {
                info!("[{request_id}] Left banned guild {id}");
            }
        }
    }
}

fn format_ids(ids: &[u64]) -> String {
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_handler_commands() {
        let handler = ModerationHandler;
        assert_eq!(handler.command_names(), &["botban"]);
        assert!(handler.owner_only());
    }

    #[test]
    fn test_format_ids() {
        assert_eq!(format_ids(&[]), "(none)");
        assert_eq!(format_ids(&[1, 2]), "1, 2");
    }
}
