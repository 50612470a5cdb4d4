//! Image command handlers
//!
//! Handles: neko, hug, pat, nsfw
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.1.0: /nsfw with category choice
//! - 1.0.0: Initial SFW reaction commands

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use rand::Rng;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_string_option;
use crate::features::express::NSFW_ENDPOINTS;

/// Handler for the SFW reaction commands. One endpoint each, plus a flavor
/// suffix on the caption.
pub struct ExpressHandler;

#[async_trait]
impl SlashCommandHandler for ExpressHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["neko", "hug", "pat"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let endpoint = command.data.name.as_str();
        let suffix = caption_suffix(endpoint);

        info!(
            "[{request_id}] /{endpoint} command | User: {}",
            command.user.id
        );

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;

        let url = match ctx.express.fetch_sfw(endpoint).await {
            Ok(url) => url,
            Err(e) => {
                error!("[{request_id}] Image fetch failed for {endpoint}: {e}");
                command
                    .edit_original_interaction_response(&serenity_ctx.http, |r| {
                        r.content("The image service isn't answering right now, try again later.")
                    })
                    .await?;
                return Ok(());
            }
        };

        let caption = ctx.finalize_str(
            serenity_ctx,
            &format!("<@{}>{suffix}", command.user.id),
            false,
        );

        command
            .edit_original_interaction_response(&serenity_ctx.http, |r| {
                r.content(caption).embed(|e| e.image(&url).color(0xffc0cb))
            })
            .await?;

        info!("[{request_id}] /{endpoint} response sent successfully");
        Ok(())
    }
}

fn caption_suffix(endpoint: &str) -> &'static str {
    match endpoint {
        "neko" => " nyaa~",
        "hug" => " 🤗",
        "pat" => " (pat pat)",
        _ => "",
    }
}

/// Handler for /nsfw. Gated to age-restricted channels by dispatch.
pub struct NsfwHandler;

#[async_trait]
impl SlashCommandHandler for NsfwHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["nsfw"]
    }

    fn nsfw_only(&self) -> bool {
        true
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        let category = match get_string_option(&command.data.options, "category") {
            Some(category) => category,
            None => random_category().to_string(),
        };

        info!(
            "[{request_id}] /nsfw command | Category: {category} | User: {}",
            command.user.id
        );

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::DeferredChannelMessageWithSource)
            })
            .await?;

        let url = match ctx.express.fetch_nsfw(&category).await {
            Ok(url) => url,
            Err(e) => {
                error!("[{request_id}] Image fetch failed for {category}: {e}");
                command
                    .edit_original_interaction_response(&serenity_ctx.http, |r| {
                        r.content("The image service isn't answering right now, try again later.")
                    })
                    .await?;
                return Ok(());
            }
        };

        command
            .edit_original_interaction_response(&serenity_ctx.http, |r| {
                r.embed(|e| e.title(&category).image(&url).color(0xe91e63))
            })
            .await?;

        info!("[{request_id}] /nsfw response sent successfully");
        Ok(())
    }
}

// Statement-local so the rng never lives across an await.
fn random_category() -> &'static str {
    NSFW_ENDPOINTS[rand::rng().random_range(0..NSFW_ENDPOINTS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_express_handler_commands() {
        let handler = ExpressHandler;
        assert_eq!(handler.command_names(), &["neko", "hug", "pat"]);
        assert!(!handler.nsfw_only());
    }

    #[test]
    fn test_nsfw_handler_gated() {
        let handler = NsfwHandler;
        assert_eq!(handler.command_names(), &["nsfw"]);
        assert!(handler.nsfw_only());
    }

    #[test]
    fn test_caption_suffixes() {
        assert_eq!(caption_suffix("neko"), " nyaa~");
        assert_eq!(caption_suffix("hug"), " 🤗");
        assert_eq!(caption_suffix("pat"), " (pat pat)");
        assert_eq!(caption_suffix("other"), "");
    }

    #[test]
    fn test_random_category_is_known() {
        for _ in 0..20 {
            assert!(NSFW_ENDPOINTS.contains(&random_category()));
        }
    }
}
