use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Guild;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use shabot::commands::{register_global_commands, register_guild_commands, CommandContext};
use shabot::core::Config;
use shabot::database::Database;
use shabot::features::leveling::{add_user_exp, MESSAGE_GAIN};
use shabot::features::moderation::BanKind;
use shabot::features::ExpressClient;
use shabot::Dispatcher;

struct Handler {
    dispatcher: Arc<Dispatcher>,
    context: Arc<CommandContext>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(dispatcher: Dispatcher, context: Arc<CommandContext>, guild_id: Option<GuildId>) -> Self {
        Handler {
            dispatcher: Arc::new(dispatcher),
            context,
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        // Banned users earn nothing.
        match self
            .context
            .bans
            .is_banned(BanKind::User, msg.author.id.0)
            .await
        {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                error!("Ban check failed for {}: {e}", msg.author.id);
                return;
            }
        }

        if let Err(e) = add_user_exp(&self.context.database, msg.author.id.0, MESSAGE_GAIN).await {
            error!("Failed to grant message exp to {}: {e}", msg.author.id);
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
        info!("🌐 Gateway version: {}", ready.version);

        // The application owner always counts as a bot owner.
        match ctx.http.get_current_application_info().await {
            Ok(app_info) => {
                self.context.add_owner(app_info.owner.id).await;
                info!("👑 Application owner: {}", app_info.owner.tag());
            }
            Err(e) => warn!("Could not fetch application info: {e}"),
        }

        let registration = match self.guild_id {
            Some(guild_id) => register_guild_commands(&ctx, guild_id).await,
            None => register_global_commands(&ctx).await,
        };
        if let Err(e) = registration {
            error!("Failed to register slash commands: {e}");
        }

        match self.context.select_menus.restore().await {
            Ok(0) => {}
            Ok(count) => info!("📋 Restored {count} persisted select-menu sessions"),
            Err(e) => error!("Failed to restore select-menu sessions: {e}"),
        }
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: bool) {
        if is_new {
            info!("➕ Joined guild: {} ({})", guild.name, guild.id);
        }

        match self.context.bans.is_banned(BanKind::Guild, guild.id.0).await {
            Ok(true) => {
                warn!("Leaving banned guild: {} ({})", guild.name, guild.id);
                if let Err(e) = ctx.http.leave_guild(guild.id.0).await {
                    error!("Failed to leave banned guild {}: {e}", guild.id);
                }
            }
            Ok(false) => {}
            Err(e) => error!("Ban check failed for guild {}: {e}", guild.id),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self.dispatcher.handle_slash_command(&ctx, &command).await {
                    error!(
                        "Error handling slash command '{}': {}",
                        command.data.name, e
                    );

                    let error_message =
                        "❌ Sorry, I encountered an error processing your command. Please try again.";

                    // Try to edit the deferred response, fallback to new response if that fails
                    #[allow(clippy::redundant_pattern_matching)]
                    if let Err(_) = command
                        .edit_original_interaction_response(&ctx.http, |response| {
                            response.content(error_message)
                        })
                        .await
                    {
                        let _ = command.create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message.content(error_message).ephemeral(true)
                                })
                        }).await;
                    }
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .dispatcher
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component interaction '{}': {}",
                        component.data.custom_id, e
                    );

                    let _ = component
                        .create_interaction_response(&ctx.http, |response| {
                            response
                                .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                                .interaction_response_data(|message| {
                                    message
                                        .content("❌ Sorry, I encountered an error processing your interaction. Please try again.")
                                        .ephemeral(true)
                                })
                        })
                        .await;
                }
            }
            other => {
                debug!("Ignoring interaction: {:?}", other.kind());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Logger before config: from_env warns about malformed entries, and
    // warnings logged before init go to the no-op logger.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(Config::log_filter()),
    )
    .init();

    let config = Config::from_env()?;

    info!("Starting Shabot...");

    let database = Database::new(&config.database_path).await?;

    let express = ExpressClient::new(
        config.express_api_base.clone(),
        config.express_nsfw_api_base.clone(),
    );

    let context = Arc::new(CommandContext::new(
        database,
        express,
        &config.owner_ids,
    ));

    let guild_id = config.guild_id.map(GuildId);
    if let Some(guild_id) = guild_id {
        info!("Development mode: commands register against guild {guild_id}");
    }

    let dispatcher = Dispatcher::new(Arc::clone(&context), guild_id);
    let handler = Handler::new(dispatcher, context, guild_id);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
        | GatewayIntents::GUILD_MEMBERS;

    // Build the Discord client with proper gateway configuration
    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            error!("This could indicate:");
            error!("  - Invalid bot token format");
            error!("  - Network issues reaching Discord API");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        error!("This could be due to:");
        error!("  - Invalid bot token");
        error!("  - Network connectivity issues");
        error!("  - Discord API outage");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
