//! Info command handlers
//!
//! Handles: role, server
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: /server pages registered as a select-menu session
//! - 1.0.0: Initial implementation

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::guild::{Guild, Role};
use serenity::model::id::RoleId;
use serenity::model::permissions::Permissions;
use serenity::prelude::Context;
use uuid::Uuid;

use crate::commands::context::CommandContext;
use crate::commands::handler::SlashCommandHandler;
use crate::commands::slash::get_role_option;
use crate::core::duration::humanize_since_unix;
use crate::core::text::emphasize_perm;
use crate::select_menus::{EmbedField, MenuLifetime, MenuPage, MenuSession, StoredEmbed};

/// Permissions surfaced in the /role embed, with their display names.
const NOTABLE_PERMISSIONS: &[(Permissions, &str)] = &[
    (Permissions::ADMINISTRATOR, "Administrator"),
    (Permissions::MANAGE_GUILD, "Manage Guild"),
    (Permissions::MANAGE_ROLES, "Manage Roles"),
    (Permissions::MANAGE_CHANNELS, "Manage Channels"),
    (Permissions::MANAGE_MESSAGES, "Manage Messages"),
    (Permissions::MANAGE_WEBHOOKS, "Manage Webhooks"),
    (Permissions::MANAGE_NICKNAMES, "Manage Nicknames"),
    (Permissions::KICK_MEMBERS, "Kick Members"),
    (Permissions::BAN_MEMBERS, "Ban Members"),
    (Permissions::MODERATE_MEMBERS, "Moderate Members"),
    (Permissions::MENTION_EVERYONE, "Mention Everyone"),
    (Permissions::VIEW_AUDIT_LOG, "View Audit Log"),
    (Permissions::MUTE_MEMBERS, "Mute Members"),
    (Permissions::MOVE_MEMBERS, "Move Members"),
];

/// Shown when a role grants none of the notable permissions.
const NO_PERMISSIONS_PLACEHOLDER: &str = "THIS ROLE IS FOR ANTIQUE PURPOSE ONLY";

pub struct InfoHandler;

#[async_trait]
impl SlashCommandHandler for InfoHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["role", "server"]
    }

    fn guild_only(&self) -> bool {
        true
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let request_id = Uuid::new_v4();
        match command.data.name.as_str() {
            "role" => self.handle_role(serenity_ctx, command, request_id).await,
            "server" => {
                self.handle_server(&ctx, serenity_ctx, command, request_id)
                    .await
            }
            other => Err(anyhow::anyhow!("InfoHandler got unknown command: {other}")),
        }
    }
}

impl InfoHandler {
    async fn handle_role(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let role_id = get_role_option(&command.data.options, "role")
            .ok_or_else(|| anyhow::anyhow!("Missing role argument"))?;

        info!(
            "[{request_id}] /role command | Role: {role_id} | User: {}",
            command.user.id
        );

        let role = Self::resolve_role(serenity_ctx, command, RoleId(role_id));
        let Some(role) = role else {
            command
                .create_interaction_response(&serenity_ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| {
                            m.content("I can't see that role.").ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        let created_unix = role.id.created_at().unix_timestamp();
        let color = role.colour.0;
        let member_count = command
            .guild_id
            .and_then(|gid| serenity_ctx.cache.guild(gid))
            .map(|guild| {
                guild
                    .members
                    .values()
                    .filter(|m| m.roles.contains(&role.id))
                    .count()
            });

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| {
                        m.embed(|e| {
                            e.title(&role.name)
                                .description(format!("<@&{}>", role.id))
                                .color(color)
                                .field("ID", role.id.to_string(), true)
                                .field("Color", format!("#{}", role.colour.hex()), true)
                                .field("Position", role.position.to_string(), true)
                                .field("Hoisted", yes_no(role.hoist), true)
                                .field("Mentionable", yes_no(role.mentionable), true)
                                .field("Managed", yes_no(role.managed), true)
                                .field(
                                    "Members",
                                    member_count
                                        .map(|n| n.to_string())
                                        .unwrap_or_else(|| "?".to_string()),
                                    true,
                                )
                                .field(
                                    "Created",
                                    format!(
                                        "<t:{created_unix}:F> ({} ago)",
                                        humanize_since_unix(created_unix)
                                    ),
                                    false,
                                )
                                .field(
                                    "Permissions",
                                    describe_permissions(role.permissions),
                                    false,
                                )
                        })
                    })
            })
            .await?;

        info!("[{request_id}] /role response sent successfully");
        Ok(())
    }

    async fn handle_server(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        request_id: Uuid,
    ) -> Result<()> {
        let guild_id = command
            .guild_id
            .ok_or_else(|| anyhow::anyhow!("/server outside a guild"))?;

        info!(
            "[{request_id}] /server command | Guild: {guild_id} | User: {}",
            command.user.id
        );

        let Some(guild) = serenity_ctx.cache.guild(guild_id) else {
            command
                .create_interaction_response(&serenity_ctx.http, |r| {
                    r.kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|m| {
                            m.content("This server isn't cached yet, try again in a moment.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        let session = MenuSession {
            invoker: command.user.id.0,
            pages: build_server_pages(&guild),
        };

        let first_embed = session
            .pages
            .first()
            .and_then(|p| p.embed.clone())
            .unwrap_or_default();
        let components = session.components();

        command
            .create_interaction_response(&serenity_ctx.http, |r| {
                r.kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|m| {
                        m.set_embed(first_embed.build()).set_components(components)
                    })
            })
            .await?;

        // Register the response message so the component handler can find it.
        let message = command
            .get_interaction_response(&serenity_ctx.http)
            .await
            .map_err(|e| {
                error!("[{request_id}] Failed to fetch /server response message: {e}");
                anyhow::anyhow!("Failed to fetch interaction response: {e}")
            })?;
        ctx.select_menus
            .insert(message.id.0, session, MenuLifetime::default())
            .await?;

        info!("[{request_id}] /server session registered for message {}", message.id);
        Ok(())
    }

    /// Resolved role from the interaction payload, falling back to the cache.
    fn resolve_role(
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        role_id: RoleId,
    ) -> Option<Role> {
        if let Some(role) = command.data.resolved.roles.get(&role_id) {
            return Some(role.clone());
        }
        let guild = serenity_ctx.cache.guild(command.guild_id?)?;
        guild.roles.get(&role_id).cloned()
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Describe a role's permissions the way the info embed wants them:
/// Administrator collapses the whole list, no notable grants get the
/// placeholder line.
fn describe_permissions(permissions: Permissions) -> String {
    if permissions.contains(Permissions::ADMINISTRATOR) {
        return emphasize_perm("Administrator");
    }
    let granted: Vec<String> = NOTABLE_PERMISSIONS
        .iter()
        .skip(1)
        .filter(|(flag, _)| permissions.contains(*flag))
        .map(|(_, name)| emphasize_perm(name))
        .collect();
    if granted.is_empty() {
        NO_PERMISSIONS_PLACEHOLDER.to_string()
    } else {
        granted.join(", ")
    }
}

fn build_server_pages(guild: &Guild) -> Vec<MenuPage> {
    let created_unix = guild.id.created_at().unix_timestamp();

    let mut overview = StoredEmbed {
        title: Some(guild.name.clone()),
        color: Some(0x5865f2),
        thumbnail_url: guild.icon_url(),
        ..Default::default()
    };
    overview.fields = vec![
        EmbedField {
            name: "ID".to_string(),
            value: guild.id.to_string(),
            inline: true,
        },
        EmbedField {
            name: "Owner".to_string(),
            value: format!("<@{}>", guild.owner_id),
            inline: true,
        },
        EmbedField {
            name: "Created".to_string(),
            value: format!(
                "<t:{created_unix}:F> ({} ago)",
                humanize_since_unix(created_unix)
            ),
            inline: false,
        },
    ];

    let statistics = StoredEmbed {
        title: Some(format!("{} — Statistics", guild.name)),
        color: Some(0x5865f2),
        fields: vec![
            EmbedField {
                name: "Members".to_string(),
                value: guild.member_count.to_string(),
                inline: true,
            },
            EmbedField {
                name: "Channels".to_string(),
                value: guild.channels.len().to_string(),
                inline: true,
            },
            EmbedField {
                name: "Roles".to_string(),
                value: guild.roles.len().to_string(),
                inline: true,
            },
            EmbedField {
                name: "Emojis".to_string(),
                value: guild.emojis.len().to_string(),
                inline: true,
            },
            EmbedField {
                name: "Boosts".to_string(),
                value: guild.premium_subscription_count.to_string(),
                inline: true,
            },
        ],
        ..Default::default()
    };

    vec![
        MenuPage {
            label: "Overview".to_string(),
            value: "overview".to_string(),
            content: None,
            embed: Some(overview),
        },
        MenuPage {
            label: "Statistics".to_string(),
            value: "statistics".to_string(),
            content: None,
            embed: Some(statistics),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_handler_commands() {
        let handler = InfoHandler;
        let names = handler.command_names();
        assert!(names.contains(&"role"));
        assert!(names.contains(&"server"));
        assert_eq!(names.len(), 2);
        assert!(handler.guild_only());
    }

    #[test]
    fn test_describe_permissions_admin_collapses() {
        let perms = Permissions::ADMINISTRATOR | Permissions::MANAGE_MESSAGES;
        assert_eq!(describe_permissions(perms), "'ADMINISTRATOR'");
    }

    #[test]
    fn test_describe_permissions_lists_granted() {
        let perms = Permissions::MANAGE_MESSAGES | Permissions::KICK_MEMBERS;
        let described = describe_permissions(perms);
        assert!(described.contains("'MANAGE_MESSAGES'"));
        assert!(described.contains("'KICK_MEMBERS'"));
        assert!(!described.contains("'ADMINISTRATOR'"));
    }

    #[test]
    fn test_describe_permissions_placeholder() {
        assert_eq!(
            describe_permissions(Permissions::empty()),
            NO_PERMISSIONS_PLACEHOLDER
        );
    }
}
