//! Shared context for command handlers
//!
//! The services every handler needs, plus the convenience lookups the bot
//! layers over the gateway caches: owner checks, guild/user search, and emote
//! substitution in outgoing text.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.2.0: Cache lookups (find_guilds, find_users) and emote substitution
//! - 1.1.0: Ban store and select-menu store
//! - 1.0.0: Initial implementation with database handle

use std::collections::HashMap;

use anyhow::Result;
use log::warn;
use serenity::model::id::{GuildId, UserId};
use serenity::model::user::User;
use serenity::prelude::Context;
use tokio::sync::RwLock;

use crate::core::text::{ad_check, parse_snowflake, query_regex};
use crate::database::Database;
use crate::features::express::ExpressClient;
use crate::features::moderation::BanStore;
use crate::select_menus::SelectMenuStore;

/// Shared context for all command handlers.
pub struct CommandContext {
    pub database: Database,
    pub bans: BanStore,
    pub select_menus: SelectMenuStore,
    pub express: ExpressClient,
    owners: RwLock<Vec<UserId>>,
}

impl CommandContext {
    pub fn new(database: Database, express: ExpressClient, owner_ids: &[u64]) -> Self {
        CommandContext {
            bans: BanStore::new(database.clone()),
            select_menus: SelectMenuStore::new(database.clone()),
            database,
            express,
            owners: RwLock::new(owner_ids.iter().copied().map(UserId).collect()),
        }
    }

    /// Add an owner at runtime (the application owner, fetched at ready).
    pub async fn add_owner(&self, id: UserId) {
        let mut owners = self.owners.write().await;
        if !owners.contains(&id) {
            owners.push(id);
        }
    }

    pub async fn is_owner(&self, id: UserId) -> bool {
        self.owners.read().await.contains(&id)
    }

    pub async fn owner_ids(&self) -> Vec<UserId> {
        self.owners.read().await.clone()
    }

    /// Find guilds by snowflake, exact name, or (with `force`) escaped
    /// case-insensitive regex over cached guild names.
    pub fn find_guilds(&self, ctx: &Context, query: &str, force: bool) -> Vec<(GuildId, String)> {
        if let Some(id) = parse_snowflake(query) {
            return ctx
                .cache
                .guild(GuildId(id))
                .map(|g| vec![(g.id, g.name)])
                .unwrap_or_default();
        }

        let matcher = if force {
            match query_regex(query, "i") {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Bad guild query {query:?}: {e}");
                    return Vec::new();
                }
            }
        } else {
            None
        };

        let mut found = Vec::new();
        for guild_id in ctx.cache.guilds() {
            let Some(guild) = ctx.cache.guild(guild_id) else {
                continue;
            };
            let hit = match &matcher {
                Some(re) => re.is_match(&guild.name),
                None => guild.name == query,
            };
            if hit {
                found.push((guild.id, guild.name));
            }
        }
        found
    }

    /// Find users by snowflake (cache, then REST fallback) or by
    /// case-insensitive name/tag match over cached members.
    pub async fn find_users(&self, ctx: &Context, query: &str) -> Result<Vec<User>> {
        if let Some(id) = parse_snowflake(query) {
            if let Some(user) = ctx.cache.user(UserId(id)) {
                return Ok(vec![user]);
            }
            return match ctx.http.get_user(id).await {
                Ok(user) => Ok(vec![user]),
                Err(_) => Ok(Vec::new()),
            };
        }

        let re = match query_regex(query, "i") {
            Ok(re) => re,
            Err(e) => {
                warn!("Bad user query {query:?}: {e}");
                return Ok(Vec::new());
            }
        };

        let mut found: Vec<User> = Vec::new();
        for guild_id in ctx.cache.guilds() {
            let Some(guild) = ctx.cache.guild(guild_id) else {
                continue;
            };
            for member in guild.members.values() {
                let user = &member.user;
                if found.iter().any(|u| u.id == user.id) {
                    continue;
                }
                if re.is_match(&user.name) || re.is_match(&user.tag()) {
                    found.push(user.clone());
                }
            }
        }
        Ok(found)
    }

    /// Replace `:name:` tokens with matching cached guild emoji mentions.
    pub fn emote_message(&self, ctx: &Context, content: &str) -> String {
        let mut emojis: HashMap<String, EmoteRef> = HashMap::new();
        for guild_id in ctx.cache.guilds() {
            let Some(guild) = ctx.cache.guild(guild_id) else {
                continue;
            };
            for emoji in guild.emojis.values() {
                emojis
                    .entry(emoji.name.to_lowercase())
                    .or_insert_with(|| EmoteRef {
                        name: emoji.name.clone(),
                        id: emoji.id.0,
                        animated: emoji.animated,
                    });
            }
        }
        substitute_emotes(content, &emojis)
    }

    /// Emote substitution plus invite scrubbing for outgoing text.
    pub fn finalize_str(&self, ctx: &Context, content: &str, no_ad_check: bool) -> String {
        let emoted = self.emote_message(ctx, content);
        if no_ad_check {
            emoted
        } else {
            ad_check(&emoted)
        }
    }
}

/// A cached guild emoji, indexed by lowercased name.
struct EmoteRef {
    name: String,
    id: u64,
    animated: bool,
}

/// Replace `:name:` tokens that are not already emoji mentions. The mention
/// gets the emoji's own name, whatever the token's casing was.
fn substitute_emotes(content: &str, emojis: &HashMap<String, EmoteRef>) -> String {
    if emojis.is_empty() || !content.contains(':') {
        return content.to_string();
    }
    let re = match regex::Regex::new(r":(\w{1,32}):") {
        Ok(re) => re,
        Err(_) => return content.to_string(),
    };

    let mut out = String::with_capacity(content.len());
    let mut last = 0;
    for caps in re.captures_iter(content) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        // Already an emoji mention (`<:name:id>` / `<a:name:id>`)? Leave it.
        if followed_by_emoji_id(&content[whole.end()..]) {
            continue;
        }
        let Some(emote) = emojis.get(&name.as_str().to_lowercase()) else {
            continue;
        };
        out.push_str(&content[last..whole.start()]);
        let prefix = if emote.animated { "a" } else { "" };
        out.push_str(&format!("<{prefix}:{}:{}>", emote.name, emote.id));
        last = whole.end();
    }
    out.push_str(&content[last..]);
    out
}

fn followed_by_emoji_id(rest: &str) -> bool {
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    (18..=20).contains(&digits) && rest.as_bytes().get(digits) == Some(&b'>')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emoji_index() -> HashMap<String, EmoteRef> {
        let mut map = HashMap::new();
        map.insert(
            "blob".to_string(),
            EmoteRef {
                name: "Blob".to_string(),
                id: 111111111111111111,
                animated: false,
            },
        );
        map.insert(
            "party".to_string(),
            EmoteRef {
                name: "party".to_string(),
                id: 222222222222222222,
                animated: true,
            },
        );
        map
    }

    #[test]
    fn test_substitute_known_emote() {
        let out = substitute_emotes("hi :blob: !", &emoji_index());
        assert_eq!(out, "hi <:Blob:111111111111111111> !");
    }

    #[test]
    fn test_substitute_animated_emote() {
        let out = substitute_emotes(":party:", &emoji_index());
        assert_eq!(out, "<a:party:222222222222222222>");
    }

    // Lookup is case-insensitive but the mention must carry the emoji's own
    // name, never the token's casing.
    #[test]
    fn test_substitute_uses_emoji_name_not_token_casing() {
        let out = substitute_emotes(":BLOB:", &emoji_index());
        assert_eq!(out, "<:Blob:111111111111111111>");

        let out = substitute_emotes(":PaRtY:", &emoji_index());
        assert_eq!(out, "<a:party:222222222222222222>");
    }

    #[test]
    fn test_unknown_emote_left_alone() {
        let text = "so :mystery: much";
        assert_eq!(substitute_emotes(text, &emoji_index()), text);
    }

    #[test]
    fn test_existing_mention_left_alone() {
        let text = "already <:blob:111111111111111111> emoted";
        assert_eq!(substitute_emotes(text, &emoji_index()), text);
    }

    #[test]
    fn test_no_colons_fast_path() {
        let text = "plain text";
        assert_eq!(substitute_emotes(text, &emoji_index()), text);
    }

    #[tokio::test]
    async fn test_owner_tracking() {
        let ctx = CommandContext::new(
            Database::in_memory().unwrap(),
            ExpressClient::default(),
            &[1, 2],
        );
        assert!(ctx.is_owner(UserId(1)).await);
        assert!(!ctx.is_owner(UserId(3)).await);
        ctx.add_owner(UserId(3)).await;
        assert!(ctx.is_owner(UserId(3)).await);
        // adding twice does not duplicate
        ctx.add_owner(UserId(3)).await;
        assert_eq!(ctx.owner_ids().await.len(), 3);
    }
}
