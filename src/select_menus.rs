//! Select-menu session registry and component interaction handling
//!
//! A session is registered per message carrying a page-select menu. Sessions
//! normally expire after a timeout; persistent sessions are written to the
//! document store and restored on startup and on reload.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Persistent sessions survive restarts via the document store
//! - 1.0.0: Initial in-memory session registry

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dashmap::DashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serenity::builder::{CreateComponents, CreateEmbed};
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::core::response::truncate_for_embed;
use crate::database::Database;

/// Document-store collection for persistent sessions.
pub const SESSION_COLLECTION: &str = "select_menus";

/// Custom id shared by all page-select menus.
pub const MENU_CUSTOM_ID: &str = "pages";

/// Sessions without an explicit lifetime expire after 15 minutes.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(15 * 60);

/// Embed data in a storable form.
///
/// `CreateEmbed` keys its builder map with static strings, so it cannot round
/// trip through serde; pages store the fields they need and rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub thumbnail_url: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl StoredEmbed {
    pub fn build(&self) -> CreateEmbed {
        let mut embed = CreateEmbed::default();
        if let Some(title) = &self.title {
            embed.title(title);
        }
        if let Some(description) = &self.description {
            embed.description(truncate_for_embed(description));
        }
        if let Some(color) = self.color {
            embed.color(color);
        }
        if let Some(url) = &self.thumbnail_url {
            embed.thumbnail(url);
        }
        if let Some(url) = &self.image_url {
            embed.image(url);
        }
        for field in &self.fields {
            embed.field(&field.name, &field.value, field.inline);
        }
        embed
    }
}

/// One selectable page of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuPage {
    /// Option label shown in the menu.
    pub label: String,
    /// Option value; what the interaction reports back.
    pub value: String,
    pub content: Option<String>,
    pub embed: Option<StoredEmbed>,
}

/// A registered select-menu message: who invoked it and its pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSession {
    pub invoker: u64,
    pub pages: Vec<MenuPage>,
}

impl MenuSession {
    pub fn page(&self, value: &str) -> Option<&MenuPage> {
        self.pages.iter().find(|p| p.value == value)
    }

    /// Build the select-menu component row for this session.
    pub fn components(&self) -> CreateComponents {
        CreateComponents::default()
            .create_action_row(|row| {
                row.create_select_menu(|menu| {
                    menu.custom_id(MENU_CUSTOM_ID)
                        .placeholder("Select a page")
                        .options(|options| {
                            for page in &self.pages {
                                options.create_option(|o| o.label(&page.label).value(&page.value));
                            }
                            options
                        })
                })
            })
            .to_owned()
    }
}

/// How long a session stays alive.
#[derive(Debug, Clone, Copy)]
pub enum MenuLifetime {
    /// Dropped from memory after the duration.
    Timeout(Duration),
    /// Written to the document store; survives restarts until removed.
    Persistent,
}

impl Default for MenuLifetime {
    fn default() -> Self {
        MenuLifetime::Timeout(DEFAULT_SESSION_LIFETIME)
    }
}

/// Registry of active select-menu messages, keyed by message id.
#[derive(Clone)]
pub struct SelectMenuStore {
    sessions: Arc<DashMap<u64, MenuSession>>,
    database: Database,
}

impl SelectMenuStore {
    pub fn new(database: Database) -> Self {
        SelectMenuStore {
            sessions: Arc::new(DashMap::new()),
            database,
        }
    }

    /// Register a session for a message.
    pub async fn insert(
        &self,
        message_id: u64,
        session: MenuSession,
        lifetime: MenuLifetime,
    ) -> Result<()> {
        match lifetime {
            MenuLifetime::Timeout(duration) => {
                self.sessions.insert(message_id, session);
                let sessions = Arc::clone(&self.sessions);
                tokio::spawn(async move {
                    tokio::time::sleep(duration).await;
                    if sessions.remove(&message_id).is_some() {
                        debug!("Select menu session {message_id} expired");
                    }
                });
            }
            MenuLifetime::Persistent => {
                self.database
                    .set(SESSION_COLLECTION, &message_id.to_string(), &session)
                    .await?;
                self.sessions.insert(message_id, session);
            }
        }
        Ok(())
    }

    pub fn get(&self, message_id: u64) -> Option<MenuSession> {
        self.sessions.get(&message_id).map(|s| s.clone())
    }

    /// Remove a session from memory and from the store.
    pub async fn remove(&self, message_id: u64) -> Result<()> {
        self.sessions.remove(&message_id);
        self.database
            .delete(SESSION_COLLECTION, &message_id.to_string())
            .await
    }

    /// Load persisted sessions back into memory. Returns how many there were.
    pub async fn restore(&self) -> Result<usize> {
        let stored: Vec<(String, MenuSession)> = self.database.get_all(SESSION_COLLECTION).await?;
        let mut count = 0;
        for (key, session) in stored {
            match key.parse::<u64>() {
                Ok(message_id) => {
                    self.sessions.insert(message_id, session);
                    count += 1;
                }
                Err(_) => debug!("Skipping persisted session with bad key {key:?}"),
            }
        }
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Handler for select-menu component interactions.
pub struct SelectMenuHandler {
    store: SelectMenuStore,
}

impl SelectMenuHandler {
    pub fn new(store: SelectMenuStore) -> Self {
        SelectMenuHandler { store }
    }

    /// Route a component interaction against the session registry.
    ///
    /// Unknown or expired sessions get an ephemeral notice. The invoker's
    /// selection updates the menu message in place; anyone else gets the
    /// selected page as an ephemeral copy.
    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        if interaction.data.custom_id != MENU_CUSTOM_ID {
            return self
                .ephemeral_notice(ctx, interaction, "Unknown component interaction.")
                .await;
        }

        let message_id = interaction.message.id.0;
        let Some(session) = self.store.get(message_id) else {
            return self
                .ephemeral_notice(ctx, interaction, "This session's expired")
                .await;
        };

        let Some(selected) = interaction.data.values.first() else {
            debug!("Select menu interaction on {message_id} carried no value");
            return Ok(());
        };
        let Some(page) = session.page(selected) else {
            return self
                .ephemeral_notice(ctx, interaction, "That page no longer exists.")
                .await;
        };

        info!(
            "Select menu {message_id}: {} picked page {selected:?}",
            interaction.user.id
        );

        if interaction.user.id.0 != session.invoker {
            // Someone else's menu: hand them a private copy of the page.
            interaction
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            if let Some(content) = &page.content {
                                message.content(content);
                            }
                            if let Some(embed) = &page.embed {
                                message.set_embed(embed.build());
                            }
                            message.ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        }

        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::UpdateMessage)
                    .interaction_response_data(|message| {
                        if let Some(content) = &page.content {
                            message.content(content);
                        }
                        if let Some(embed) = &page.embed {
                            message.set_embed(embed.build());
                        }
                        message
                    })
            })
            .await?;
        Ok(())
    }

    async fn ephemeral_notice(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
        text: &str,
    ) -> Result<()> {
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(text).ephemeral(true))
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(invoker: u64) -> MenuSession {
        MenuSession {
            invoker,
            pages: vec![
                MenuPage {
                    label: "About".to_string(),
                    value: "about".to_string(),
                    content: Some("about page".to_string()),
                    embed: None,
                },
                MenuPage {
                    label: "Stats".to_string(),
                    value: "stats".to_string(),
                    content: None,
                    embed: Some(StoredEmbed {
                        title: Some("Stats".to_string()),
                        ..Default::default()
                    }),
                },
            ],
        }
    }

    fn store() -> SelectMenuStore {
        SelectMenuStore::new(Database::in_memory().unwrap())
    }

    #[test]
    fn test_session_page_lookup() {
        let s = session(1);
        assert_eq!(s.page("about").map(|p| p.label.as_str()), Some("About"));
        assert!(s.page("missing").is_none());
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store();
        store
            .insert(10, session(1), MenuLifetime::default())
            .await
            .unwrap();
        assert_eq!(store.get(10).map(|s| s.invoker), Some(1));
        assert!(store.get(11).is_none());
    }

    #[tokio::test]
    async fn test_timeout_expiry() {
        let store = store();
        store
            .insert(10, session(1), MenuLifetime::Timeout(Duration::from_millis(20)))
            .await
            .unwrap();
        assert!(store.get(10).is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(store.get(10).is_none());
    }

    #[tokio::test]
    async fn test_persistent_sessions_restore() {
        let db = Database::in_memory().unwrap();
        {
            let store = SelectMenuStore::new(db.clone());
            store
                .insert(42, session(7), MenuLifetime::Persistent)
                .await
                .unwrap();
        }
        let fresh = SelectMenuStore::new(db);
        assert!(fresh.is_empty());
        let restored = fresh.restore().await.unwrap();
        assert_eq!(restored, 1);
        assert_eq!(fresh.get(42).map(|s| s.invoker), Some(7));
    }

    #[tokio::test]
    async fn test_remove_deletes_persisted_copy() {
        let db = Database::in_memory().unwrap();
        let store = SelectMenuStore::new(db.clone());
        store
            .insert(42, session(7), MenuLifetime::Persistent)
            .await
            .unwrap();
        store.remove(42).await.unwrap();
        assert!(store.get(42).is_none());

        let fresh = SelectMenuStore::new(db);
        assert_eq!(fresh.restore().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_timeout_sessions_are_not_persisted() {
        let db = Database::in_memory().unwrap();
        let store = SelectMenuStore::new(db.clone());
        store
            .insert(5, session(1), MenuLifetime::default())
            .await
            .unwrap();
        let fresh = SelectMenuStore::new(db);
        assert_eq!(fresh.restore().await.unwrap(), 0);
    }

    #[test]
    fn test_stored_embed_builds() {
        let embed = StoredEmbed {
            title: Some("T".to_string()),
            description: Some("D".to_string()),
            color: Some(0x00FF00),
            thumbnail_url: Some("https://example.com/t.png".to_string()),
            image_url: None,
            fields: vec![EmbedField {
                name: "a".to_string(),
                value: "b".to_string(),
                inline: true,
            }],
        };
        // CreateEmbed is opaque; building without panic is the contract
        let _ = embed.build();
    }

    #[test]
    fn test_session_components_build() {
        let _ = session(1).components();
    }
}
