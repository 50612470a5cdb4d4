//! Command handler registry
//!
//! Flat name -> handler map. Reload swaps in a freshly built registry rather
//! than mutating the live one.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: `with_default_handlers` for reload rebuilds
//! - 1.0.0: Initial implementation for handler dispatch

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::SlashCommandHandler;
use super::handlers::create_all_handlers;

/// Registry mapping command names to handlers.
///
/// Multiple command names can map to the same handler when they share logic
/// (the express commands do).
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        CommandRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Build a registry holding every shipped handler. This is the unit
    /// reload rebuilds.
    pub fn with_default_handlers() -> Self {
        let mut registry = Self::new();
        for handler in create_all_handlers() {
            registry.register(handler);
        }
        registry
    }

    /// Register a handler for all names it declares.
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    /// Get the handler for a command name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a command name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names (not unique handlers).
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// All registered command names.
    pub fn command_names(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandContext;
    use anyhow::Result;
    use async_trait::async_trait;
    use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
    use serenity::prelude::Context;

    struct MockHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl SlashCommandHandler for MockHandler {
        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register_single() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["role"] }));

        assert!(registry.contains("role"));
        assert!(!registry.contains("server"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_shared_handler_multiple_names() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler {
            names: &["neko", "hug", "pat"],
        }));

        assert_eq!(registry.len(), 3);
        for name in ["neko", "hug", "pat"] {
            assert!(registry.contains(name));
        }
    }

    #[test]
    fn test_registry_get() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["rank"] }));

        assert!(registry.get("rank").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_default_handlers_cover_shipped_commands() {
        let registry = CommandRegistry::with_default_handlers();
        for name in ["role", "server", "neko", "hug", "pat", "nsfw", "rank", "botban"] {
            assert!(registry.contains(name), "missing handler for {name}");
        }
        // reload is dispatched directly, never through the registry
        assert!(!registry.contains("reload"));
    }
}
