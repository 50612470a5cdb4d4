//! Environment-driven bot configuration
//!
//! Everything is read once at startup; `.env` files are loaded by the binary
//! before this runs.

use anyhow::{Context as _, Result};
use log::warn;

use crate::features::express::{DEFAULT_NSFW_BASE, DEFAULT_SFW_BASE};

/// Runtime configuration for the bot process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token (`DISCORD_TOKEN`, required).
    pub discord_token: String,
    /// User ids allowed to run owner commands (`OWNER_IDS`, comma-separated).
    /// The application owner is merged in at ready-time regardless.
    pub owner_ids: Vec<u64>,
    /// SQLite file backing the document store (`DATABASE_PATH`).
    pub database_path: String,
    /// When set, slash commands register against this guild only
    /// (`DISCORD_GUILD_ID`, development mode - updates are instant).
    pub guild_id: Option<u64>,
    /// Base URL for the SFW image API (`EXPRESS_API_BASE`).
    pub express_api_base: String,
    /// Base URL for the NSFW image API (`EXPRESS_NSFW_API_BASE`).
    pub express_nsfw_api_base: String,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// A missing `DISCORD_TOKEN` is the only fatal condition; everything else
    /// falls back to a default.
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .context("DISCORD_TOKEN not set - the bot cannot log in without it")?;

        let owner_ids = std::env::var("OWNER_IDS")
            .map(|raw| Self::parse_owner_ids(&raw))
            .unwrap_or_default();

        let guild_id = match std::env::var("DISCORD_GUILD_ID") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("DISCORD_GUILD_ID is not a valid id, registering commands globally");
                    None
                }
            },
            Err(_) => None,
        };

        Ok(Config {
            discord_token,
            owner_ids,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "shabot.db".to_string()),
            guild_id,
            express_api_base: std::env::var("EXPRESS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SFW_BASE.to_string()),
            express_nsfw_api_base: std::env::var("EXPRESS_NSFW_API_BASE")
                .unwrap_or_else(|_| DEFAULT_NSFW_BASE.to_string()),
        })
    }

    /// `env_logger` filter (`LOG_LEVEL`). Read separately from `from_env`
    /// because the logger must be installed before `from_env` runs, or its
    /// parse warnings go to the no-op logger and vanish.
    pub fn log_filter() -> String {
        Self::filter_or_default(std::env::var("LOG_LEVEL").ok())
    }

    fn filter_or_default(raw: Option<String>) -> String {
        raw.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "info".to_string())
    }

    /// Parse a comma-separated id list, skipping (and warning about) garbage
    /// entries instead of failing startup.
    fn parse_owner_ids(raw: &str) -> Vec<u64> {
        let mut ids = Vec::new();
        for part in raw.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match part.parse::<u64>() {
                Ok(id) if !ids.contains(&id) => ids.push(id),
                Ok(_) => {}
                Err(_) => warn!("Skipping malformed owner id in OWNER_IDS: {part:?}"),
            }
        }
        ids
    }
}
