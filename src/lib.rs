// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure
pub mod database;

// UI components
pub mod select_menus;

// Application layer
pub mod commands;
pub mod dispatcher;

// Re-export core config
pub use core::Config;

// Re-export infrastructure
pub use database::Database;

// Re-export feature items
pub use features::{
    // Express image fetcher
    ExpressClient, NSFW_ENDPOINTS, SFW_ENDPOINTS,
    // Leveling
    add_user_exp, level_for_exp, ExpGain, Round,
    // Moderation
    BanKind, BanReport, BanStore,
};

// Re-export UI items
pub use select_menus::{MenuLifetime, MenuPage, MenuSession, SelectMenuHandler, SelectMenuStore};

// Re-export dispatch
pub use dispatcher::{Dispatcher, ReloadSummary};
