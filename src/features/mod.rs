//! # Features Module
//!
//! Domain subsystems: ban lists, exp/leveling, and the image API client.

pub mod express;
pub mod leveling;
pub mod moderation;

// Re-export feature items
pub use express::{ExpressClient, NSFW_ENDPOINTS, SFW_ENDPOINTS};
pub use leveling::{add_user_exp, level_for_exp, ExpGain, Round};
pub use moderation::{BanKind, BanReport, BanStore};
