//! Bot-level guild and user ban lists
//!
//! Small in-memory vectors, lazily loaded from the document store and written
//! back on every change. Dispatch consults these before any handler runs;
//! `guild_create` consults them to leave banned guilds.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

use anyhow::Result;
use tokio::sync::RwLock;

use crate::core::text::parse_snowflake;
use crate::database::Database;

/// Document-store collection holding both ban lists.
pub const BAN_COLLECTION: &str = "moderation";

/// Which ban list an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanKind {
    Guild,
    User,
}

impl BanKind {
    /// Document key inside [`BAN_COLLECTION`].
    fn key(self) -> &'static str {
        match self {
            BanKind::Guild => "banned_guilds",
            BanKind::User => "banned_users",
        }
    }

    /// Human label for report embeds.
    pub fn label(self) -> &'static str {
        match self {
            BanKind::Guild => "guild",
            BanKind::User => "user",
        }
    }
}

/// Outcome of a batch ban/unban.
///
/// `changed` holds the ids actually (un)banned, `already` the ids that were
/// in (or missing from) the list to begin with, `invalid` the raw inputs that
/// never parsed as a snowflake. Duplicates within a batch are reported once.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BanReport {
    pub changed: Vec<u64>,
    pub already: Vec<u64>,
    pub invalid: Vec<String>,
}

impl BanReport {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Lazily-loaded ban lists backed by the document store.
pub struct BanStore {
    database: Database,
    guilds: RwLock<Option<Vec<u64>>>,
    users: RwLock<Option<Vec<u64>>>,
}

impl BanStore {
    pub fn new(database: Database) -> Self {
        BanStore {
            database,
            guilds: RwLock::new(None),
            users: RwLock::new(None),
        }
    }

    fn slot(&self, kind: BanKind) -> &RwLock<Option<Vec<u64>>> {
        match kind {
            BanKind::Guild => &self.guilds,
            BanKind::User => &self.users,
        }
    }

    /// Drop the cached lists so the next access re-reads the store.
    /// Called on reload.
    pub async fn invalidate(&self) {
        *self.guilds.write().await = None;
        *self.users.write().await = None;
    }

    /// Current list contents (loading from the store on first access).
    pub async fn list(&self, kind: BanKind) -> Result<Vec<u64>> {
        {
            let slot = self.slot(kind).read().await;
            if let Some(list) = slot.as_ref() {
                return Ok(list.clone());
            }
        }
        let mut slot = self.slot(kind).write().await;
        if slot.is_none() {
            let stored: Vec<u64> = self
                .database
                .get_one(BAN_COLLECTION, kind.key())
                .await?
                .unwrap_or_default();
            *slot = Some(stored);
        }
        Ok(slot.clone().unwrap_or_default())
    }

    pub async fn is_banned(&self, kind: BanKind, id: u64) -> Result<bool> {
        Ok(self.list(kind).await?.contains(&id))
    }

    /// Ban a batch of raw targets (ids or mentions).
    pub async fn ban<I>(&self, kind: BanKind, targets: I) -> Result<BanReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.apply(kind, targets, true).await
    }

    /// Unban a batch of raw targets (ids or mentions).
    pub async fn unban<I>(&self, kind: BanKind, targets: I) -> Result<BanReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.apply(kind, targets, false).await
    }

    async fn apply<I>(&self, kind: BanKind, targets: I, banning: bool) -> Result<BanReport>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut slot = self.slot(kind).write().await;
        if slot.is_none() {
            let stored: Vec<u64> = self
                .database
                .get_one(BAN_COLLECTION, kind.key())
                .await?
                .unwrap_or_default();
            *slot = Some(stored);
        }
        let list = slot.get_or_insert_with(Vec::new);

        let mut report = BanReport::default();
        for target in targets {
            let raw = target.as_ref();
            let Some(id) = parse_snowflake(raw) else {
                if !report.invalid.iter().any(|r| r == raw) {
                    report.invalid.push(raw.to_string());
                }
                continue;
            };
            let listed = list.contains(&id);
            if listed == banning {
                if !report.already.contains(&id) && !report.changed.contains(&id) {
                    report.already.push(id);
                }
                continue;
            }
            if banning {
                list.push(id);
            } else {
                list.retain(|&r| r != id);
            }
            report.changed.push(id);
        }

        if !report.changed.is_empty() {
            self.database.set(BAN_COLLECTION, kind.key(), &*list).await?;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "111111111111111111";
    const B: &str = "222222222222222222";

    fn store() -> BanStore {
        BanStore::new(Database::in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_ban_adds_and_reports() {
        let store = store();
        let report = store.ban(BanKind::User, [A, B]).await.unwrap();
        assert_eq!(report.changed, vec![111111111111111111, 222222222222222222]);
        assert!(report.already.is_empty());
        assert!(report.invalid.is_empty());
        assert!(store.is_banned(BanKind::User, 111111111111111111).await.unwrap());
    }

    #[tokio::test]
    async fn test_ban_classifies_already_and_invalid() {
        let store = store();
        store.ban(BanKind::User, [A]).await.unwrap();
        let report = store.ban(BanKind::User, [A, "garbage", "123"]).await.unwrap();
        assert!(report.changed.is_empty());
        assert_eq!(report.already, vec![111111111111111111]);
        assert_eq!(report.invalid, vec!["garbage".to_string(), "123".to_string()]);
    }

    #[tokio::test]
    async fn test_ban_accepts_mentions() {
        let store = store();
        let report = store
            .ban(BanKind::User, ["<@111111111111111111>"])
            .await
            .unwrap();
        assert_eq!(report.changed, vec![111111111111111111]);
    }

    #[tokio::test]
    async fn test_duplicate_targets_reported_once() {
        let store = store();
        let report = store.ban(BanKind::Guild, [A, A]).await.unwrap();
        // first occurrence bans, the second is neither double-banned nor
        // double-reported
        assert_eq!(report.changed, vec![111111111111111111]);
        assert!(report.already.is_empty());
    }

    #[tokio::test]
    async fn test_unban_removes() {
        let store = store();
        store.ban(BanKind::Guild, [A, B]).await.unwrap();
        let report = store.unban(BanKind::Guild, [A]).await.unwrap();
        assert_eq!(report.changed, vec![111111111111111111]);
        assert!(!store.is_banned(BanKind::Guild, 111111111111111111).await.unwrap());
        assert!(store.is_banned(BanKind::Guild, 222222222222222222).await.unwrap());
    }

    #[tokio::test]
    async fn test_unban_missing_is_already() {
        let store = store();
        let report = store.unban(BanKind::Guild, [A]).await.unwrap();
        assert!(report.changed.is_empty());
        assert_eq!(report.already, vec![111111111111111111]);
    }

    #[tokio::test]
    async fn test_noop_reports() {
        let store = store();
        store.ban(BanKind::User, [A]).await.unwrap();
        // re-banning and garbage both leave the list untouched
        let report = store.ban(BanKind::User, [A, "garbage"]).await.unwrap();
        assert!(report.is_noop());

        let report = store.ban(BanKind::User, [B]).await.unwrap();
        assert!(!report.is_noop());
    }

    #[tokio::test]
    async fn test_lists_persist_across_stores() {
        let db = Database::in_memory().unwrap();
        {
            let store = BanStore::new(db.clone());
            store.ban(BanKind::User, [A]).await.unwrap();
        }
        let fresh = BanStore::new(db);
        assert!(fresh.is_banned(BanKind::User, 111111111111111111).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let db = Database::in_memory().unwrap();
        let store = BanStore::new(db.clone());
        assert!(!store.is_banned(BanKind::User, 111111111111111111).await.unwrap());
        // another handle writes behind our back
        let other = BanStore::new(db);
        other.ban(BanKind::User, [A]).await.unwrap();
        // cached copy is stale until invalidated
        assert!(!store.is_banned(BanKind::User, 111111111111111111).await.unwrap());
        store.invalidate().await;
        assert!(store.is_banned(BanKind::User, 111111111111111111).await.unwrap());
    }

    #[tokio::test]
    async fn test_guild_and_user_lists_are_independent() {
        let store = store();
        store.ban(BanKind::Guild, [A]).await.unwrap();
        assert!(!store.is_banned(BanKind::User, 111111111111111111).await.unwrap());
    }
}
