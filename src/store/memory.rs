//! In-memory record store.
//!
//! Sessions are indexed by `(expire_date, session_key)` so that the oldest
//! expired rows come first, which is what the bounded delete needs.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::{IpBan, IpBanStore, SessionRecord, SessionStore};

#[derive(Debug, Default)]
struct Tables {
    sessions: BTreeMap<(DateTime<Utc>, String), SessionRecord>,
    expiry_by_key: HashMap<String, DateTime<Utc>>,
    ip_bans: Vec<IpBan>,
}

impl Tables {
    /// Keys of expired sessions, oldest first.
    fn expired_keys(&self, now: DateTime<Utc>) -> impl Iterator<Item = &(DateTime<Utc>, String)> {
        self.sessions
            .iter()
            .take_while(move |(_, record)| record.is_expired(now))
            .map(|(key, _)| key)
    }
}

// == Memory Store ==
/// `SessionStore` and `IpBanStore` kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session, replacing any existing row with the same key.
    pub async fn insert_session(&self, record: SessionRecord) {
        let mut tables = self.tables.write().await;
        if let Some(previous) = tables
            .expiry_by_key
            .insert(record.session_key.clone(), record.expire_date)
        {
            tables
                .sessions
                .remove(&(previous, record.session_key.clone()));
        }
        tables
            .sessions
            .insert((record.expire_date, record.session_key.clone()), record);
    }

    pub async fn get_session(&self, session_key: &str) -> Option<SessionRecord> {
        let tables = self.tables.read().await;
        let expire_date = *tables.expiry_by_key.get(session_key)?;
        tables
            .sessions
            .get(&(expire_date, session_key.to_string()))
            .cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    pub async fn insert_ip_ban(&self, ban: IpBan) {
        self.tables.write().await.ip_bans.push(ban);
    }

    pub async fn ip_bans(&self) -> Vec<IpBan> {
        self.tables.read().await.ip_bans.clone()
    }

    pub async fn ip_ban_count(&self) -> usize {
        self.tables.read().await.ip_bans.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn count_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        Ok(self.tables.read().await.expired_keys(now).count())
    }

    async fn delete_expired(&self, now: DateTime<Utc>, limit: usize) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().await;
        let doomed: Vec<(DateTime<Utc>, String)> =
            tables.expired_keys(now).take(limit).cloned().collect();

        for key in &doomed {
            tables.sessions.remove(key);
            tables.expiry_by_key.remove(&key.1);
        }
        Ok(doomed.len())
    }

    async fn has_expired(&self, now: DateTime<Utc>) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.expired_keys(now).next().is_some())
    }
}

#[async_trait]
impl IpBanStore for MemoryStore {
    async fn delete_bans_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.ip_bans.len();
        tables.ip_bans.retain(|ban| ban.created >= cutoff);
        Ok(before - tables.ip_bans.len())
    }
}
