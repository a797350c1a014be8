//! Record types held by the persistent store.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Session Record ==
/// A stored session. Eligible for deletion once `expire_date` is in the past.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_key: String,
    pub session_data: String,
    pub expire_date: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_key: impl Into<String>, expire_date: DateTime<Utc>) -> Self {
        Self {
            session_key: session_key.into(),
            session_data: String::new(),
            expire_date,
        }
    }

    /// True once `expire_date < now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_date < now
    }
}

// == IP Ban ==
/// A banned client address and when the ban was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpBan {
    pub ip: IpAddr,
    pub created: DateTime<Utc>,
}

impl IpBan {
    pub fn new(ip: IpAddr, created: DateTime<Utc>) -> Self {
        Self { ip, created }
    }
}
