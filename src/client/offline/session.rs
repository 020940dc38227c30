//! User, session and mode flags kept across restarts

use super::{keys, LocalFallbackStore};
use crate::shared::task::UserInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last probe outcome, written after every probe and read once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedServerStatus {
    pub is_online: bool,
    pub retry_count: u32,
    pub last_check: Option<DateTime<Utc>>,
}

impl LocalFallbackStore {
    pub fn cached_user(&self) -> Option<UserInfo> {
        self.get_opt(keys::USER)
    }

    pub fn set_cached_user(&self, user: &UserInfo) -> bool {
        self.set(keys::USER, user)
    }

    pub fn auth_token(&self) -> Option<String> {
        self.get_opt(keys::TOKEN)
    }

    /// Store the token, or forget it when `None`
    pub fn set_auth_token(&self, token: Option<&str>) -> bool {
        match token {
            Some(token) => self.set(keys::TOKEN, token),
            None => {
                self.remove(keys::TOKEN);
                true
            }
        }
    }

    pub fn server_status(&self) -> Option<PersistedServerStatus> {
        self.get_opt(keys::SERVER_STATUS)
    }

    pub fn set_server_status(&self, status: &PersistedServerStatus) -> bool {
        self.set(keys::SERVER_STATUS, status)
    }

    /// Time of the last completed full sync
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.get_opt(keys::LAST_SYNC)
    }

    pub fn set_last_sync(&self, at: DateTime<Utc>) -> bool {
        self.set(keys::LAST_SYNC, &at)
    }

    pub fn is_demo_mode(&self) -> bool {
        self.get(keys::DEMO_MODE, false)
    }

    pub fn set_demo_mode(&self, enabled: bool) -> bool {
        self.set(keys::DEMO_MODE, &enabled)
    }
}
