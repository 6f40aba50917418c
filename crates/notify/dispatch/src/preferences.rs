//! Channel preference lookup.
//!
//! The dispatcher consults preferences before every out-of-band send.
//! A failing provider falls back to the default preference set; it
//! never blocks a dispatch.

use approval_types::UserId;
use async_trait::async_trait;
use notify_types::ChannelPreferences;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("preference lookup failed: {0}")]
pub struct PreferenceError(pub String);

/// Source of per-user channel preferences.
#[async_trait]
pub trait PreferenceProvider: Send + Sync {
    async fn preferences(&self, user_id: &UserId) -> Result<ChannelPreferences, PreferenceError>;
}

/// Fixed preference table with a configurable default.
#[derive(Default)]
pub struct StaticPreferences {
    default: ChannelPreferences,
    overrides: RwLock<HashMap<UserId, ChannelPreferences>>,
}

impl StaticPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: ChannelPreferences) -> Self {
        Self {
            default,
            overrides: RwLock::new(HashMap::new()),
        }
    }

    /// Set one user's preferences.
    pub fn set(&self, user_id: UserId, preferences: ChannelPreferences) {
        if let Ok(mut guard) = self.overrides.write() {
            guard.insert(user_id, preferences);
        }
    }
}

#[async_trait]
impl PreferenceProvider for StaticPreferences {
    async fn preferences(&self, user_id: &UserId) -> Result<ChannelPreferences, PreferenceError> {
        let guard = self
            .overrides
            .read()
            .map_err(|_| PreferenceError("overrides lock poisoned".to_string()))?;
        Ok(guard.get(user_id).copied().unwrap_or(self.default))
    }
}
