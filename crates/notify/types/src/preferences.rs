//! Per-user delivery channel preferences.

use serde::{Deserialize, Serialize};

/// An out-of-band delivery channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Email,
    Sms,
    Chat,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Chat => "chat",
        }
    }

    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Sms, Channel::Chat];
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which channels a user accepts deliveries on.
///
/// SMS is opt-in; the other channels start enabled. These gates apply to
/// out-of-band sends only, in-app hub pushes are always delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPreferences {
    pub email: bool,
    pub sms: bool,
    pub chat: bool,
}

impl Default for ChannelPreferences {
    fn default() -> Self {
        Self {
            email: true,
            sms: false,
            chat: true,
        }
    }
}

impl ChannelPreferences {
    /// Preferences with every channel switched on.
    pub fn all_enabled() -> Self {
        Self {
            email: true,
            sms: true,
            chat: true,
        }
    }

    /// Preferences with every channel switched off.
    pub fn none() -> Self {
        Self {
            email: false,
            sms: false,
            chat: false,
        }
    }

    pub fn enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Sms => self.sms,
            Channel::Chat => self.chat,
        }
    }

    /// The channels currently switched on, in stable order.
    pub fn enabled_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.enabled(*c))
            .collect()
    }
}
