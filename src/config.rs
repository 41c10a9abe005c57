// Bot configuration — the single JSON blob the dashboard saves and the
// scheduler reads back. Secrets may also arrive via environment
// variables, which act as defaults when the stored blob leaves a field
// empty (stored values always win).

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{BotError, BotResult};
use crate::schedule::ScheduleSlot;

/// Immutable parameter bundle for one pipeline invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Tezos address whose created tokens are queried on objkt.com.
    #[serde(default)]
    pub address: String,
    /// Bluesky handle used as the login identifier.
    #[serde(default)]
    pub platform_handle: String,
    /// Bluesky app password. Passed through to createSession, never stored
    /// anywhere else by this crate.
    #[serde(default)]
    pub platform_credential: String,
    /// Template for the first line(s) of every post.
    #[serde(default)]
    pub message_template: String,
    /// Promotional link appended to every post.
    #[serde(default)]
    pub profile_link: String,
    /// Daily posting slots, checked once per trigger tick.
    #[serde(default)]
    pub schedules: Vec<ScheduleSlot>,
    /// Master switch — an inactive config makes every tick a no-op.
    #[serde(default)]
    pub is_active: bool,
}

impl BotConfig {
    /// Fill empty fields from environment variables.
    ///
    /// Mirrors the deployment setup where the saved config carries the
    /// public knobs and the secrets live in env vars. Stored values win;
    /// env vars only fill gaps.
    pub fn with_env_defaults(mut self) -> Self {
        fill(&mut self.address, "TEZOS_ADDRESS");
        fill(&mut self.platform_handle, "BLUESKY_HANDLE");
        fill(&mut self.platform_credential, "BLUESKY_PASSWORD");
        fill(&mut self.message_template, "CUSTOM_MESSAGE");
        fill(&mut self.profile_link, "PROFILE_URL");
        self
    }

    /// Check the fields no run can proceed without.
    pub fn validate(&self) -> BotResult<()> {
        if self.address.is_empty() {
            return Err(BotError::Config("missing creator address".into()));
        }
        if self.platform_handle.is_empty() {
            return Err(BotError::Config("missing Bluesky handle".into()));
        }
        Ok(())
    }
}

fn fill(field: &mut String, var: &str) {
    if field.is_empty() {
        if let Ok(value) = env::var(var) {
            *field = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_parses_camel_case_fields() {
        let json = r#"{
            "address": "tz1abc",
            "platformHandle": "artist.bsky.social",
            "platformCredential": "app-pass",
            "messageTemplate": "New drop",
            "profileLink": "objkt.com/@artist",
            "schedules": [{"time": "09:00", "enabled": true}],
            "isActive": true
        }"#;
        let config: BotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.platform_handle, "artist.bsky.social");
        assert_eq!(config.schedules.len(), 1);
        assert!(config.is_active);
    }

    #[test]
    fn partial_blob_defaults_missing_fields() {
        let config: BotConfig = serde_json::from_str(r#"{"address": "tz1abc"}"#).unwrap();
        assert_eq!(config.address, "tz1abc");
        assert!(config.platform_handle.is_empty());
        assert!(config.schedules.is_empty());
        assert!(!config.is_active);
    }

    #[test]
    fn env_defaults_fill_only_empty_fields() {
        env::set_var("CUSTOM_MESSAGE", "from the environment");
        let config = BotConfig {
            address: "tz1kept".into(),
            ..Default::default()
        }
        .with_env_defaults();
        assert_eq!(config.address, "tz1kept");
        assert_eq!(config.message_template, "from the environment");
        env::remove_var("CUSTOM_MESSAGE");
    }

    #[test]
    fn validate_requires_address_and_handle() {
        let mut config = BotConfig::default();
        assert!(config.validate().is_err());
        config.address = "tz1abc".into();
        assert!(config.validate().is_err());
        config.platform_handle = "artist.bsky.social".into();
        assert!(config.validate().is_ok());
    }
}
