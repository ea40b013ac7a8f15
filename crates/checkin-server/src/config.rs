//! Runtime configuration, deserialised from `config.toml` and `CHECKIN_*`
//! environment variables.

use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use anyhow::{Context as _, bail};
use checkin_core::{punctuality::PunctualityRules, schedule::IdealSchedule};
use chrono_tz::Tz;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub database_path:        PathBuf,
  pub jwt_secret:           String,
  pub front_url:            String,
  /// IANA zone name all punctuality is judged in.
  pub timezone:             String,
  pub window_secs:          u64,
  pub request_timeout_secs: u64,
  pub cors_origins:         Vec<String>,
  pub cache:                CacheConfig,
  pub storage:              StorageConfig,
  pub mail:                 MailConfig,
  /// Weekday name to `HH:MM` times; listed days replace the defaults.
  pub schedule:             BTreeMap<String, Vec<String>>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "0.0.0.0".into(),
      port:                 3000,
      database_path:        "checkin.db".into(),
      jwt_secret:           String::new(),
      front_url:            "http://localhost:5173".into(),
      timezone:             "America/Sao_Paulo".into(),
      window_secs:          3 * 60 * 60,
      request_timeout_secs: 30,
      cors_origins:         Vec::new(),
      cache:                CacheConfig::default(),
      storage:              StorageConfig::default(),
      mail:                 MailConfig::default(),
      schedule:             BTreeMap::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// In-process cache when unset.
  pub redis_url:  Option<String>,
  pub timeout_ms: u64,
}

impl Default for CacheConfig {
  fn default() -> Self { Self { redis_url: None, timeout_ms: 500 } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
  #[default]
  Local,
  Cloudinary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  pub kind:            StorageKind,
  /// Directory served under `/qr` by the local publisher.
  pub public_dir:      PathBuf,
  pub public_base_url: String,
  pub cloud_name:      String,
  pub api_key:         String,
  pub api_secret:      String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      kind:            StorageKind::Local,
      public_dir:      "public/qr".into(),
      public_base_url: "http://localhost:3000".into(),
      cloud_name:      String::new(),
      api_key:         String::new(),
      api_secret:      String::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
  /// Reset links are only logged when unset.
  pub brevo_api_key: Option<String>,
  pub sender_name:   String,
  pub sender_email:  String,
}

impl Default for MailConfig {
  fn default() -> Self {
    Self {
      brevo_api_key: None,
      sender_name:   "Checkin".into(),
      sender_email:  "no-reply@localhost".into(),
    }
  }
}

impl ServerConfig {
  pub fn window(&self) -> Duration { Duration::from_secs(self.window_secs) }

  pub fn request_timeout(&self) -> Duration { Duration::from_secs(self.request_timeout_secs) }

  pub fn cache_timeout(&self) -> Duration { Duration::from_millis(self.cache.timeout_ms) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Time zone and ideal schedule, parsed from their string forms.
  pub fn punctuality_rules(&self) -> anyhow::Result<PunctualityRules> {
    let tz: Tz = self
      .timezone
      .parse()
      .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {e}", self.timezone))?;
    let schedule = IdealSchedule::from_overrides(&self.schedule).context("invalid schedule")?;
    Ok(PunctualityRules::new(tz, schedule))
  }

  /// Reject settings the server cannot start with.
  pub fn validate(&self) -> anyhow::Result<()> {
    if self.jwt_secret.trim().is_empty() {
      bail!("jwt_secret must be set");
    }
    if self.window_secs == 0 {
      bail!("window_secs must be positive");
    }
    if self.storage.kind == StorageKind::Cloudinary
      && [&self.storage.cloud_name, &self.storage.api_key, &self.storage.api_secret]
        .iter()
        .any(|v| v.is_empty())
    {
      bail!("cloudinary storage needs cloud_name, api_key and api_secret");
    }
    Ok(())
  }
}
