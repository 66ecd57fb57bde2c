//! FIX transport configuration.
//!
//! Construction-side only: the host application owns config file parsing and
//! hands a finished [`FixConfig`] (or deserializes one with serde) to the
//! wiring factory.

use crate::engine::{EngineConfig, SessionConfig, TlsConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const PROD_HOST: &str = "fix.elections.kalshi.com";
pub const DEMO_HOST: &str = "fix.demo.kalshi.co";

/// Session name the manager registers with the engine.
pub const SESSION_NAME: &str = "KALSHI";

/// Venue custom tags go up to 21009 (MaxExecutionCost); give the engine
/// headroom beyond that.
pub const MAX_TAG_NUMBER: u32 = 22000;

/// Which transport serves order operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportMode {
    Rest,
    Fix,
    FixWithRestFallback,
}

impl Default for TransportMode {
    fn default() -> Self {
        TransportMode::Rest
    }
}

/// FIX session and transport settings. All fields default per the venue's
/// rules of engagement; `sender_comp_id` is the operator's API key UUID and
/// has no usable default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    /// Connect to the demo environment instead of production.
    #[serde(default)]
    pub demo: bool,

    /// Explicit host override; when `None` the host follows `demo`.
    #[serde(default)]
    pub host: Option<String>,

    /// 8228 is the no-retransmit endpoint, 8230 retransmitting
    /// (`target_comp_id` must be `KalshiRT` there).
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub sender_comp_id: String,

    #[serde(default = "default_target_comp_id")]
    pub target_comp_id: String,

    #[serde(default = "default_begin_string")]
    pub begin_string: String,

    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u32,

    #[serde(default = "default_true")]
    pub reset_on_logon: bool,

    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_secs: u32,

    /// The exchange rejects plain TCP; disabling TLS is only useful against
    /// local test engines.
    #[serde(default = "default_true")]
    pub tls_enabled: bool,

    #[serde(default = "default_order_timeout")]
    pub order_timeout_secs: u64,

    #[serde(default)]
    pub transport_mode: TransportMode,
}

fn default_port() -> u16 {
    8228
}

fn default_target_comp_id() -> String {
    "KalshiNR".to_string()
}

fn default_begin_string() -> String {
    "FIXT.1.1".to_string()
}

fn default_heartbeat_interval() -> u32 {
    30
}

fn default_reconnect_interval() -> u32 {
    5
}

fn default_order_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            demo: false,
            host: None,
            port: default_port(),
            sender_comp_id: String::new(),
            target_comp_id: default_target_comp_id(),
            begin_string: default_begin_string(),
            heartbeat_interval_secs: default_heartbeat_interval(),
            reset_on_logon: true,
            reconnect_interval_secs: default_reconnect_interval(),
            tls_enabled: true,
            order_timeout_secs: default_order_timeout(),
            transport_mode: TransportMode::default(),
        }
    }
}

impl FixConfig {
    /// Effective host: explicit override, else per-environment default.
    pub fn host(&self) -> &str {
        match &self.host {
            Some(host) => host,
            None if self.demo => DEMO_HOST,
            None => PROD_HOST,
        }
    }

    pub fn order_timeout(&self) -> Duration {
        Duration::from_secs(self.order_timeout_secs)
    }

    /// Errors when required fields are missing. The wiring factory treats a
    /// failed validation as "stay on REST".
    pub fn validate(&self) -> Result<(), String> {
        if self.sender_comp_id.is_empty() {
            return Err("sender_comp_id not set; a FIX API key UUID is required".to_string());
        }
        Ok(())
    }

    /// Scratch directory for the engine's sequence-number files.
    pub fn persistence_path(&self) -> PathBuf {
        std::env::temp_dir().join("kalshi-fix")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            persistence_path: self.persistence_path(),
            session: SessionConfig {
                session_name: SESSION_NAME.to_string(),
                begin_string: self.begin_string.clone(),
                sender_comp_id: self.sender_comp_id.clone(),
                target_comp_id: self.target_comp_id.clone(),
                host: self.host().to_string(),
                port: self.port,
                heartbeat_interval_secs: self.heartbeat_interval_secs,
                reset_on_logon: self.reset_on_logon,
                reconnect_interval_secs: self.reconnect_interval_secs,
                max_tag_number: MAX_TAG_NUMBER,
                tls: if self.tls_enabled {
                    TlsConfig::default()
                } else {
                    TlsConfig::disabled()
                },
            },
        }
    }
}
