// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Session and transfer configuration
//!
//! Configuration may be provided on the command line (via [clap::Args]) or
//! loaded from a TOML file, all fields have defaults.

use std::{
    path::Path,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use ledger_ton_core::{Network, WalletVersion, BASECHAIN};

use crate::Error;

/// Device session configuration
#[derive(Clone, Debug, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Attempts for connection and app readiness polling
    #[clap(long, default_value_t = 10)]
    pub attempts: usize,

    /// Pause between attempts (milliseconds)
    #[clap(long, default_value_t = 125)]
    pub pause_ms: u64,

    /// Deadline for app readiness (milliseconds), defaults to the polling period plus one second
    #[clap(long)]
    pub ready_deadline_ms: Option<u64>,

    /// Network for address derivation
    #[clap(long, default_value_t = Network::Mainnet)]
    pub network: Network,

    /// Wallet workchain
    #[clap(long, default_value_t = BASECHAIN, allow_hyphen_values = true)]
    pub workchain: i32,

    /// Wallet contract version
    #[clap(long, default_value_t = WalletVersion::V4R2)]
    pub wallet_version: WalletVersion,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            pause_ms: 125,
            ready_deadline_ms: None,
            network: Network::Mainnet,
            workchain: BASECHAIN,
            wallet_version: WalletVersion::V4R2,
        }
    }
}

impl SessionConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    /// Deadline for [DeviceSession::wait_for_app_ready][crate::DeviceSession::wait_for_app_ready]
    pub fn ready_deadline(&self) -> Duration {
        match self.ready_deadline_ms {
            Some(ms) => Duration::from_millis(ms),
            None => self.pause() * self.attempts as u32 + Duration::from_secs(1),
        }
    }
}

/// Transfer construction configuration
#[derive(Clone, Debug, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Seconds until a signed transfer expires
    #[clap(long, default_value_t = 60)]
    pub transfer_timeout_s: u64,

    /// Bounce flag for destinations that do not declare one
    #[clap(long)]
    pub default_bounce: bool,

    /// Base attempt budget for batch signing (one more is added per message)
    #[clap(long, default_value_t = 10)]
    pub batch_attempts: usize,

    /// Nanotons attached to token transfers for fees
    #[clap(long, default_value_t = 100_000_000)]
    pub token_amount: u64,

    /// Nanotons forwarded to the token recipient
    #[clap(long, default_value_t = 1)]
    pub token_forward_amount: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            transfer_timeout_s: 60,
            default_bounce: false,
            batch_attempts: 10,
            token_amount: 100_000_000,
            token_forward_amount: 1,
        }
    }
}

impl TransferConfig {
    /// Expiration timestamp for a transfer signed now
    pub fn expiration_time(&self) -> u32 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        (now + self.transfer_timeout_s) as u32
    }
}

/// Combined configuration
#[derive(Clone, Debug, Default, PartialEq, clap::Args, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[clap(flatten)]
    pub session: SessionConfig,

    #[clap(flatten)]
    pub transfer: TransferConfig,
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, Error> {
        let c = toml::from_str(s)?;
        Ok(c)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        Self::from_toml(&s)
    }
}
