// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Backend API interface
//!
//! Chain state lookups, token contract resolution and message broadcast are
//! provided by the wallet backend, this crate only calls into them.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use ledger_ton_core::Network;

use crate::transfer::SignedTransfer;

/// Wallet account identifier, `<id>-ton-<network>`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId {
    pub id: u32,
    pub network: Network,
}

impl AccountId {
    pub fn new(id: u32, network: Network) -> Self {
        Self { id, network }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-ton-{}", self.id, self.network)
    }
}

impl FromStr for AccountId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '-');

        let (id, chain, network) = match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(chain), Some(network)) => (id, chain, network),
            _ => return Err(anyhow::anyhow!("Invalid account id: {}", s)),
        };

        if chain != "ton" {
            return Err(anyhow::anyhow!("Unsupported chain: {}", chain));
        }

        Ok(Self {
            id: id.parse()?,
            network: network.parse()?,
        })
    }
}

impl TryFrom<String> for AccountId {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountId> for String {
    fn from(a: AccountId) -> Self {
        a.to_string()
    }
}

/// Stored metadata for a ledger-backed account
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAccount {
    /// Account index used for derivation on the device
    pub ledger_account_index: u32,
}

/// On-chain wallet state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletInfo {
    /// Next sequence number the wallet will accept
    pub seqno: u32,
    /// Balance in nanotons
    #[serde(with = "ledger_ton_core::amount")]
    pub balance: BigUint,
}

/// Result of broadcasting a signed message
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    /// Hash of the broadcast message
    pub msg_hash: String,
}

/// Held while a transfer is being built for an account, released on drop
pub struct TransferGuard(#[allow(dead_code)] Box<dyn Send + Sync>);

impl TransferGuard {
    pub fn new(inner: impl Send + Sync + 'static) -> Self {
        Self(Box::new(inner))
    }
}

impl fmt::Debug for TransferGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransferGuard")
    }
}

/// Staking state changes for account memory caches
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCacheUpdate {
    /// Unix time (milliseconds) a stake was submitted
    pub staked_at: Option<u64>,
}

/// Wallet backend API
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetch the wallet address for an account
    async fn fetch_address(&self, account: &AccountId) -> anyhow::Result<String>;

    /// Fetch ledger metadata for an account
    async fn fetch_account(&self, account: &AccountId) -> anyhow::Result<LedgerAccount>;

    /// Fetch sequence number and balance for a wallet
    async fn get_wallet_info(&self, network: Network, address: &str)
        -> anyhow::Result<WalletInfo>;

    /// Fetch the sequence number for an account wallet
    async fn get_wallet_seqno(&self, account: &AccountId) -> anyhow::Result<u32>;

    /// Fetch the balance of a wallet
    async fn get_wallet_balance(&self, network: Network, address: &str)
        -> anyhow::Result<BigUint>;

    /// Resolve the token wallet for an owner and token minter
    async fn resolve_token_wallet_address(
        &self,
        network: Network,
        owner: &str,
        token: &str,
    ) -> anyhow::Result<String>;

    /// Resolve the minter for a token wallet
    async fn resolve_token_minter_address(
        &self,
        network: Network,
        token_wallet: &str,
    ) -> anyhow::Result<String>;

    /// Wait for any in-flight transfer on the account, holding the returned
    /// guard until this transfer is built
    async fn wait_last_transfer(&self, account: &AccountId) -> anyhow::Result<TransferGuard>;

    /// Broadcast a signed transfer
    async fn send_signed_message(
        &self,
        account: &AccountId,
        message: &SignedTransfer,
    ) -> anyhow::Result<SendResult>;

    /// Update cached account data
    async fn update_account_memory_cache(
        &self,
        account: &AccountId,
        address: &str,
        update: AccountCacheUpdate,
    );

    /// Signal that staking state is expected to change
    async fn on_staking_change_expected(&self);
}
