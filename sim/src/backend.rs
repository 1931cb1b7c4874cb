// Copyright (c) 2022-2023 The MobileCoin Foundation

//! In-memory wallet backend

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::anyhow;
use async_trait::async_trait;
use log::debug;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use ledger_ton::{
    backend::{
        AccountCacheUpdate, AccountId, Backend, LedgerAccount, SendResult, TransferGuard,
        WalletInfo,
    },
    SignedTransfer,
};
use ledger_ton_core::Network;

#[derive(Debug, Default)]
struct State {
    /// Account -> (ledger index, address)
    accounts: HashMap<AccountId, (u32, String)>,
    balances: HashMap<String, BigUint>,
    seqnos: HashMap<String, u32>,
    /// (owner, minter) -> token wallet
    token_wallets: HashMap<(String, String), String>,
    /// Token wallet -> minter
    minters: HashMap<String, String>,
    sent: Vec<(AccountId, SignedTransfer)>,
    cache_updates: Vec<(AccountId, String, AccountCacheUpdate)>,
}

/// Wallet backend holding chain state in memory
#[derive(Debug, Default)]
pub struct SimBackend {
    state: Mutex<State>,
    transfer_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
    staking_changes: AtomicUsize,
}

impl SimBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account with its ledger index and wallet address
    pub async fn add_account(&self, account: &AccountId, index: u32, address: &str) {
        self.state
            .lock()
            .await
            .accounts
            .insert(account.clone(), (index, address.to_string()));
    }

    pub async fn set_balance(&self, address: &str, balance: impl Into<BigUint>) {
        self.state
            .lock()
            .await
            .balances
            .insert(address.to_string(), balance.into());
    }

    pub async fn set_seqno(&self, address: &str, seqno: u32) {
        self.state
            .lock()
            .await
            .seqnos
            .insert(address.to_string(), seqno);
    }

    /// Register the token wallet held by `owner`, resolving to `minter`
    pub async fn add_token_wallet(&self, owner: &str, token: &str, wallet: &str, minter: &str) {
        let mut s = self.state.lock().await;
        s.token_wallets
            .insert((owner.to_string(), token.to_string()), wallet.to_string());
        s.minters.insert(wallet.to_string(), minter.to_string());
    }

    /// Messages broadcast so far
    pub async fn sent(&self) -> Vec<(AccountId, SignedTransfer)> {
        self.state.lock().await.sent.clone()
    }

    pub async fn cache_updates(&self) -> Vec<(AccountId, String, AccountCacheUpdate)> {
        self.state.lock().await.cache_updates.clone()
    }

    /// Number of staking change notifications
    pub fn staking_changes(&self) -> usize {
        self.staking_changes.load(Ordering::SeqCst)
    }

    async fn account(&self, account: &AccountId) -> anyhow::Result<(u32, String)> {
        self.state
            .lock()
            .await
            .accounts
            .get(account)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown account: {}", account))
    }
}

#[async_trait]
impl Backend for SimBackend {
    async fn fetch_address(&self, account: &AccountId) -> anyhow::Result<String> {
        let (_, address) = self.account(account).await?;
        Ok(address)
    }

    async fn fetch_account(&self, account: &AccountId) -> anyhow::Result<LedgerAccount> {
        let (index, _) = self.account(account).await?;
        Ok(LedgerAccount {
            ledger_account_index: index,
        })
    }

    async fn get_wallet_info(
        &self,
        _network: Network,
        address: &str,
    ) -> anyhow::Result<WalletInfo> {
        let s = self.state.lock().await;

        Ok(WalletInfo {
            seqno: s.seqnos.get(address).copied().unwrap_or_default(),
            balance: s.balances.get(address).cloned().unwrap_or_default(),
        })
    }

    async fn get_wallet_seqno(&self, account: &AccountId) -> anyhow::Result<u32> {
        let (_, address) = self.account(account).await?;
        let s = self.state.lock().await;

        Ok(s.seqnos.get(&address).copied().unwrap_or_default())
    }

    async fn get_wallet_balance(
        &self,
        _network: Network,
        address: &str,
    ) -> anyhow::Result<BigUint> {
        let s = self.state.lock().await;

        Ok(s.balances.get(address).cloned().unwrap_or_default())
    }

    async fn resolve_token_wallet_address(
        &self,
        _network: Network,
        owner: &str,
        token: &str,
    ) -> anyhow::Result<String> {
        let s = self.state.lock().await;

        s.token_wallets
            .get(&(owner.to_string(), token.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("No token wallet for {} ({})", owner, token))
    }

    async fn resolve_token_minter_address(
        &self,
        _network: Network,
        token_wallet: &str,
    ) -> anyhow::Result<String> {
        let s = self.state.lock().await;

        s.minters
            .get(token_wallet)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown token wallet: {}", token_wallet))
    }

    async fn wait_last_transfer(&self, account: &AccountId) -> anyhow::Result<TransferGuard> {
        let lock = self
            .transfer_locks
            .lock()
            .await
            .entry(account.clone())
            .or_default()
            .clone();

        let guard = lock.lock_owned().await;

        Ok(TransferGuard::new(guard))
    }

    async fn send_signed_message(
        &self,
        account: &AccountId,
        message: &SignedTransfer,
    ) -> anyhow::Result<SendResult> {
        let msg_hash = hex::encode(Sha256::digest(message.base64.as_bytes()));

        debug!("Broadcast {} (seqno: {}): {}", account, message.seqno, msg_hash);

        let mut s = self.state.lock().await;
        s.sent.push((account.clone(), message.clone()));
        if let Some(n) = s.seqnos.get_mut(&message.params.from_address) {
            *n += 1;
        }

        Ok(SendResult { msg_hash })
    }

    async fn update_account_memory_cache(
        &self,
        account: &AccountId,
        address: &str,
        update: AccountCacheUpdate,
    ) {
        self.state
            .lock()
            .await
            .cache_updates
            .push((account.clone(), address.to_string(), update));
    }

    async fn on_staking_change_expected(&self) {
        self.staking_changes.fetch_add(1, Ordering::SeqCst);
    }
}
