// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger wallet operations
//!
//! [LedgerWallet] combines a [DeviceSession] with a [Backend] to submit
//! transfers, sign batches and discover accounts for import.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, error};
use num_bigint::BigUint;

use ledger_ton_core::{DerivationPath, TransferPayload, ONE_TON};

use crate::{
    backend::{AccountCacheUpdate, AccountId, Backend, SendResult, WalletInfo},
    batch::sign_batch,
    config::TransferConfig,
    discovery::{discover_accounts, WalletAccountInfo},
    session::DeviceSession,
    transfer::{prepare_transfer, SignedTransfer, TransferOptions, TransferRequest},
    Error,
};

/// Comment for nominator pool deposits
pub const STAKE_COMMENT: &str = "d";

/// Comment for nominator pool withdrawals
pub const UNSTAKE_COMMENT: &str = "w";

/// Wallet operations backed by a ledger device
pub struct LedgerWallet<B: Backend> {
    session: Arc<DeviceSession>,
    backend: Arc<B>,
    config: TransferConfig,
}

impl<B: Backend> LedgerWallet<B> {
    pub fn new(session: Arc<DeviceSession>, backend: Arc<B>, config: TransferConfig) -> Self {
        Self {
            session,
            backend,
            config,
        }
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve the derivation path for an account
    pub async fn account_path(&self, account: &AccountId) -> Result<DerivationPath, Error> {
        let a = self
            .backend
            .fetch_account(account)
            .await
            .map_err(Error::Backend)?;

        Ok(DerivationPath::for_account(
            a.ledger_account_index,
            account.network,
            self.session.config().workchain,
        ))
    }

    async fn fetch_address(&self, account: &AccountId) -> Result<String, Error> {
        self.backend
            .fetch_address(account)
            .await
            .map_err(Error::Backend)
    }

    /// Submit a single transfer, fetching wallet state from the backend
    ///
    /// Returns `None` where the device failed or the user declined.
    pub async fn submit_transfer(
        &self,
        account: &AccountId,
        options: &TransferOptions,
    ) -> Result<Option<SendResult>, Error> {
        let _guard = self
            .backend
            .wait_last_transfer(account)
            .await
            .map_err(Error::Backend)?;

        let from_address = self.fetch_address(account).await?;

        let (path, prior) = futures::try_join!(self.account_path(account), async {
            self.backend
                .get_wallet_info(account.network, &from_address)
                .await
                .map_err(Error::Backend)
        })?;

        self.submit(account, &path, &from_address, options, &prior)
            .await
    }

    /// Sign and broadcast a transfer using caller supplied wallet state
    pub async fn submit(
        &self,
        account: &AccountId,
        path: &DerivationPath,
        from_address: &str,
        options: &TransferOptions,
        prior: &WalletInfo,
    ) -> Result<Option<SendResult>, Error> {
        let (req, params) = prepare_transfer(
            self.backend.as_ref(),
            &self.config,
            account.network,
            from_address,
            options,
            prior,
        )
        .await?;

        let cell = match self.session.sign(path, &req).await {
            Ok(c) => c,
            Err(e) => {
                error!("Transfer signing failed: {} ({})", e, e.user_message());
                return Ok(None);
            }
        };

        let message = SignedTransfer {
            base64: cell.to_base64(),
            seqno: req.seqno,
            params,
        };

        debug!("Broadcasting transfer (seqno: {})", message.seqno);

        let r = self
            .backend
            .send_signed_message(account, &message)
            .await
            .map_err(Error::Backend)?;

        Ok(Some(r))
    }

    /// Deposit to a nominator pool
    pub async fn submit_stake(
        &self,
        account: &AccountId,
        pool: &str,
        amount: BigUint,
        fee: Option<BigUint>,
    ) -> Result<Option<SendResult>, Error> {
        let address = self.fetch_address(account).await?;

        let options = TransferOptions {
            to_address: pool.to_string(),
            amount: amount + ONE_TON,
            payload: Some(TransferPayload::Comment {
                comment: STAKE_COMMENT.to_string(),
            }),
            fee,
            token: None,
        };

        let r = self.submit_transfer(account, &options).await;

        if let Ok(Some(_)) = &r {
            let staked_at = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64;

            self.backend
                .update_account_memory_cache(
                    account,
                    &address,
                    AccountCacheUpdate {
                        staked_at: Some(staked_at),
                    },
                )
                .await;
        }

        self.backend.on_staking_change_expected().await;

        r
    }

    /// Request withdrawal from a nominator pool
    pub async fn submit_unstake(
        &self,
        account: &AccountId,
        pool: &str,
        fee: Option<BigUint>,
    ) -> Result<Option<SendResult>, Error> {
        let options = TransferOptions {
            to_address: pool.to_string(),
            amount: BigUint::from(ONE_TON),
            payload: Some(TransferPayload::Comment {
                comment: UNSTAKE_COMMENT.to_string(),
            }),
            fee,
            token: None,
        };

        let r = self.submit_transfer(account, &options).await;

        self.backend.on_staking_change_expected().await;

        r
    }

    /// Sign a batch of messages for an account
    ///
    /// The wallet seqno is fetched when not provided.
    pub async fn sign_transactions(
        &self,
        account: &AccountId,
        requests: &[TransferRequest],
        seqno: Option<u32>,
    ) -> Result<Vec<SignedTransfer>, Error> {
        let _guard = self
            .backend
            .wait_last_transfer(account)
            .await
            .map_err(Error::Backend)?;

        let from_address = self.fetch_address(account).await?;
        let path = self.account_path(account).await?;

        let seqno = match seqno {
            Some(s) => s,
            None => self
                .backend
                .get_wallet_seqno(account)
                .await
                .map_err(Error::Backend)?,
        };

        sign_batch(
            &self.session,
            &self.config,
            &path,
            &from_address,
            requests,
            seqno,
        )
        .await
    }

    /// Display the account address on the device for confirmation
    pub async fn verify_address(&self, account: &AccountId) -> Result<String, Error> {
        let path = self.account_path(account).await?;

        let mut opts = self.session.address_options(true);
        opts.network = account.network;
        opts.bounceable = self.config.default_bounce;

        let a = self.session.get_address(&path, &opts).await?;

        Ok(a.address)
    }

    /// Discover device accounts available for import
    pub async fn discover_accounts(
        &self,
        start_index: u32,
        already_imported: &[String],
    ) -> Result<Vec<WalletAccountInfo>, Error> {
        discover_accounts(
            &self.session,
            self.backend.as_ref(),
            start_index,
            already_imported,
        )
        .await
    }
}
