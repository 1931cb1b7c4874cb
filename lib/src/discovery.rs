// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger account discovery

use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use ledger_ton_core::{Address, DerivationPath, WalletVersion};

use crate::{backend::Backend, session::DeviceSession, transport::TransportKind, Error};

/// Identity of the device an account was discovered on
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub kind: TransportKind,
    pub id: String,
    pub name: String,
}

/// Wallet account available for import
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccountInfo {
    pub index: u32,
    pub address: String,
    /// Hex encoded ed25519 public key
    pub public_key: String,
    #[serde(with = "ledger_ton_core::amount")]
    pub balance: BigUint,
    pub version: WalletVersion,
    pub device: DeviceIdentity,
}

/// Fetch wallet information for a single account index
pub async fn wallet_info<B: Backend + ?Sized>(
    session: &DeviceSession,
    backend: &B,
    index: u32,
) -> Result<WalletAccountInfo, Error> {
    let config = session.config();

    let device = session.device_info().await.ok_or(Error::NotConnected)?;

    let path = DerivationPath::for_account(index, config.network, config.workchain);
    let a = session
        .get_address(&path, &session.address_options(false))
        .await?;

    let balance = backend
        .get_wallet_balance(config.network, &a.address)
        .await
        .map_err(Error::Backend)?;

    Ok(WalletAccountInfo {
        index,
        address: a.address,
        public_key: hex::encode(a.public_key),
        balance,
        version: config.wallet_version,
        device: DeviceIdentity {
            kind: device.kind,
            id: device.id,
            name: device.name,
        },
    })
}

/// Compare addresses by workchain and hash where both parse
fn same_address(a: &str, b: &str) -> bool {
    match (Address::parse(a), Address::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Discover accounts for import, scanning upwards from `start_index`
///
/// Accounts with a balance are collected up to and including the first
/// empty account, so the result is never empty. Already imported addresses
/// are skipped.
pub async fn discover_accounts<B: Backend + ?Sized>(
    session: &DeviceSession,
    backend: &B,
    start_index: u32,
    already_imported: &[String],
) -> Result<Vec<WalletAccountInfo>, Error> {
    let mut accounts = vec![];
    let mut index = start_index;

    loop {
        let info = wallet_info(session, backend, index).await?;

        if already_imported
            .iter()
            .any(|a| same_address(a, &info.address))
        {
            debug!("Skipping imported account {} ({})", index, info.address);
        } else if info.balance.is_zero() {
            debug!("Found empty account {} ({})", index, info.address);

            accounts.push(info);
            break;
        } else {
            debug!(
                "Found account {} ({}, balance: {})",
                index, info.address, info.balance
            );
            accounts.push(info);
        }

        index = match index.checked_add(1) {
            Some(i) => i,
            None => break,
        };
    }

    Ok(accounts)
}
