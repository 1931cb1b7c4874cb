// Copyright (c) 2022-2023 The MobileCoin Foundation

//! TON device application interface
//!
//! The app protocol (APDU framing, cell serialisation and hashing) is
//! implemented by the device library behind [TonApp]; this crate only drives
//! it and classifies its results.

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};

use ledger_ton_core::{DerivationPath, Network, SigningRequest, WalletVersion};

use crate::{transport::Transport, DeviceError};

/// Options for address derivation requests
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AddressOptions {
    /// Display the address on the device for confirmation
    pub show: bool,
    pub bounceable: bool,
    pub network: Network,
    pub workchain: i32,
    pub wallet_version: WalletVersion,
}

/// Address and public key derived on the device
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceAddress {
    /// User-friendly wallet address
    pub address: String,
    /// Ed25519 public key
    pub public_key: [u8; 32],
}

/// Signed external message as returned by the device
#[derive(Clone, PartialEq)]
pub struct SignedCell(pub Vec<u8>);

impl SignedCell {
    /// Base64 encoded bag-of-cells for broadcast
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl std::fmt::Debug for SignedCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignedCell({})", hex::encode(&self.0))
    }
}

/// Signing protocol handle built on a device [Transport]
#[async_trait]
pub trait TonApp: Send + Sync {
    /// Check the TON app is open on the device
    async fn is_app_open(&self) -> Result<bool, DeviceError>;

    /// Derive the wallet address for a path
    async fn get_address(
        &self,
        path: &DerivationPath,
        opts: &AddressOptions,
    ) -> Result<DeviceAddress, DeviceError>;

    /// Sign a transfer, returning the signed external message
    async fn sign_transaction(
        &self,
        path: &DerivationPath,
        req: &SigningRequest,
    ) -> Result<SignedCell, DeviceError>;
}

/// Builds a [TonApp] on top of a freshly connected transport
pub type AppBuilder = Box<dyn Fn(Arc<dyn Transport>) -> Arc<dyn TonApp> + Send + Sync>;
