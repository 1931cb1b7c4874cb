// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transfer model for TON hardware wallets
//!
//! This crate holds the synchronous, I/O free half of the TON ledger host
//! library: address parsing, derivation paths, payload variants and their
//! normalisation into device-ready payloads, canonical signing requests,
//! device status words and the batch retry state machine.
//!
//! Device and backend interaction lives in the `ledger-ton` crate.

pub mod address;
pub use address::{Address, AddressFlags};

#[cfg(feature = "serde")]
pub mod amount;

pub mod batch;
pub use batch::{BatchProgress, BatchState, Failure};

pub mod comment;
pub use comment::{is_valid_ledger_comment, MAX_COMMENT_LEN};

mod error;
pub use error::Error;

pub mod path;
pub use path::DerivationPath;

pub mod payload;
pub use payload::{
    normalize_payload, ForwardPayload, LedgerPayload, NftTransfer, Normalized, RawCell,
    TokenTransfer, TransferPayload,
};

pub mod request;
pub use request::{SendMode, SigningRequest};

pub mod status;
pub use status::StatusWord;

/// Nanotons per TON
pub const ONE_TON: u64 = 1_000_000_000;

/// Default workchain for wallet contracts
pub const BASECHAIN: i32 = 0;

/// Masterchain workchain id
pub const MASTERCHAIN: i32 = -1;

/// Network selector for derivation and address encoding
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Check whether this is a test network
    pub fn is_testnet(&self) -> bool {
        *self == Network::Testnet
    }
}

/// Wallet contract versions supported by the device app
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalletVersion {
    #[strum(serialize = "v3R2")]
    #[cfg_attr(feature = "serde", serde(rename = "v3R2"))]
    V3R2,
    #[default]
    #[strum(serialize = "v4R2")]
    #[cfg_attr(feature = "serde", serde(rename = "v4R2"))]
    V4R2,
}
