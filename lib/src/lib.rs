// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger TON API Library
//!
//! Manages the lifecycle of a ledger device session (transport discovery,
//! connection, app readiness) and orchestrates single and batch transfer
//! signing against a [backend::Backend] supplying wallet state.
//!
//! Transports and the on-device app protocol are abstracted via
//! [transport::TransportProvider] and [app::TonApp], see `ledger-ton-sim`
//! for a software implementation.

// async traits not yet safe to use
// see https://github.com/rust-lang/rust/issues/91611
// #![feature(async_fn_in_trait)]

/// Re-export `ledger-ton-core` for consumers
pub use ledger_ton_core::{self as core};

pub mod app;
pub use app::{AddressOptions, DeviceAddress, SignedCell, TonApp};

pub mod backend;
pub use backend::{AccountId, Backend};

pub mod batch;
pub use batch::sign_batch;

pub mod config;
pub use config::{Config, SessionConfig, TransferConfig};

pub mod discovery;
pub use discovery::{discover_accounts, WalletAccountInfo};

mod error;
pub use error::{DeviceError, Error};

pub mod session;
pub use session::{AppState, DeviceSession, SessionState};

pub mod transfer;
pub use transfer::{SignedTransfer, TransferOptions, TransferParams, TransferRequest};

/// Re-export transports for consumer use
pub mod transport;
pub use transport::{DeviceInfo, Transport, TransportKind, TransportProvider};

mod wallet;
pub use wallet::{LedgerWallet, STAKE_COMMENT, UNSTAKE_COMMENT};
