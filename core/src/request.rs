// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Canonical signing requests

use num_bigint::BigUint;

use crate::{payload::Normalized, Address, Error, LedgerPayload, RawCell};

bitflags::bitflags! {
    /// Message send mode flags
    pub struct SendMode: u8 {
        /// Pay forwarding fees separately from the message value
        const PAY_GAS_SEPARATELY = 1;

        /// Ignore errors during the action phase
        const IGNORE_ERRORS = 2;

        /// Carry the whole remaining balance of the wallet
        const CARRY_ALL_REMAINING_BALANCE = 128;
    }
}

impl SendMode {
    /// Send mode for a plain transfer
    ///
    /// Sending the entire balance carries the remainder so fees do not cause
    /// the transfer to fail.
    pub fn for_transfer(full_balance: bool) -> Self {
        match full_balance {
            true => SendMode::CARRY_ALL_REMAINING_BALANCE,
            false => SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS,
        }
    }
}

impl Default for SendMode {
    fn default() -> Self {
        SendMode::PAY_GAS_SEPARATELY | SendMode::IGNORE_ERRORS
    }
}

/// Device-ready description of a single transfer
#[derive(Clone, PartialEq, Debug)]
pub struct SigningRequest {
    /// Destination address
    pub to: Address,

    /// Return funds to sender if delivery fails
    pub bounce: bool,

    pub send_mode: SendMode,

    /// Wallet sequence number this message claims
    pub seqno: u32,

    /// Expiration time (unix seconds)
    pub timeout: u32,

    /// Value in nanotons
    pub amount: BigUint,

    pub payload: Option<LedgerPayload>,

    /// Contract deployment state, where the destination is not yet active
    pub state_init: Option<RawCell>,
}

impl SigningRequest {
    /// Build a signing request from a normalised payload
    pub fn new(
        to_address: &str,
        amount: BigUint,
        normalized: Normalized,
        send_mode: SendMode,
        seqno: u32,
        timeout: u32,
    ) -> Result<Self, Error> {
        Ok(Self {
            to: Address::parse(to_address)?,
            bounce: normalized.bounce,
            send_mode,
            seqno,
            timeout,
            amount,
            payload: normalized.payload,
            state_init: None,
        })
    }

    /// Attach contract deployment state
    pub fn with_state_init(mut self, state_init: Option<RawCell>) -> Self {
        self.state_init = state_init;
        self
    }
}
