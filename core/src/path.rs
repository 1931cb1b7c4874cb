// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP-0044 style derivation paths for TON ledger accounts

use core::fmt;

use crate::{Network, MASTERCHAIN};

/// BIP-0044 purpose
pub const PURPOSE: u32 = 44;

/// SLIP-0044 coin type for TON
pub const COIN_TYPE: u32 = 607;

/// Chain id used on the device for the masterchain
const CHAIN_MASTER: u32 = 255;

/// Derivation path for a ledger account
///
/// `[purpose, coin_type, network, chain, account_index, sub_index]`,
/// all components hardened on the device.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DerivationPath([u32; 6]);

impl DerivationPath {
    /// Derive the path for an account index on the provided network and workchain
    pub fn for_account(index: u32, network: Network, workchain: i32) -> Self {
        let network = match network {
            Network::Mainnet => 0,
            Network::Testnet => 1,
        };
        let chain = match workchain {
            MASTERCHAIN => CHAIN_MASTER,
            _ => 0,
        };

        Self([PURPOSE, COIN_TYPE, network, chain, index, 0])
    }

    /// Account index component
    pub fn account_index(&self) -> u32 {
        self.0[4]
    }

    /// Path components
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl AsRef<[u32]> for DerivationPath {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for c in self.0 {
            write!(f, "/{c}'")?;
        }
        Ok(())
    }
}
