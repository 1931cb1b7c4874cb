// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated TON app

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use log::debug;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use ledger_ton::{
    app::{AddressOptions, DeviceAddress, SignedCell, TonApp},
    DeviceError,
};
use ledger_ton_core::{
    payload::BOC_MAGIC, Address, AddressFlags, DerivationPath, SigningRequest, StatusWord,
};

/// Scripted result for a signing attempt
#[derive(Clone, Debug, PartialEq)]
pub enum SignOutcome {
    /// Sign the request
    Sign,
    /// Fail with a device status word
    Status(u16),
    /// Fail with a transport error
    Disconnect,
    /// Fail with a timeout
    Timeout,
}

/// Simulated TON app
///
/// Signing attempts consume scripted outcomes in order, signing normally
/// once the script is empty.
#[derive(Debug)]
pub struct SimDevice {
    app_open: AtomicBool,
    locked_checks: AtomicUsize,
    sign_attempts: AtomicUsize,
    outcomes: Mutex<VecDeque<SignOutcome>>,
    signed: Mutex<Vec<SigningRequest>>,
    displayed: Mutex<Vec<DerivationPath>>,
}

impl Default for SimDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDevice {
    /// Create a device with the app open and unlocked
    pub fn new() -> Self {
        Self {
            app_open: AtomicBool::new(true),
            locked_checks: AtomicUsize::new(0),
            sign_attempts: AtomicUsize::new(0),
            outcomes: Mutex::new(VecDeque::new()),
            signed: Mutex::new(vec![]),
            displayed: Mutex::new(vec![]),
        }
    }

    pub fn set_app_open(&self, open: bool) {
        self.app_open.store(open, Ordering::SeqCst);
    }

    /// Report the device as locked for the next `n` address requests
    pub fn set_locked_checks(&self, n: usize) {
        self.locked_checks.store(n, Ordering::SeqCst);
    }

    /// Append outcomes for upcoming signing attempts
    pub async fn script(&self, outcomes: impl IntoIterator<Item = SignOutcome>) {
        self.outcomes.lock().await.extend(outcomes);
    }

    /// Number of signing attempts, including failures
    pub fn sign_attempts(&self) -> usize {
        self.sign_attempts.load(Ordering::SeqCst)
    }

    /// Requests signed so far
    pub async fn signed(&self) -> Vec<SigningRequest> {
        self.signed.lock().await.clone()
    }

    /// Paths for which an address was shown on the display
    pub async fn displayed(&self) -> Vec<DerivationPath> {
        self.displayed.lock().await.clone()
    }

    /// Deterministic wallet address for an account index
    pub fn address_for(index: u32, opts: &AddressOptions) -> String {
        let a = Address::new(opts.workchain, Self::digest(b"address", index));

        a.to_friendly(AddressFlags {
            bounceable: opts.bounceable,
            test_only: opts.network.is_testnet(),
        })
    }

    /// Deterministic public key for an account index
    pub fn public_key_for(index: u32) -> [u8; 32] {
        Self::digest(b"public-key", index)
    }

    /// Expected output for a signed request
    pub fn signature_for(path: &DerivationPath, req: &SigningRequest) -> Vec<u8> {
        let mut h = Sha256::new();
        for p in path.as_slice() {
            h.update(p.to_be_bytes());
        }
        h.update(req.to.workchain.to_be_bytes());
        h.update(req.to.hash);
        h.update(req.seqno.to_be_bytes());
        h.update(req.timeout.to_be_bytes());
        h.update([req.send_mode.bits(), req.bounce as u8]);
        h.update(BigUint::to_bytes_be(&req.amount));

        let mut out = BOC_MAGIC.to_vec();
        out.extend_from_slice(&req.seqno.to_be_bytes());
        out.extend_from_slice(&h.finalize());
        out
    }

    fn digest(domain: &[u8], index: u32) -> [u8; 32] {
        let mut h = Sha256::new();
        h.update(domain);
        h.update(index.to_be_bytes());
        h.finalize().into()
    }

    fn check_open(&self) -> Result<(), DeviceError> {
        match self.app_open.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(DeviceError::Status(StatusWord::ClaNotSupported as u16)),
        }
    }
}

#[async_trait]
impl TonApp for SimDevice {
    async fn is_app_open(&self) -> Result<bool, DeviceError> {
        Ok(self.app_open.load(Ordering::SeqCst))
    }

    async fn get_address(
        &self,
        path: &DerivationPath,
        opts: &AddressOptions,
    ) -> Result<DeviceAddress, DeviceError> {
        self.check_open()?;

        let locked = self
            .locked_checks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if locked {
            return Err(DeviceError::Status(StatusWord::Locked as u16));
        }

        if opts.show {
            debug!("Displaying address for {}", path);
            self.displayed.lock().await.push(*path);
        }

        let index = path.account_index();

        Ok(DeviceAddress {
            address: Self::address_for(index, opts),
            public_key: Self::public_key_for(index),
        })
    }

    async fn sign_transaction(
        &self,
        path: &DerivationPath,
        req: &SigningRequest,
    ) -> Result<SignedCell, DeviceError> {
        self.sign_attempts.fetch_add(1, Ordering::SeqCst);

        self.check_open()?;

        let outcome = self
            .outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or(SignOutcome::Sign);

        debug!("Sign seqno {}: {:?}", req.seqno, outcome);

        match outcome {
            SignOutcome::Sign => (),
            SignOutcome::Status(s) => return Err(DeviceError::Status(s)),
            SignOutcome::Disconnect => {
                return Err(DeviceError::Transport(anyhow::anyhow!(
                    "Simulated device disconnected"
                )))
            }
            SignOutcome::Timeout => return Err(DeviceError::Timeout),
        }

        self.signed.lock().await.push(req.clone());

        Ok(SignedCell(Self::signature_for(path, req)))
    }
}
