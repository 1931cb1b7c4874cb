// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Simulated transport provider

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use log::debug;

use ledger_ton::{
    transport::{DeviceInfo, Transport, TransportKind, TransportProvider},
    DeviceError,
};

/// Connection to a simulated device
#[derive(Clone, Debug)]
pub struct SimTransport {
    info: DeviceInfo,
}

impl Transport for SimTransport {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }
}

/// Transport provider for a single simulated device
///
/// The device is listed once `request` has been called `appears_after`
/// times, modelling a user granting access to a device.
#[derive(Debug)]
pub struct SimProvider {
    supported: bool,
    appears_after: Option<usize>,
    opened: AtomicBool,
    requests: AtomicUsize,
    opens: AtomicUsize,
    reuses: AtomicUsize,
}

impl Default for SimProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SimProvider {
    /// Create a provider with the device immediately available
    pub fn new() -> Self {
        Self {
            supported: true,
            appears_after: Some(0),
            opened: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
            reuses: AtomicUsize::new(0),
        }
    }

    /// Mark the transport as unavailable in this environment
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// List the device only after `n` access requests
    pub fn appears_after(mut self, n: usize) -> Self {
        self.appears_after = Some(n);
        self
    }

    /// Never list a device
    pub fn no_device(mut self) -> Self {
        self.appears_after = None;
        self
    }

    /// List the device as already opened by this process
    pub fn already_open(self) -> Self {
        self.opened.store(true, Ordering::SeqCst);
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn reuses(&self) -> usize {
        self.reuses.load(Ordering::SeqCst)
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            kind: TransportKind::Sim,
            id: "sim-0".to_string(),
            name: "Nano S Plus".to_string(),
            opened: self.opened.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl TransportProvider for SimProvider {
    fn kind(&self) -> TransportKind {
        TransportKind::Sim
    }

    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn list(&self) -> Result<Vec<DeviceInfo>, DeviceError> {
        match self.appears_after {
            Some(n) if self.requests() >= n => Ok(vec![self.info()]),
            _ => Ok(vec![]),
        }
    }

    async fn request(&self) -> Result<(), DeviceError> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst);
        debug!("Device access request {}", n);
        Ok(())
    }

    async fn open(&self, info: &DeviceInfo) -> Result<Arc<dyn Transport>, DeviceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.opened.store(true, Ordering::SeqCst);

        Ok(Arc::new(SimTransport {
            info: DeviceInfo {
                opened: true,
                ..info.clone()
            },
        }))
    }

    async fn reuse(&self, info: &DeviceInfo) -> Result<Arc<dyn Transport>, DeviceError> {
        self.reuses.fetch_add(1, Ordering::SeqCst);

        Ok(Arc::new(SimTransport { info: info.clone() }))
    }
}
