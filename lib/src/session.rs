// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device session management
//!
//! A [DeviceSession] owns at most one live transport / app pair. `connect`
//! is the only writer (replacing the pair wholesale), signing and probing
//! operations take a shared handle to the current app for the duration of
//! a single call.

use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use strum::Display;
use tokio::sync::{Mutex, RwLock};

use ledger_ton_core::{DerivationPath, SigningRequest, StatusWord};

use crate::{
    app::{AddressOptions, AppBuilder, DeviceAddress, SignedCell, TonApp},
    config::SessionConfig,
    transport::{DeviceInfo, Transport, TransportProvider},
    DeviceError, Error,
};

/// App state as last observed by the session
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum AppState {
    /// Not yet checked
    Unknown,
    /// App open, device locked
    Locked,
    /// App open and unlocked
    Unlocked,
}

/// Session state
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(AppState),
}

/// Live transport and the app handle built on it
struct Connection {
    transport: Arc<dyn Transport>,
    app: Arc<dyn TonApp>,
    app_state: AppState,
}

enum Slot {
    Disconnected,
    Connecting,
    Connected(Connection),
}

/// Session for a single ledger device
pub struct DeviceSession {
    /// Transport providers in priority order
    providers: Vec<Arc<dyn TransportProvider>>,
    /// Builds the app handle for a new transport
    builder: AppBuilder,
    config: SessionConfig,
    slot: RwLock<Slot>,
    /// Serialises `connect` calls
    connect_lock: Mutex<()>,
}

impl DeviceSession {
    /// Create a new (disconnected) session
    pub fn new(
        providers: Vec<Arc<dyn TransportProvider>>,
        builder: AppBuilder,
        config: SessionConfig,
    ) -> Self {
        Self {
            providers,
            builder,
            config,
            slot: RwLock::new(Slot::Disconnected),
            connect_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Fetch the current session state
    pub async fn state(&self) -> SessionState {
        match &*self.slot.read().await {
            Slot::Disconnected => SessionState::Disconnected,
            Slot::Connecting => SessionState::Connecting,
            Slot::Connected(c) => SessionState::Connected(c.app_state),
        }
    }

    /// Information for the connected device
    pub async fn device_info(&self) -> Option<DeviceInfo> {
        match &*self.slot.read().await {
            Slot::Connected(c) => Some(c.transport.info().clone()),
            _ => None,
        }
    }

    /// Connect to a device, replacing any existing connection
    pub async fn connect(&self) -> Result<(), Error> {
        let _guard = self.connect_lock.lock().await;

        // Select the first supported transport
        let mut provider = None;
        for p in &self.providers {
            if p.is_supported().await {
                provider = Some(p.clone());
                break;
            }
            debug!("Transport {} not supported", p.kind());
        }
        let provider = match provider {
            Some(p) => p,
            None => {
                warn!("No supported transports");
                return Err(Error::UnsupportedEnvironment);
            }
        };

        debug!("Using transport: {}", provider.kind());

        *self.slot.write().await = Slot::Connecting;

        let transport = match self.open_device(provider.as_ref()).await {
            Ok(t) => t,
            Err(e) => {
                *self.slot.write().await = Slot::Disconnected;
                return Err(e);
            }
        };

        info!("Connected to device: {}", transport.info());

        let app = (self.builder)(transport.clone());

        *self.slot.write().await = Slot::Connected(Connection {
            transport,
            app,
            app_state: AppState::Unknown,
        });

        Ok(())
    }

    /// Find and open a device with bounded attempts
    async fn open_device(&self, p: &dyn TransportProvider) -> Result<Arc<dyn Transport>, Error> {
        for i in 0..self.config.attempts {
            let devices = match p.list().await {
                Ok(v) => v,
                Err(e) => {
                    warn!("Failed to list devices: {}", e);
                    tokio::time::sleep(self.config.pause()).await;
                    continue;
                }
            };

            let d = match devices.into_iter().next() {
                Some(d) => d,
                None => {
                    debug!("No devices found, requesting access (attempt {})", i);
                    if let Err(e) = p.request().await {
                        warn!("Device request failed: {}", e);
                    }
                    tokio::time::sleep(self.config.pause()).await;
                    continue;
                }
            };

            let r = match d.opened {
                true => p.reuse(&d).await,
                false => p.open(&d).await,
            };

            match r {
                Ok(t) => return Ok(t),
                Err(e) => {
                    warn!("Failed to open device {}: {}", d, e);
                    tokio::time::sleep(self.config.pause()).await;
                }
            }
        }

        Err(Error::ConnectionFailed)
    }

    /// Drop the live connection
    pub async fn disconnect(&self) {
        *self.slot.write().await = Slot::Disconnected;
    }

    /// Fetch a handle to the connected app
    async fn app(&self) -> Option<Arc<dyn TonApp>> {
        match &*self.slot.read().await {
            Slot::Connected(c) => Some(c.app.clone()),
            _ => None,
        }
    }

    /// Drop the connection if `app` is still the live one
    async fn invalidate(&self, app: &Arc<dyn TonApp>) {
        let mut slot = self.slot.write().await;
        if let Slot::Connected(c) = &*slot {
            if Arc::ptr_eq(&c.app, app) {
                warn!("Transport failure, dropping device connection");
                *slot = Slot::Disconnected;
            }
        }
    }

    /// Record the observed app state if `app` is still the live one
    async fn set_app_state(&self, app: &Arc<dyn TonApp>, state: AppState) {
        if let Slot::Connected(c) = &mut *self.slot.write().await {
            if Arc::ptr_eq(&c.app, app) {
                c.app_state = state;
            }
        }
    }

    /// Classify a device result, dropping the connection on transport failure
    async fn check<T>(
        &self,
        app: &Arc<dyn TonApp>,
        r: Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        if let Err(e) = &r {
            if e.is_transport() {
                self.invalidate(app).await;
            }
        }
        r
    }

    /// Check whether the TON app is open, never fails
    pub async fn is_app_open(&self) -> bool {
        let app = match self.app().await {
            Some(a) => a,
            None => return false,
        };

        match app.is_app_open().await {
            Ok(v) => v,
            Err(e) => {
                debug!("App open check failed: {}", e);
                false
            }
        }
    }

    /// Wait for the app to be open and the device unlocked
    ///
    /// Returns `false` if this is not confirmed before `deadline`. The
    /// polling future is dropped when the deadline fires.
    pub async fn wait_for_app_ready(&self, deadline: Duration) -> bool {
        match tokio::time::timeout(deadline, self.poll_app_ready()).await {
            Ok(v) => v,
            Err(_) => {
                debug!("Timeout waiting for app after {:?}", deadline);
                false
            }
        }
    }

    /// Poll for app readiness with bounded attempts
    async fn poll_app_ready(&self) -> bool {
        // Address derivation fails with a locked status on paired but locked devices
        let path = DerivationPath::for_account(0, self.config.network, self.config.workchain);
        let opts = self.address_options(false);

        for i in 0..self.config.attempts {
            if let Some(app) = self.app().await {
                if self.is_app_open().await {
                    let r = app.get_address(&path, &opts).await;
                    match self.check(&app, r).await {
                        Ok(_) => {
                            self.set_app_state(&app, AppState::Unlocked).await;
                            return true;
                        }
                        Err(e) if e.is_status(StatusWord::Locked) => {
                            debug!("Device locked (attempt {})", i);
                            self.set_app_state(&app, AppState::Locked).await;
                        }
                        Err(e) => warn!("Unlock check failed: {}", e),
                    }
                }
            }

            tokio::time::sleep(self.config.pause()).await;
        }

        false
    }

    /// Connect if required, then wait for the app with the configured deadline
    pub async fn ensure_ready(&self) -> Result<bool, Error> {
        if self.app().await.is_none() {
            self.connect().await?;
        }

        Ok(self.wait_for_app_ready(self.config.ready_deadline()).await)
    }

    /// Default address options for this session
    pub fn address_options(&self, show: bool) -> AddressOptions {
        AddressOptions {
            show,
            bounceable: false,
            network: self.config.network,
            workchain: self.config.workchain,
            wallet_version: self.config.wallet_version,
        }
    }

    /// Derive an address on the device
    pub async fn get_address(
        &self,
        path: &DerivationPath,
        opts: &AddressOptions,
    ) -> Result<DeviceAddress, Error> {
        let app = self.app().await.ok_or(Error::NotConnected)?;

        let r = app.get_address(path, opts).await;
        let a = self.check(&app, r).await?;

        Ok(a)
    }

    /// Sign a transfer on the device
    ///
    /// Device errors are returned for the caller to classify.
    pub async fn sign(
        &self,
        path: &DerivationPath,
        req: &SigningRequest,
    ) -> Result<SignedCell, Error> {
        let app = self.app().await.ok_or(Error::NotConnected)?;

        debug!("Signing seqno {} to {} (path: {})", req.seqno, req.to, path);

        let r = app.sign_transaction(path, req).await;
        let s = self.check(&app, r).await?;

        Ok(s)
    }
}
