//! Transport abstractions for ledger device connections
//!
//! Concrete transports (HID, USB, BLE, simulators) live outside this crate
//! and are provided to a [DeviceSession][crate::DeviceSession] as a
//! prioritised list of [TransportProvider]s.
// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::DeviceError;

/// Transport kinds, in default priority order
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
#[non_exhaustive]
pub enum TransportKind {
    /// Human interface device
    Hid,
    /// Raw USB
    Usb,
    /// Bluetooth low energy
    Ble,
    /// Software simulator
    Sim,
}

/// Device information as reported by a transport listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Transport used to reach the device
    pub kind: TransportKind,
    /// Transport specific device identifier
    pub id: String,
    /// Product name
    pub name: String,
    /// Whether the device is already opened by this process
    pub opened: bool,
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:16} ({}, {})", self.name, self.kind, self.id)
    }
}

/// Live connection to a device
pub trait Transport: Send + Sync {
    /// Information for the connected device
    fn info(&self) -> &DeviceInfo;
}

/// Provider for a single transport kind
#[async_trait]
pub trait TransportProvider: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Check whether this transport can be used in the current environment
    async fn is_supported(&self) -> bool;

    /// List devices already known to the transport
    async fn list(&self) -> Result<Vec<DeviceInfo>, DeviceError>;

    /// Prompt the user to select / grant access to a device
    async fn request(&self) -> Result<(), DeviceError>;

    /// Open a listed device
    async fn open(&self, info: &DeviceInfo) -> Result<Arc<dyn Transport>, DeviceError>;

    /// Wrap a listed device that is already open
    async fn reuse(&self, info: &DeviceInfo) -> Result<Arc<dyn Transport>, DeviceError>;
}

impl Debug for dyn TransportProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransportProvider({})", self.kind())
    }
}
