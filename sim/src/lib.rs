// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Software ledger device and wallet backend
//!
//! Provides [SimDevice] (a scriptable TON app), [SimProvider] (a transport
//! provider whose device can appear late or never) and [SimBackend] (an in
//! memory wallet backend) for exercising `ledger-ton` without hardware.

use std::sync::Arc;

use ledger_ton::app::AppBuilder;

mod backend;
pub use backend::SimBackend;

mod device;
pub use device::{SignOutcome, SimDevice};

mod provider;
pub use provider::{SimProvider, SimTransport};

/// Build an [AppBuilder] attaching every new connection to `device`
pub fn app_builder(device: Arc<SimDevice>) -> AppBuilder {
    Box::new(move |_t| device.clone())
}
