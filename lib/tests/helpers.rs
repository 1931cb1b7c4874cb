// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(dead_code)]

use std::{str::FromStr, sync::Arc};

use log::LevelFilter;
use simplelog::SimpleLogger;

use ledger_ton::{
    backend::AccountId, DeviceSession, LedgerWallet, SessionConfig, TransferConfig,
    TransportProvider,
};
use ledger_ton_core::{Address, AddressFlags, Network};
use ledger_ton_sim::*;

/// Simulated device, session and backend for a single test
pub struct Fixture {
    pub device: Arc<SimDevice>,
    /// First (highest priority) provider
    pub provider: Arc<SimProvider>,
    pub providers: Vec<Arc<SimProvider>>,
    pub session: Arc<DeviceSession>,
    pub backend: Arc<SimBackend>,
}

impl Fixture {
    /// Build a wallet over this fixture
    pub fn wallet(&self, config: TransferConfig) -> LedgerWallet<SimBackend> {
        LedgerWallet::new(self.session.clone(), self.backend.clone(), config)
    }

    /// Device address for an account index using session defaults
    pub fn address(&self, index: u32) -> String {
        SimDevice::address_for(index, &self.session.address_options(false))
    }

    /// Register an account at `index` with the provided balance and seqno
    pub async fn add_account(&self, index: u32, balance: u64, seqno: u32) -> AccountId {
        let account = AccountId::new(index, Network::Mainnet);
        let address = self.address(index);

        self.backend.add_account(&account, index, &address).await;
        self.backend.set_balance(&address, balance).await;
        self.backend.set_seqno(&address, seqno).await;

        account
    }
}

/// Session config with short pauses for tests
pub fn session_config() -> SessionConfig {
    SessionConfig {
        attempts: 5,
        pause_ms: 10,
        ..Default::default()
    }
}

// Setup logging
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}

// Setup a simulated device behind the provided transports, in priority order
pub fn setup_with(providers: Vec<SimProvider>, config: SessionConfig) -> Fixture {
    setup_logging();

    let device = Arc::new(SimDevice::new());
    let providers: Vec<Arc<SimProvider>> = providers.into_iter().map(Arc::new).collect();

    let session = Arc::new(DeviceSession::new(
        providers
            .iter()
            .map(|p| p.clone() as Arc<dyn TransportProvider>)
            .collect(),
        app_builder(device.clone()),
        config,
    ));

    Fixture {
        device,
        provider: providers[0].clone(),
        providers,
        session,
        backend: Arc::new(SimBackend::new()),
    }
}

// Setup a simulated device behind a single transport
pub fn setup(provider: SimProvider) -> Fixture {
    setup_with(vec![provider], session_config())
}

/// Setup with a connected session
pub async fn connected() -> Fixture {
    let f = setup(SimProvider::new());

    f.session.connect().await.expect("connect to simulated device");

    f
}

/// Non-bounceable destination address
pub fn destination(n: u8) -> String {
    Address::new(0, [n; 32]).to_friendly(AddressFlags::default())
}

/// Bounceable destination address
pub fn bounceable(n: u8) -> String {
    Address::new(0, [n; 32]).to_friendly(AddressFlags {
        bounceable: true,
        test_only: false,
    })
}
