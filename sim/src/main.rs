// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for exercising ledger-ton against a simulated device

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use log::{debug, info, warn, LevelFilter};
use num_bigint::BigUint;

use ledger_ton::{
    backend::AccountId, Config, DeviceSession, LedgerWallet, TransferOptions, TransportProvider,
    TransferRequest,
};
use ledger_ton_core::TransferPayload;
use ledger_ton_sim::*;

/// Simulated ledger TON utility
#[derive(Clone, Debug, PartialEq, Parser)]
struct Args {
    /// Load configuration from a TOML file (overrides command line options)
    #[clap(long = "config")]
    config_file: Option<PathBuf>,

    #[clap(flatten)]
    config: Config,

    #[clap(flatten)]
    sim: SimOptions,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Log level
    #[clap(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Simulated device and wallet options
#[derive(Clone, Debug, PartialEq, clap::Args)]
struct SimOptions {
    /// Access requests before the device is listed
    #[clap(long, default_value_t = 0)]
    appears_after: usize,

    /// Address requests reporting a locked device
    #[clap(long, default_value_t = 0)]
    locked_checks: usize,

    /// Wallet balances (nanotons) for accounts from index 0
    #[clap(long, value_delimiter = ',')]
    balances: Vec<u64>,

    /// Wallet seqno for the signing account
    #[clap(long, default_value_t = 0)]
    seqno: u32,
}

#[derive(Clone, Debug, PartialEq, Parser)]
#[non_exhaustive]
enum Actions {
    /// Connect to the device
    Connect,

    /// Connect and wait for the app to be ready
    WaitReady,

    /// Discover accounts available for import
    Discover {
        /// Account index to start from
        #[clap(long, default_value_t = 0)]
        start: u32,
    },

    /// Sign a batch of messages from a JSON file
    SignBatch {
        /// Account index to sign with
        #[clap(long, default_value_t = 0)]
        account: u32,

        /// JSON array of transfer requests
        #[clap(long)]
        file: PathBuf,
    },

    /// Submit a single transfer
    Transfer {
        /// Account index to sign with
        #[clap(long, default_value_t = 0)]
        account: u32,

        /// Destination address
        #[clap(long)]
        to: String,

        /// Amount in nanotons
        #[clap(long)]
        amount: u64,

        /// Optional comment
        #[clap(long)]
        comment: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging
    let _ = simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default());

    let config = match &args.config_file {
        Some(p) => Config::load(p)?,
        None => args.config.clone(),
    };

    debug!("Using config: {:?}", config);

    // Setup simulated device and backend
    let device = Arc::new(SimDevice::new());
    device.set_locked_checks(args.sim.locked_checks);

    let provider: Arc<dyn TransportProvider> =
        Arc::new(SimProvider::new().appears_after(args.sim.appears_after));

    let session = Arc::new(DeviceSession::new(
        vec![provider],
        app_builder(device.clone()),
        config.session.clone(),
    ));

    let backend = Arc::new(SimBackend::new());
    let opts = session.address_options(false);
    for (i, b) in args.sim.balances.iter().enumerate() {
        let address = SimDevice::address_for(i as u32, &opts);
        backend.set_balance(&address, *b).await;
        backend.set_seqno(&address, args.sim.seqno).await;
        backend
            .add_account(
                &AccountId::new(i as u32, config.session.network),
                i as u32,
                &address,
            )
            .await;
    }

    let wallet = LedgerWallet::new(session.clone(), backend.clone(), config.transfer.clone());

    // Execute command
    match args.cmd {
        Actions::Connect => {
            session.connect().await?;

            if let Some(d) = session.device_info().await {
                info!("Connected: {}", d);
            }
        }
        Actions::WaitReady => {
            session.connect().await?;

            let deadline = config.session.ready_deadline();
            match session.wait_for_app_ready(deadline).await {
                true => info!("App ready"),
                false => warn!("App not ready after {:?}", deadline),
            }
        }
        Actions::Discover { start } => {
            session.ensure_ready().await?;

            let accounts = wallet.discover_accounts(start, &[]).await?;

            info!("Accounts:");
            for a in &accounts {
                info!("  {}: {} (balance: {})", a.index, a.address, a.balance);
            }

            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
        Actions::SignBatch { account, file } => {
            let s = std::fs::read_to_string(&file)?;
            let requests: Vec<TransferRequest> = serde_json::from_str(&s)?;

            session.ensure_ready().await?;

            let id = AccountId::new(account, config.session.network);
            let signed = wallet.sign_transactions(&id, &requests, None).await?;

            if signed.len() < requests.len() {
                warn!("Signed {} of {} messages", signed.len(), requests.len());
            }

            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Actions::Transfer {
            account,
            to,
            amount,
            comment,
        } => {
            session.ensure_ready().await?;

            let id = AccountId::new(account, config.session.network);
            let path = wallet.account_path(&id).await?;
            info!("Signing with {}", path);

            let options = TransferOptions {
                to_address: to,
                amount: BigUint::from(amount),
                payload: comment.map(|comment| TransferPayload::Comment { comment }),
                fee: None,
                token: None,
            };

            match wallet.submit_transfer(&id, &options).await? {
                Some(r) => info!("Sent: {}", r.msg_hash),
                None => warn!("Transfer not signed"),
            }
        }
    }

    Ok(())
}
