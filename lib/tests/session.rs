// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::time::{Duration, Instant};

use num_bigint::BigUint;

use ledger_ton::{
    batch::prepare_message, AppState, DeviceError, Error, SessionConfig, SessionState,
    TransferConfig, TransferRequest, TransportKind,
};
use ledger_ton_core::{DerivationPath, Network, SigningRequest};
use ledger_ton_sim::{SignOutcome, SimProvider};

mod helpers;
use helpers::*;

fn signing_request(seqno: u32) -> SigningRequest {
    let r = TransferRequest {
        to_address: destination(1),
        amount: BigUint::from(1_000u64),
        payload: None,
        state_init: None,
    };

    prepare_message(&TransferConfig::default(), &r, seqno, 0).unwrap()
}

fn path() -> DerivationPath {
    DerivationPath::for_account(0, Network::Mainnet, 0)
}

#[tokio::test]
async fn connect_unsupported_environment() -> anyhow::Result<()> {
    let f = setup(SimProvider::new().unsupported());

    let r = f.session.connect().await;
    assert!(matches!(r, Err(Error::UnsupportedEnvironment)));

    assert_eq!(f.session.state().await, SessionState::Disconnected);
    assert_eq!(f.provider.requests(), 0);

    Ok(())
}

#[tokio::test]
async fn connect_fails_after_attempts() -> anyhow::Result<()> {
    let f = setup(SimProvider::new().no_device());

    let r = f.session.connect().await;
    assert!(matches!(r, Err(Error::ConnectionFailed)));

    // One access request per attempt
    assert_eq!(f.provider.requests(), session_config().attempts);
    assert_eq!(f.session.state().await, SessionState::Disconnected);
    assert_eq!(f.session.device_info().await, None);

    Ok(())
}

#[tokio::test]
async fn connect_after_request() -> anyhow::Result<()> {
    let f = setup(SimProvider::new().appears_after(2));

    f.session.connect().await?;

    assert_eq!(f.provider.requests(), 2);
    assert_eq!(f.provider.opens(), 1);
    assert_eq!(f.provider.reuses(), 0);

    assert_eq!(
        f.session.state().await,
        SessionState::Connected(AppState::Unknown)
    );

    let info = f.session.device_info().await.unwrap();
    assert_eq!(info.kind, TransportKind::Sim);
    assert!(info.opened);

    Ok(())
}

#[tokio::test]
async fn connect_skips_unsupported_transport() -> anyhow::Result<()> {
    let f = setup_with(
        vec![SimProvider::new().unsupported(), SimProvider::new()],
        session_config(),
    );

    f.session.connect().await?;

    let (first, second) = (&f.providers[0], &f.providers[1]);
    assert_eq!(first.requests(), 0);
    assert_eq!(first.opens(), 0);
    assert_eq!(second.opens(), 1);

    Ok(())
}

#[tokio::test]
async fn connect_prefers_first_transport() -> anyhow::Result<()> {
    let f = setup_with(
        vec![SimProvider::new(), SimProvider::new()],
        session_config(),
    );

    f.session.connect().await?;

    let (first, second) = (&f.providers[0], &f.providers[1]);
    assert_eq!(first.opens(), 1);
    assert_eq!(second.opens(), 0);
    assert_eq!(second.reuses(), 0);

    Ok(())
}

#[tokio::test]
async fn connect_reuses_open_device() -> anyhow::Result<()> {
    let f = setup(SimProvider::new().already_open());

    f.session.connect().await?;

    assert_eq!(f.provider.opens(), 0);
    assert_eq!(f.provider.reuses(), 1);

    Ok(())
}

#[tokio::test]
async fn reconnect_replaces_connection() -> anyhow::Result<()> {
    let f = connected().await;

    // Second connect finds the device already opened by the first
    f.session.connect().await?;

    assert_eq!(f.provider.opens(), 1);
    assert_eq!(f.provider.reuses(), 1);
    assert_eq!(
        f.session.state().await,
        SessionState::Connected(AppState::Unknown)
    );

    f.session.disconnect().await;
    assert_eq!(f.session.state().await, SessionState::Disconnected);

    Ok(())
}

#[tokio::test]
async fn wait_ready_after_unlock() -> anyhow::Result<()> {
    let f = connected().await;
    f.device.set_locked_checks(2);

    assert!(f.session.is_app_open().await);
    assert!(f.session.wait_for_app_ready(Duration::from_secs(2)).await);

    assert_eq!(
        f.session.state().await,
        SessionState::Connected(AppState::Unlocked)
    );

    Ok(())
}

#[tokio::test]
async fn wait_ready_times_out() -> anyhow::Result<()> {
    // Polling alone would run for ~10s
    let config = SessionConfig {
        attempts: 1000,
        pause_ms: 10,
        ..Default::default()
    };
    let f = setup_with(vec![SimProvider::new()], config);
    f.session.connect().await?;
    f.device.set_app_open(false);

    assert!(!f.session.is_app_open().await);

    let deadline = Duration::from_millis(50);
    let start = Instant::now();

    assert!(!f.session.wait_for_app_ready(deadline).await);
    assert!(start.elapsed() < deadline + Duration::from_millis(250));

    Ok(())
}

#[tokio::test]
async fn wait_ready_exhausts_attempts_while_locked() -> anyhow::Result<()> {
    let f = connected().await;
    f.device.set_locked_checks(100);

    assert!(!f.session.wait_for_app_ready(Duration::from_secs(5)).await);

    assert_eq!(
        f.session.state().await,
        SessionState::Connected(AppState::Locked)
    );

    Ok(())
}

#[tokio::test]
async fn disconnected_session() -> anyhow::Result<()> {
    let f = setup(SimProvider::new());

    assert!(!f.session.is_app_open().await);
    assert!(!f.session.wait_for_app_ready(Duration::from_millis(50)).await);

    let r = f.session.sign(&path(), &signing_request(1)).await;
    assert!(matches!(r, Err(Error::NotConnected)));

    Ok(())
}

#[tokio::test]
async fn ensure_ready_connects() -> anyhow::Result<()> {
    let f = setup(SimProvider::new());

    assert!(f.session.ensure_ready().await?);
    assert_eq!(
        f.session.state().await,
        SessionState::Connected(AppState::Unlocked)
    );

    Ok(())
}

#[tokio::test]
async fn transport_error_disconnects() -> anyhow::Result<()> {
    let f = connected().await;
    f.device.script([SignOutcome::Disconnect]).await;

    let r = f.session.sign(&path(), &signing_request(1)).await;
    assert!(matches!(r, Err(Error::Device(DeviceError::Transport(_)))));

    assert_eq!(f.session.state().await, SessionState::Disconnected);

    let r = f.session.sign(&path(), &signing_request(1)).await;
    assert!(matches!(r, Err(Error::NotConnected)));

    Ok(())
}

#[tokio::test]
async fn timeout_keeps_connection() -> anyhow::Result<()> {
    let f = connected().await;
    f.device.script([SignOutcome::Timeout]).await;

    let r = f.session.sign(&path(), &signing_request(1)).await;
    assert!(matches!(r, Err(Error::Device(DeviceError::Timeout))));

    assert!(matches!(
        f.session.state().await,
        SessionState::Connected(_)
    ));
    f.session.sign(&path(), &signing_request(1)).await?;

    Ok(())
}

#[tokio::test]
async fn status_error_keeps_connection() -> anyhow::Result<()> {
    let f = connected().await;
    f.device
        .script([SignOutcome::Status(0x6985), SignOutcome::Status(0x6a80)])
        .await;

    let r = f.session.sign(&path(), &signing_request(1)).await;
    assert!(matches!(r, Err(Error::UserRejected)));

    let r = f.session.sign(&path(), &signing_request(1)).await;
    assert!(matches!(r, Err(Error::Device(DeviceError::Status(0x6a80)))));

    assert!(matches!(
        f.session.state().await,
        SessionState::Connected(_)
    ));

    // Script exhausted, signing succeeds
    let s = f.session.sign(&path(), &signing_request(1)).await?;
    assert_eq!(&s.0[..4], &[0xb5, 0xee, 0x9c, 0x72]);

    Ok(())
}

#[tokio::test]
async fn get_address_shows_on_device() -> anyhow::Result<()> {
    let f = connected().await;

    let opts = f.session.address_options(true);
    let a = f.session.get_address(&path(), &opts).await?;

    assert_eq!(a.address, f.address(0));
    assert_eq!(f.device.displayed().await, vec![path()]);

    Ok(())
}
