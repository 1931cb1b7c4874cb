// Copyright (c) 2022-2023 The MobileCoin Foundation

use num_bigint::BigUint;

use ledger_ton::{Error, TransferConfig, TransferOptions, STAKE_COMMENT, UNSTAKE_COMMENT};
use ledger_ton_core::{
    Address, ForwardPayload, LedgerPayload, SendMode, TransferPayload, ONE_TON,
};
use ledger_ton_sim::SignOutcome;

mod helpers;
use helpers::*;

fn options(to: &str, amount: u64) -> TransferOptions {
    TransferOptions {
        to_address: to.to_string(),
        amount: BigUint::from(amount),
        payload: None,
        fee: None,
        token: None,
    }
}

#[tokio::test]
async fn submit_transfer() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 10 * ONE_TON, 3).await;
    let wallet = f.wallet(TransferConfig::default());

    let mut o = options(&bounceable(9), ONE_TON);
    o.payload = Some(TransferPayload::Comment {
        comment: "hello".to_string(),
    });
    o.fee = Some(BigUint::from(5_000_000u64));

    let r = wallet.submit_transfer(&account, &o).await?;
    assert!(r.is_some());

    let signed = f.device.signed().await;
    assert_eq!(signed.len(), 1);

    let req = &signed[0];
    assert_eq!(req.seqno, 3);
    assert_eq!(req.send_mode, SendMode::default());
    assert!(req.bounce);
    assert_eq!(
        req.payload,
        Some(LedgerPayload::Comment {
            text: "hello".to_string()
        })
    );

    let sent = f.backend.sent().await;
    assert_eq!(sent.len(), 1);

    let (id, msg) = &sent[0];
    assert_eq!(id, &account);
    assert_eq!(msg.seqno, 3);
    assert_eq!(msg.params.from_address, f.address(0));
    assert_eq!(msg.params.comment.as_deref(), Some("hello"));
    assert_eq!(msg.params.fee, Some(BigUint::from(5_000_000u64)));

    Ok(())
}

#[tokio::test]
async fn submit_full_balance() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 2 * ONE_TON, 0).await;
    let wallet = f.wallet(TransferConfig::default());

    wallet
        .submit_transfer(&account, &options(&destination(1), 2 * ONE_TON))
        .await?;

    let req = &f.device.signed().await[0];
    assert_eq!(req.send_mode, SendMode::CARRY_ALL_REMAINING_BALANCE);
    assert!(!req.bounce);

    Ok(())
}

#[tokio::test]
async fn submit_device_error() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 2 * ONE_TON, 0).await;
    let wallet = f.wallet(TransferConfig::default());

    f.device
        .script([SignOutcome::Status(0x6985), SignOutcome::Status(0x6a80)])
        .await;

    // Device failures are reported as an absent result
    let r = wallet
        .submit_transfer(&account, &options(&destination(1), ONE_TON))
        .await?;
    assert!(r.is_none());

    let r = wallet
        .submit_transfer(&account, &options(&destination(1), ONE_TON))
        .await?;
    assert!(r.is_none());

    assert!(f.backend.sent().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn submit_invalid_payload() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 2 * ONE_TON, 0).await;
    let wallet = f.wallet(TransferConfig::default());

    let mut o = options(&destination(1), ONE_TON);
    o.payload = Some(TransferPayload::Unknown);

    let r = wallet.submit_transfer(&account, &o).await;
    assert!(matches!(r, Err(Error::UnsupportedPayloadFormat(_))));

    let r = wallet
        .submit_transfer(&account, &options("not-an-address", ONE_TON))
        .await;
    assert!(matches!(r, Err(Error::InvalidAddress(_))));

    assert_eq!(f.device.sign_attempts(), 0);

    Ok(())
}

#[tokio::test]
async fn submit_token_transfer() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 2 * ONE_TON, 5).await;
    let config = TransferConfig::default();
    let wallet = f.wallet(config.clone());

    let owner = f.address(0);
    let minter = bounceable(20);
    let token_wallet = bounceable(21);

    f.backend
        .add_token_wallet(&owner, &minter, &token_wallet, &minter)
        .await;

    let recipient = destination(2);
    let mut o = options(&recipient, 2 * ONE_TON);
    o.token = Some(minter.clone());
    o.payload = Some(TransferPayload::Comment {
        comment: "tokens".to_string(),
    });

    wallet.submit_transfer(&account, &o).await?;

    let req = &f.device.signed().await[0];

    // Sent to the token wallet with the fee amount attached
    assert_eq!(req.to, Address::parse(&token_wallet)?);
    assert_eq!(req.amount, BigUint::from(config.token_amount));
    assert!(req.bounce);

    // Token amount equal to the TON balance is not a full balance transfer
    assert_eq!(req.send_mode, SendMode::default());

    match &req.payload {
        Some(LedgerPayload::JettonTransfer {
            amount,
            destination,
            response_destination,
            forward_amount,
            forward_payload,
            ..
        }) => {
            assert_eq!(amount, &BigUint::from(2 * ONE_TON));
            assert_eq!(destination, &Address::parse(&recipient)?);
            assert_eq!(response_destination, &Address::parse(&owner)?);
            assert_eq!(forward_amount, &BigUint::from(config.token_forward_amount));
            assert_eq!(
                forward_payload,
                &Some(ForwardPayload::Comment("tokens".to_string()))
            );
        }
        p => panic!("Unexpected payload: {p:?}"),
    }

    let (_, msg) = &f.backend.sent().await[0];
    assert_eq!(msg.params.to_address, recipient);
    assert_eq!(msg.params.token, Some(minter));

    Ok(())
}

#[tokio::test]
async fn submit_token_transfer_invalid_contract() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 2 * ONE_TON, 5).await;
    let wallet = f.wallet(TransferConfig::default());

    let owner = f.address(0);
    let minter = bounceable(20);
    let token_wallet = bounceable(21);

    // Token wallet resolves to a different minter
    f.backend
        .add_token_wallet(&owner, &minter, &token_wallet, &bounceable(22))
        .await;

    let mut o = options(&destination(2), ONE_TON);
    o.token = Some(minter);

    let r = wallet.submit_transfer(&account, &o).await;
    assert!(matches!(r, Err(Error::InvalidContract { .. })));
    assert_eq!(f.device.sign_attempts(), 0);

    Ok(())
}

#[tokio::test]
async fn submit_stake() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 20 * ONE_TON, 1).await;
    let wallet = f.wallet(TransferConfig::default());

    let pool = bounceable(30);

    let r = wallet
        .submit_stake(&account, &pool, BigUint::from(5 * ONE_TON), None)
        .await?;
    assert!(r.is_some());

    let req = &f.device.signed().await[0];
    assert_eq!(req.amount, BigUint::from(6 * ONE_TON));
    assert_eq!(
        req.payload,
        Some(LedgerPayload::Comment {
            text: STAKE_COMMENT.to_string()
        })
    );

    let updates = f.backend.cache_updates().await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1, f.address(0));
    assert!(updates[0].2.staked_at.is_some());

    assert_eq!(f.backend.staking_changes(), 1);

    Ok(())
}

#[tokio::test]
async fn submit_stake_rejected() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 20 * ONE_TON, 1).await;
    let wallet = f.wallet(TransferConfig::default());

    f.device.script([SignOutcome::Status(0x6985)]).await;

    let r = wallet
        .submit_stake(&account, &bounceable(30), BigUint::from(ONE_TON), None)
        .await?;
    assert!(r.is_none());

    // Staking listeners are notified regardless of the outcome
    assert!(f.backend.cache_updates().await.is_empty());
    assert_eq!(f.backend.staking_changes(), 1);

    Ok(())
}

#[tokio::test]
async fn submit_unstake() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(0, 20 * ONE_TON, 1).await;
    let wallet = f.wallet(TransferConfig::default());

    wallet.submit_unstake(&account, &bounceable(30), None).await?;

    let req = &f.device.signed().await[0];
    assert_eq!(req.amount, BigUint::from(ONE_TON));
    assert_eq!(
        req.payload,
        Some(LedgerPayload::Comment {
            text: UNSTAKE_COMMENT.to_string()
        })
    );
    assert_eq!(f.backend.staking_changes(), 1);

    Ok(())
}

#[tokio::test]
async fn verify_address() -> anyhow::Result<()> {
    let f = connected().await;
    let account = f.add_account(3, 0, 0).await;
    let wallet = f.wallet(TransferConfig::default());

    let a = wallet.verify_address(&account).await?;
    assert_eq!(a, f.address(3));

    let displayed = f.device.displayed().await;
    assert_eq!(displayed.len(), 1);
    assert_eq!(displayed[0].account_index(), 3);

    Ok(())
}
