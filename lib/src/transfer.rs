// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transfer requests and single transfer preparation

use log::debug;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use ledger_ton_core::{
    is_valid_ledger_comment, normalize_payload, Address, ForwardPayload, LedgerPayload, Network,
    Normalized, SendMode, SigningRequest, TransferPayload,
};

use crate::{
    backend::{Backend, WalletInfo},
    config::TransferConfig,
    Error,
};

/// Transfer message for batch signing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Destination address
    pub to_address: String,

    /// Value in nanotons
    #[serde(with = "ledger_ton_core::amount")]
    pub amount: BigUint,

    #[serde(default)]
    pub payload: Option<TransferPayload>,

    /// Base64 encoded contract state for deployment
    #[serde(default)]
    pub state_init: Option<String>,
}

/// Options for a single transfer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    /// Destination address (the recipient, for token transfers)
    pub to_address: String,

    /// Value in nanotons, or token units for token transfers
    #[serde(with = "ledger_ton_core::amount")]
    pub amount: BigUint,

    #[serde(default)]
    pub payload: Option<TransferPayload>,

    /// Estimated fee for display
    #[serde(default, with = "ledger_ton_core::amount::option")]
    pub fee: Option<BigUint>,

    /// Token minter address, `None` for native transfers
    #[serde(default)]
    pub token: Option<String>,
}

/// Transfer parameters preserved for display and history
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    #[serde(with = "ledger_ton_core::amount")]
    pub amount: BigUint,
    pub from_address: String,
    pub to_address: String,
    pub comment: Option<String>,
    #[serde(default, with = "ledger_ton_core::amount::option")]
    pub fee: Option<BigUint>,
    pub token: Option<String>,
}

/// Device signed transfer, ready for broadcast
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedTransfer {
    /// Base64 encoded external message
    pub base64: String,
    pub seqno: u32,
    pub params: TransferParams,
}

/// Build the signing request for a single transfer
///
/// Token transfers are redirected to the sender's token wallet, once the
/// token wallet is confirmed to belong to the requested minter.
pub async fn prepare_transfer<B: Backend + ?Sized>(
    backend: &B,
    config: &TransferConfig,
    network: Network,
    from_address: &str,
    options: &TransferOptions,
    prior: &WalletInfo,
) -> Result<(SigningRequest, TransferParams), Error> {
    let (to_address, amount, normalized) = match &options.token {
        None => {
            let n = normalize_payload(
                options.payload.as_ref(),
                &options.to_address,
                config.default_bounce,
            )?;
            (options.to_address.clone(), options.amount.clone(), n)
        }
        Some(token) => {
            let token_wallet = backend
                .resolve_token_wallet_address(network, from_address, token)
                .await
                .map_err(Error::Backend)?;
            let minter = backend
                .resolve_token_minter_address(network, &token_wallet)
                .await
                .map_err(Error::Backend)?;

            if Address::parse(token)? != Address::parse(&minter)? {
                return Err(Error::InvalidContract {
                    expected: token.clone(),
                    actual: minter,
                });
            }

            debug!("Using token wallet {} for {}", token_wallet, token);

            let forward_payload = match &options.payload {
                None => None,
                Some(TransferPayload::Comment { comment }) if is_valid_ledger_comment(comment) => {
                    Some(ForwardPayload::Comment(comment.clone()))
                }
                Some(TransferPayload::Comment { .. }) => {
                    return Err(ledger_ton_core::Error::UnsupportedComment.into())
                }
                Some(_) => {
                    return Err(Error::UnsupportedPayloadFormat(
                        "token transfers only accept comments".to_string(),
                    ))
                }
            };

            let payload = LedgerPayload::JettonTransfer {
                query_id: BigUint::default(),
                amount: options.amount.clone(),
                destination: Address::parse(&options.to_address)?,
                response_destination: Address::parse(from_address)?,
                custom_payload: None,
                forward_amount: BigUint::from(config.token_forward_amount),
                forward_payload,
            };

            (
                token_wallet,
                BigUint::from(config.token_amount),
                Normalized {
                    payload: Some(payload),
                    bounce: true,
                },
            )
        }
    };

    let full_balance = options.token.is_none() && options.amount == prior.balance;

    let request = SigningRequest::new(
        &to_address,
        amount,
        normalized,
        SendMode::for_transfer(full_balance),
        prior.seqno,
        config.expiration_time(),
    )?;

    let params = TransferParams {
        amount: options.amount.clone(),
        from_address: from_address.to_string(),
        to_address: options.to_address.clone(),
        comment: options
            .payload
            .as_ref()
            .and_then(|p| p.comment())
            .map(str::to_string),
        fee: options.fee.clone(),
        token: options.token.clone(),
    };

    Ok((request, params))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode_transfer_requests() {
        let json = r#"[
            {
                "toAddress": "0:0101010101010101010101010101010101010101010101010101010101010101",
                "amount": "1500000000",
                "payload": { "type": "comment", "comment": "first" }
            },
            {
                "toAddress": "0:0202020202020202020202020202020202020202020202020202020202020202",
                "amount": 42,
                "stateInit": "te6cckEBAQEAAgAAAEysuc0="
            }
        ]"#;

        let r: Vec<TransferRequest> = serde_json::from_str(json).unwrap();

        assert_eq!(r.len(), 2);
        assert_eq!(r[0].amount, BigUint::from(1_500_000_000u64));
        assert_eq!(r[0].payload.as_ref().and_then(|p| p.comment()), Some("first"));
        assert_eq!(r[1].amount, BigUint::from(42u64));
        assert_eq!(r[1].payload, None);
        assert!(r[1].state_init.is_some());
    }

    #[test]
    fn encode_signed_transfer() {
        let s = SignedTransfer {
            base64: "te6c".to_string(),
            seqno: 3,
            params: TransferParams {
                amount: BigUint::from(10u64),
                from_address: "a".to_string(),
                to_address: "b".to_string(),
                comment: None,
                fee: None,
                token: None,
            },
        };

        let v = serde_json::to_value(&s).unwrap();

        assert_eq!(v["seqno"], 3);
        assert_eq!(v["params"]["amount"], "10");
        assert_eq!(v["params"]["fromAddress"], "a");
    }
}
