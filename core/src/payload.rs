// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transfer payload variants and normalisation
//!
//! Applications describe transfer attachments with [TransferPayload], which
//! [normalize_payload] validates and converts into the [LedgerPayload] the
//! device app is able to display and sign.

use core::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use num_bigint::BigUint;

use crate::{is_valid_ledger_comment, Address, Error};

/// Magic prefix for serialised bag-of-cells
pub const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

/// Serialised bag-of-cells, carried opaquely to the device
#[derive(Clone, PartialEq, Eq)]
pub struct RawCell(Vec<u8>);

impl RawCell {
    /// Wrap serialised cell bytes, checking the bag-of-cells header
    pub fn from_bytes(b: Vec<u8>) -> Result<Self, Error> {
        if !b.starts_with(&BOC_MAGIC) {
            return Err(Error::InvalidCell("missing bag-of-cells header".to_string()));
        }

        Ok(Self(b))
    }

    /// Decode a base64 encoded bag-of-cells
    pub fn from_base64(s: &str) -> Result<Self, Error> {
        let b = STANDARD
            .decode(s)
            .map_err(|e| Error::InvalidCell(e.to_string()))?;

        Self::from_bytes(b)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl fmt::Debug for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawCell({})", hex::encode(&self.0))
    }
}

/// Transfer attachment as requested by the application
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum TransferPayload {
    /// Plain text comment
    #[cfg_attr(feature = "serde", serde(rename = "comment"))]
    Comment { comment: String },

    /// Fungible token (jetton) transfer
    #[cfg_attr(feature = "serde", serde(rename = "tokens:transfer"))]
    TokenTransfer(TokenTransfer),

    /// Non-fungible token transfer
    #[cfg_attr(feature = "serde", serde(rename = "nft:transfer"))]
    NftTransfer(NftTransfer),

    /// Any payload type the device app does not support
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl TransferPayload {
    /// Comment text, where this is a comment payload
    pub fn comment(&self) -> Option<&str> {
        match self {
            TransferPayload::Comment { comment } => Some(comment),
            _ => None,
        }
    }
}

/// Jetton transfer body, with addresses and cells in their string encodings
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TokenTransfer {
    #[cfg_attr(feature = "serde", serde(with = "crate::amount"))]
    pub query_id: BigUint,
    #[cfg_attr(feature = "serde", serde(with = "crate::amount"))]
    pub amount: BigUint,
    pub destination: String,
    pub response_destination: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub custom_payload: Option<String>,
    #[cfg_attr(feature = "serde", serde(with = "crate::amount"))]
    pub forward_amount: BigUint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub forward_payload: Option<String>,
}

/// NFT transfer body, with addresses and cells in their string encodings
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NftTransfer {
    #[cfg_attr(feature = "serde", serde(with = "crate::amount"))]
    pub query_id: BigUint,
    pub new_owner: String,
    pub response_destination: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub custom_payload: Option<String>,
    #[cfg_attr(feature = "serde", serde(with = "crate::amount"))]
    pub forward_amount: BigUint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub forward_payload: Option<String>,
}

/// Forward payload attached to a token transfer
#[derive(Clone, PartialEq, Debug)]
pub enum ForwardPayload {
    /// Text comment, encoded by the device app
    Comment(String),
    /// Pre-serialised cell
    Cell(RawCell),
}

/// Payload in the form accepted by the device app
#[derive(Clone, PartialEq, Debug)]
pub enum LedgerPayload {
    Comment {
        text: String,
    },
    JettonTransfer {
        query_id: BigUint,
        amount: BigUint,
        destination: Address,
        response_destination: Address,
        custom_payload: Option<RawCell>,
        forward_amount: BigUint,
        forward_payload: Option<ForwardPayload>,
    },
    NftTransfer {
        query_id: BigUint,
        new_owner: Address,
        response_destination: Address,
        custom_payload: Option<RawCell>,
        forward_amount: BigUint,
        forward_payload: Option<ForwardPayload>,
    },
}

/// Normalised payload and the bounce flag to sign with
#[derive(Clone, PartialEq, Debug)]
pub struct Normalized {
    pub payload: Option<LedgerPayload>,
    pub bounce: bool,
}

/// Resolve the bounce flag for a destination
///
/// Friendly addresses declare their own flag, raw addresses take the default.
pub fn bounce_for(to_address: &str, default_bounce: bool) -> Result<bool, Error> {
    if !Address::is_friendly(to_address) {
        return Ok(default_bounce);
    }

    let (_, flags) = Address::parse_friendly(to_address)?;
    Ok(flags.bounceable)
}

/// Validate and convert an application payload for signing
pub fn normalize_payload(
    payload: Option<&TransferPayload>,
    to_address: &str,
    default_bounce: bool,
) -> Result<Normalized, Error> {
    let n = match payload {
        None => Normalized {
            payload: None,
            bounce: bounce_for(to_address, default_bounce)?,
        },
        Some(TransferPayload::Comment { comment }) => {
            if !is_valid_ledger_comment(comment) {
                return Err(Error::UnsupportedComment);
            }

            Normalized {
                payload: Some(LedgerPayload::Comment {
                    text: comment.clone(),
                }),
                bounce: bounce_for(to_address, default_bounce)?,
            }
        }
        // Token and NFT transfers must always bounce so assets return on failure
        Some(TransferPayload::TokenTransfer(t)) => Normalized {
            payload: Some(LedgerPayload::JettonTransfer {
                query_id: t.query_id.clone(),
                amount: t.amount.clone(),
                destination: Address::parse(&t.destination)?,
                response_destination: Address::parse(&t.response_destination)?,
                custom_payload: decode_cell(t.custom_payload.as_deref())?,
                forward_amount: t.forward_amount.clone(),
                forward_payload: decode_cell(t.forward_payload.as_deref())?
                    .map(ForwardPayload::Cell),
            }),
            bounce: true,
        },
        Some(TransferPayload::NftTransfer(t)) => Normalized {
            payload: Some(LedgerPayload::NftTransfer {
                query_id: t.query_id.clone(),
                new_owner: Address::parse(&t.new_owner)?,
                response_destination: Address::parse(&t.response_destination)?,
                custom_payload: decode_cell(t.custom_payload.as_deref())?,
                forward_amount: t.forward_amount.clone(),
                forward_payload: decode_cell(t.forward_payload.as_deref())?
                    .map(ForwardPayload::Cell),
            }),
            bounce: true,
        },
        Some(TransferPayload::Unknown) => {
            return Err(Error::UnsupportedPayload("unknown".to_string()))
        }
    };

    Ok(n)
}

/// Decode an optional base64 cell, absent stays absent
pub fn decode_cell(s: Option<&str>) -> Result<Option<RawCell>, Error> {
    s.map(RawCell::from_base64).transpose()
}
