// Copyright (c) 2022-2023 The MobileCoin Foundation

//! TON address parsing and encoding
//!
//! Addresses are accepted in raw (`<workchain>:<hex hash>`) or user-friendly
//! form. Friendly addresses are 36 bytes encoded as 48 characters of
//! (standard or url-safe) base64:
//!
//! ```text
//! +-------+-----------+----------------------+-----------+
//! |  TAG  | WORKCHAIN |      HASH (32)       | CRC16 (2) |
//! +-------+-----------+----------------------+-----------+
//! ```
//!
//! Where `TAG` is `0x11` (bounceable) or `0x51` (non-bounceable), optionally
//! with `0x80` set for test-only addresses, and the CRC is CRC16/XMODEM over
//! the preceding 34 bytes.

use core::{fmt, str::FromStr};

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE},
    Engine as _,
};
use crc::{Crc, CRC_16_XMODEM};

use crate::Error;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

const FRIENDLY_LEN: usize = 48;
const FRIENDLY_BYTES: usize = 36;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Account address on a TON workchain
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub workchain: i32,
    pub hash: [u8; 32],
}

/// Flags carried by user-friendly addresses
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressFlags {
    pub bounceable: bool,
    pub test_only: bool,
}

impl Address {
    /// Create an address from workchain and account hash
    pub const fn new(workchain: i32, hash: [u8; 32]) -> Self {
        Self { workchain, hash }
    }

    /// Check whether `s` looks like a user-friendly address
    pub fn is_friendly(s: &str) -> bool {
        s.len() == FRIENDLY_LEN
            && s.bytes()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, b'+' | b'/' | b'-' | b'_'))
    }

    /// Check whether `s` looks like a raw address
    pub fn is_raw(s: &str) -> bool {
        match s.split_once(':') {
            Some((wc, hash)) => {
                wc.parse::<i32>().is_ok()
                    && hash.len() == 64
                    && hash.bytes().all(|c| c.is_ascii_hexdigit())
            }
            None => false,
        }
    }

    /// Parse an address in either raw or user-friendly form
    pub fn parse(s: &str) -> Result<Self, Error> {
        if Self::is_raw(s) {
            Self::parse_raw(s)
        } else {
            Self::parse_friendly(s).map(|(a, _)| a)
        }
    }

    /// Parse a raw `<workchain>:<hex>` address
    pub fn parse_raw(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidAddress(s.to_string());

        let (wc, hash_hex) = s.split_once(':').ok_or_else(invalid)?;
        let workchain = wc.parse::<i32>().map_err(|_| invalid())?;

        let mut hash = [0u8; 32];
        hex::decode_to_slice(hash_hex, &mut hash).map_err(|_| invalid())?;

        Ok(Self { workchain, hash })
    }

    /// Parse a user-friendly address, returning the address and its flags
    pub fn parse_friendly(s: &str) -> Result<(Self, AddressFlags), Error> {
        let invalid = || Error::InvalidAddress(s.to_string());

        if !Self::is_friendly(s) {
            return Err(invalid());
        }

        // Alphabet is selected by the characters present
        let decoded = match s.contains(['-', '_']) {
            true => URL_SAFE.decode(s),
            false => STANDARD.decode(s),
        }
        .map_err(|_| invalid())?;

        if decoded.len() != FRIENDLY_BYTES {
            return Err(invalid());
        }

        let crc = u16::from_be_bytes([decoded[34], decoded[35]]);
        if CRC16.checksum(&decoded[..34]) != crc {
            return Err(invalid());
        }

        let mut tag = decoded[0];
        let test_only = tag & TAG_TEST_ONLY != 0;
        tag &= !TAG_TEST_ONLY;

        let bounceable = match tag {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            _ => return Err(invalid()),
        };

        let workchain = decoded[1] as i8 as i32;

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&decoded[2..34]);

        Ok((
            Self { workchain, hash },
            AddressFlags {
                bounceable,
                test_only,
            },
        ))
    }

    /// Encode as a url-safe user-friendly address
    pub fn to_friendly(&self, flags: AddressFlags) -> String {
        let mut buff = [0u8; FRIENDLY_BYTES];

        buff[0] = match flags.bounceable {
            true => TAG_BOUNCEABLE,
            false => TAG_NON_BOUNCEABLE,
        };
        if flags.test_only {
            buff[0] |= TAG_TEST_ONLY;
        }

        buff[1] = self.workchain as i8 as u8;
        buff[2..34].copy_from_slice(&self.hash);

        let crc = CRC16.checksum(&buff[..34]);
        buff[34..].copy_from_slice(&crc.to_be_bytes());

        URL_SAFE.encode(buff)
    }
}

/// Display in raw form
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.workchain, hex::encode(self.hash))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
