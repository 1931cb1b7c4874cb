// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Device status words returned by the TON app

use num_enum::TryFromPrimitive;
use strum::Display;

/// Status words with special meaning to the host
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusWord {
    /// Request completed
    Ok = 0x9000,

    /// User declined the request on the device
    UserRejected = 0x6985,

    /// Device is paired but locked (PIN not yet entered)
    Locked = 0x530c,

    /// Instruction not supported, usually because the app is not open
    InsNotSupported = 0x6d00,

    /// Class not supported, usually because the dashboard is open
    ClaNotSupported = 0x6e00,

    /// Request data was rejected by the app
    InvalidData = 0x6a80,
}

impl StatusWord {
    /// Match a raw status word against a known value
    pub fn is(code: u16, s: StatusWord) -> bool {
        code == s as u16
    }

    /// Check whether a status code indicates the app is not running
    pub fn is_app_closed(code: u16) -> bool {
        matches!(
            StatusWord::try_from(code),
            Ok(StatusWord::InsNotSupported) | Ok(StatusWord::ClaNotSupported)
        )
    }
}
