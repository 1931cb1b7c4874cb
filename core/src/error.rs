// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Validation errors raised while normalising transfers
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum Error {
    /// Address string could not be parsed
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    /// Comment contains characters or a length the device can not display
    #[error("Comment is not supported by the device")]
    UnsupportedComment,

    /// Payload kind is not supported by the device
    #[error("Unsupported payload format: {0}")]
    UnsupportedPayload(String),

    /// Raw cell payload failed to decode
    #[error("Invalid cell payload: {0}")]
    InvalidCell(String),
}
