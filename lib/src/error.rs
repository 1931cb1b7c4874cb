// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_ton_core::StatusWord;

/// Errors returned by device apps and transports
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Device responded with a non-success status word
    #[error("Device returned status 0x{0:04x}")]
    Status(u16),

    /// Communication with the device failed
    #[error("Transport error: {0}")]
    Transport(anyhow::Error),

    /// Request timeout
    #[error("Timeout waiting for device response")]
    Timeout,
}

impl DeviceError {
    /// Check whether the device reported the provided status
    pub fn is_status(&self, s: StatusWord) -> bool {
        matches!(self, DeviceError::Status(c) if StatusWord::is(*c, s))
    }

    /// Transport failures invalidate the connection, status words and timeouts do not
    pub fn is_transport(&self) -> bool {
        matches!(self, DeviceError::Transport(_))
    }
}

/// Ledger TON API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No supported transport in this environment
    #[error("No supported device transport available")]
    UnsupportedEnvironment,

    /// Device could not be found or opened
    #[error("Failed to connect to device")]
    ConnectionFailed,

    /// No live device session
    #[error("Device not connected")]
    NotConnected,

    /// Payload can not be signed by the device
    #[error("Unsupported payload format: {0}")]
    UnsupportedPayloadFormat(String),

    /// Malformed address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Resolved token minter does not match the requested token
    #[error("Invalid token contract (expected: {expected}, actual: {actual})")]
    InvalidContract { expected: String, actual: String },

    /// User denied operation
    #[error("Operation rejected by user")]
    UserRejected,

    /// Device or transport failure
    #[error("Device error: {0}")]
    Device(DeviceError),

    /// Backend API failure
    #[error("Backend error: {0}")]
    Backend(anyhow::Error),

    /// Configuration could not be loaded
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Batch would run past the largest sequence number
    #[error("Sequence number overflow (start: {start}, messages: {count})")]
    SeqnoOverflow { start: u32, count: usize },
}

/// Message shown when the user cancels on the device
pub const MSG_USER_REJECTED: &str = "Canceled by the user on the device";

/// Message shown for any other device failure
pub const MSG_DEVICE_FAILED: &str = "Device communication failed, please try again";

impl Error {
    /// User facing message for this error
    pub fn user_message(&self) -> String {
        match self {
            Error::UserRejected => MSG_USER_REJECTED.to_string(),
            Error::UnsupportedEnvironment
            | Error::ConnectionFailed
            | Error::NotConnected
            | Error::Device(_) => MSG_DEVICE_FAILED.to_string(),
            e => e.to_string(),
        }
    }

    /// Whether the operation may succeed if repeated
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed | Error::NotConnected | Error::Device(_) | Error::Backend(_)
        )
    }
}

/// Device errors are classified on conversion, user rejection is never retried
impl From<DeviceError> for Error {
    fn from(e: DeviceError) -> Self {
        match e {
            e if e.is_status(StatusWord::UserRejected) => Error::UserRejected,
            e => Error::Device(e),
        }
    }
}

impl From<ledger_ton_core::Error> for Error {
    fn from(e: ledger_ton_core::Error) -> Self {
        use ledger_ton_core::Error as E;

        match e {
            E::InvalidAddress(a) => Error::InvalidAddress(a),
            e @ E::UnsupportedComment | e @ E::UnsupportedPayload(_) | e @ E::InvalidCell(_) => {
                Error::UnsupportedPayloadFormat(e.to_string())
            }
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify_device_errors() {
        assert!(matches!(
            Error::from(DeviceError::Status(0x6985)),
            Error::UserRejected
        ));
        assert!(matches!(
            Error::from(DeviceError::Status(0x6a80)),
            Error::Device(DeviceError::Status(0x6a80))
        ));
        assert!(matches!(
            Error::from(DeviceError::Timeout),
            Error::Device(DeviceError::Timeout)
        ));
    }

    #[test]
    fn transport_errors() {
        assert!(DeviceError::Transport(anyhow::anyhow!("usb")).is_transport());
        assert!(!DeviceError::Timeout.is_transport());
        assert!(!DeviceError::Status(0x6a80).is_transport());

        assert!(Error::from(DeviceError::Timeout).is_retryable());
    }

    #[test]
    fn user_messages() {
        assert_eq!(Error::UserRejected.user_message(), MSG_USER_REJECTED);
        assert!(!Error::UserRejected.is_retryable());

        let e = Error::from(DeviceError::Transport(anyhow::anyhow!("usb")));
        assert_eq!(e.user_message(), MSG_DEVICE_FAILED);
        assert!(e.is_retryable());

        let e = Error::from(ledger_ton_core::Error::UnsupportedComment);
        assert!(matches!(e, Error::UnsupportedPayloadFormat(_)));
        assert!(!e.is_retryable());
    }
}
