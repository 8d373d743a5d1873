//! Messaging gateway contract.
//!
//! The core never talks to a concrete transport. It hands text to a
//! [`MessageGateway`] and looks only at whether delivery succeeded; `info`
//! is surfaced to the user on failure and otherwise ignored.

pub mod log_file;
pub mod messages;

pub use log_file::LogFileGateway;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub success: bool,
    pub info: String,
}

impl Delivery {
    pub fn delivered(info: impl Into<String>) -> Self {
        Self {
            success: true,
            info: info.into(),
        }
    }

    pub fn failed(info: impl Into<String>) -> Self {
        Self {
            success: false,
            info: info.into(),
        }
    }
}

/// Something that can deliver a text message to a recipient.
///
/// Implementations may block; callers bound the call with a timeout.
pub trait MessageGateway: Send + Sync {
    fn send(&self, message: &str, recipient: &str) -> Delivery;
}

/// Gateway used when no messenger is configured. Every send fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGateway;

impl MessageGateway for DisabledGateway {
    fn send(&self, _message: &str, _recipient: &str) -> Delivery {
        Delivery::failed("Messenger is not configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_gateway_always_fails() {
        let delivery = DisabledGateway.send("hello", "someone");
        assert!(!delivery.success);
        assert!(delivery.info.contains("not configured"));
    }
}
