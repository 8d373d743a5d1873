//! Confirmation gatekeeper.
//!
//! Couples the [`ConfirmationService`] with a [`MessageGateway`]: issues a
//! code, formats the message, and delivers it with a bounded wait. When
//! delivery fails the configured [`GatewayFailurePolicy`] decides whether the
//! operation is aborted or allowed through unconfirmed, and the caller is
//! told which branch was taken.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::error::{Result, RosterError};
use crate::messaging::messages::{self, OperationStatus};
use crate::messaging::{Delivery, MessageGateway};
use crate::otp::{ConfirmationService, OperationTag};
use crate::storage::RecordType;

/// Default wait for a single gateway call.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// What to do when a confirmation code cannot be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayFailurePolicy {
    /// Refuse the operation.
    #[default]
    Abort,
    /// Let the operation continue without a confirmation code.
    ProceedUnconfirmed,
}

impl GatewayFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "abort",
            Self::ProceedUnconfirmed => "proceed",
        }
    }
}

impl fmt::Display for GatewayFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayFailurePolicy {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "proceed" | "proceed_unconfirmed" => Ok(Self::ProceedUnconfirmed),
            other => Err(RosterError::InvalidInput(format!(
                "Unknown gateway failure policy '{}'. Valid: abort, proceed",
                other
            ))),
        }
    }
}

/// Result of asking for a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    /// A code was delivered; the caller must collect it and call
    /// [`Gatekeeper::confirm`].
    AwaitingCode { info: String },
    /// Delivery failed and the policy let the operation through.
    Unconfirmed { reason: String },
}

impl Challenge {
    pub fn requires_code(&self) -> bool {
        matches!(self, Self::AwaitingCode { .. })
    }
}

/// Issues, delivers and checks confirmation codes.
pub struct Gatekeeper {
    service: Arc<ConfirmationService>,
    gateway: Arc<dyn MessageGateway>,
    recipient: String,
    timeout: Duration,
    policy: GatewayFailurePolicy,
}

impl Gatekeeper {
    pub fn new(
        service: Arc<ConfirmationService>,
        gateway: Arc<dyn MessageGateway>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            service,
            gateway,
            recipient: recipient.into(),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
            policy: GatewayFailurePolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: GatewayFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> GatewayFailurePolicy {
        self.policy
    }

    pub fn service(&self) -> &ConfirmationService {
        &self.service
    }

    /// Send `message` to the configured recipient, waiting at most the
    /// configured timeout. A timeout is reported as a failed delivery.
    pub fn deliver(&self, message: String) -> Delivery {
        let (tx, rx) = mpsc::channel();
        let gateway = Arc::clone(&self.gateway);
        let recipient = self.recipient.clone();

        let spawned = thread::Builder::new()
            .name("roster-delivery".to_string())
            .spawn(move || {
                let delivery = gateway.send(&message, &recipient);
                // Receiver may already have given up.
                let _ = tx.send(delivery);
            });
        if let Err(err) = spawned {
            return Delivery::failed(format!("Could not start delivery: {}", err));
        }

        match rx.recv_timeout(self.timeout) {
            Ok(delivery) => delivery,
            Err(mpsc::RecvTimeoutError::Timeout) => Delivery::failed(format!(
                "Messenger did not respond within {} s",
                self.timeout.as_secs_f32()
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Delivery::failed("Messenger stopped before reporting a result")
            }
        }
    }

    /// Issue and deliver a code confirming an encryption.
    pub fn request_encryption(
        &self,
        record_type: RecordType,
        record_id: Option<u64>,
    ) -> Result<Challenge> {
        self.request(OperationTag::Encrypt, record_id, |code| {
            messages::encryption_code(code, record_type, record_id, &Local::now())
        })
    }

    /// Issue and deliver a code confirming a decryption.
    pub fn request_decryption(&self, record_id: Option<u64>) -> Result<Challenge> {
        self.request(OperationTag::Decrypt, record_id, |code| {
            messages::decryption_code(code, record_id, &Local::now())
        })
    }

    fn request<F>(&self, tag: OperationTag, record_id: Option<u64>, render: F) -> Result<Challenge>
    where
        F: FnOnce(&str) -> String,
    {
        self.service.cleanup_expired()?;
        let code = self.service.generate_code(tag, record_id)?;
        let delivery = self.deliver(render(&code));

        if delivery.success {
            debug!(%tag, "confirmation code delivered");
            return Ok(Challenge::AwaitingCode {
                info: delivery.info,
            });
        }

        // Undelivered codes must not stay redeemable.
        self.service.revoke(&code)?;
        match self.policy {
            GatewayFailurePolicy::Abort => {
                warn!(%tag, info = %delivery.info, "code delivery failed, aborting");
                Err(RosterError::Delivery(delivery.info))
            }
            GatewayFailurePolicy::ProceedUnconfirmed => {
                warn!(%tag, info = %delivery.info, "code delivery failed, proceeding unconfirmed");
                Ok(Challenge::Unconfirmed {
                    reason: delivery.info,
                })
            }
        }
    }

    /// Verify a code the user entered. Returns the record id bound at issue.
    pub fn confirm(&self, code: &str, tag: OperationTag) -> Result<Option<u64>> {
        self.service.verify_code(code.trim(), tag)?.into_result(tag)
    }

    /// Send an operation notification. Failures are logged, never raised.
    pub fn notify(&self, operation: &str, status: OperationStatus, details: &str) -> Delivery {
        let delivery = self.deliver(messages::operation_notification(
            operation,
            status,
            details,
            &Local::now(),
        ));
        if delivery.success {
            info!(operation, status = status.as_str(), "operation notification sent");
        } else {
            warn!(operation, info = %delivery.info, "operation notification not delivered");
        }
        delivery
    }

    /// Send the connection-test message.
    pub fn test_connection(&self) -> Delivery {
        self.deliver(messages::CONNECTION_TEST_MESSAGE.to_string())
    }
}
