//! One-time confirmation codes.
//!
//! A code is issued for one operation (and optionally one record) and can be
//! redeemed once within its time-to-live. Per code:
//!
//! ```text
//! Issued ──verify(ok)────────► Verified   (removed)
//!        ──verify(too old)───► Expired    (removed)
//!        ──verify(wrong op)──► Mismatched (kept, still Issued)
//! unknown code ──────────────► NotFound   (no change)
//! ```
//!
//! A wrong-operation attempt deliberately does not burn the user's code.

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Result, RosterError};

/// Number of digits in a confirmation code.
pub const CODE_LENGTH: usize = 6;

/// Default code lifetime in minutes.
pub const DEFAULT_TTL_MINUTES: i64 = 10;

/// Redraws allowed when a fresh code collides with a live one.
const MAX_DRAW_ATTEMPTS: usize = 32;

/// Operation a code authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationTag {
    Encrypt,
    Decrypt,
}

impl OperationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationTag {
    type Err = RosterError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "encrypt" => Ok(Self::Encrypt),
            "decrypt" => Ok(Self::Decrypt),
            other => Err(RosterError::InvalidInput(format!(
                "Unknown operation '{}'",
                other
            ))),
        }
    }
}

/// A code waiting to be redeemed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCode {
    pub code: String,
    pub operation: OperationTag,
    pub record_id: Option<u64>,
    pub issued_at: DateTime<Utc>,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Code accepted and consumed.
    Verified { record_id: Option<u64> },
    /// Code was too old; it has been removed.
    Expired,
    /// Code belongs to another operation; it stays valid.
    Mismatched,
    /// Code was never issued or is already gone.
    NotFound,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// Turn a failed outcome into the matching error.
    ///
    /// Returns the record id bound to the code on success.
    pub fn into_result(self, expected: OperationTag) -> Result<Option<u64>> {
        match self {
            Self::Verified { record_id } => Ok(record_id),
            Self::Expired => Err(RosterError::Expired),
            Self::Mismatched => Err(RosterError::Mismatch {
                expected: expected.to_string(),
            }),
            Self::NotFound => Err(RosterError::NotFound(
                "Confirmation code not found or already used".to_string(),
            )),
        }
    }
}

/// Owns the table of live confirmation codes.
///
/// Pass it by handle (`Arc<ConfirmationService>`) to whoever needs it; each
/// instance has its own table.
pub struct ConfirmationService {
    codes: Mutex<HashMap<String, PendingCode>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Default for ConfirmationService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationService {
    /// Service on the wall clock with the default 10-minute TTL.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Service on a caller-provided clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            clock,
            ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
        }
    }

    /// Override the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock_codes(&self) -> Result<MutexGuard<'_, HashMap<String, PendingCode>>> {
        self.codes
            .lock()
            .map_err(|_| RosterError::Internal("Confirmation code table poisoned".to_string()))
    }

    fn is_expired(&self, pending: &PendingCode, now: DateTime<Utc>) -> bool {
        now - pending.issued_at > self.ttl
    }

    /// Issue a fresh code for `operation`.
    ///
    /// Digits come from the operating system's CSPRNG.
    pub fn generate_code(&self, operation: OperationTag, record_id: Option<u64>) -> Result<String> {
        let mut codes = self.lock_codes()?;

        let code = (0..MAX_DRAW_ATTEMPTS)
            .map(|_| draw_code())
            .find(|candidate| !codes.contains_key(candidate))
            .ok_or_else(|| {
                RosterError::Internal("Could not draw an unused confirmation code".to_string())
            })?;

        codes.insert(
            code.clone(),
            PendingCode {
                code: code.clone(),
                operation,
                record_id,
                issued_at: self.clock.now(),
            },
        );
        info!(%operation, ?record_id, "confirmation code issued");

        Ok(code)
    }

    /// Check `code` against the operation the caller is about to perform.
    pub fn verify_code(&self, code: &str, expected: OperationTag) -> Result<Verification> {
        let mut codes = self.lock_codes()?;
        let now = self.clock.now();

        let state = codes
            .get(code)
            .map(|pending| (self.is_expired(pending, now), pending.operation == expected));
        let outcome = match state {
            None => Verification::NotFound,
            Some((true, _)) => {
                codes.remove(code);
                Verification::Expired
            }
            Some((false, false)) => Verification::Mismatched,
            Some((false, true)) => Verification::Verified {
                record_id: codes.remove(code).and_then(|pending| pending.record_id),
            },
        };
        debug!(%expected, ?outcome, "confirmation code checked");

        Ok(outcome)
    }

    /// Drop every code older than the TTL. Returns how many were removed.
    pub fn cleanup_expired(&self) -> Result<usize> {
        let mut codes = self.lock_codes()?;
        let now = self.clock.now();

        let before = codes.len();
        codes.retain(|_, pending| !self.is_expired(pending, now));
        let removed = before - codes.len();
        if removed > 0 {
            debug!(removed, "expired confirmation codes swept");
        }

        Ok(removed)
    }

    /// Withdraw a live code without verifying it. Returns whether it existed.
    pub fn revoke(&self, code: &str) -> Result<bool> {
        let removed = self.lock_codes()?.remove(code).is_some();
        if removed {
            debug!("confirmation code revoked");
        }
        Ok(removed)
    }

    /// Number of codes currently tracked, expired or not.
    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.lock_codes()?.len())
    }
}

fn draw_code() -> String {
    let mut rng = OsRng;
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_clock() -> (ConfirmationService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let service = ConfirmationService::with_clock(clock.clone());
        (service, clock)
    }

    #[test]
    fn test_poisoned_table_is_internal_error() {
        let service = Arc::new(ConfirmationService::new());
        let poisoner = Arc::clone(&service);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.codes.lock().unwrap();
            panic!("poison the code table");
        })
        .join();

        assert!(matches!(
            service.generate_code(OperationTag::Encrypt, None),
            Err(RosterError::Internal(_))
        ));
        assert!(matches!(
            service.verify_code("123456", OperationTag::Encrypt),
            Err(RosterError::Internal(_))
        ));
    }

    #[test]
    fn test_code_format() {
        let service = ConfirmationService::new();
        let code = service.generate_code(OperationTag::Encrypt, None).unwrap();

        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_verify_once_then_not_found() {
        let service = ConfirmationService::new();
        let code = service.generate_code(OperationTag::Encrypt, None).unwrap();

        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::Verified { record_id: None }
        );
        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::NotFound
        );
    }

    #[test]
    fn test_verified_returns_bound_record_id() {
        let service = ConfirmationService::new();
        let code = service
            .generate_code(OperationTag::Decrypt, Some(42))
            .unwrap();

        let outcome = service.verify_code(&code, OperationTag::Decrypt).unwrap();
        assert_eq!(outcome, Verification::Verified { record_id: Some(42) });
        assert_eq!(outcome.into_result(OperationTag::Decrypt).unwrap(), Some(42));
    }

    #[test]
    fn test_mismatch_keeps_code_alive() {
        let service = ConfirmationService::new();
        let code = service.generate_code(OperationTag::Decrypt, None).unwrap();

        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::Mismatched
        );
        assert_eq!(service.pending_count().unwrap(), 1);
        assert!(service
            .verify_code(&code, OperationTag::Decrypt)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn test_expired_code_removed_then_not_found() {
        let (service, clock) = service_with_clock();
        let code = service.generate_code(OperationTag::Encrypt, None).unwrap();

        clock.advance(Duration::minutes(DEFAULT_TTL_MINUTES) + Duration::seconds(1));

        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::Expired
        );
        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::NotFound
        );
    }

    #[test]
    fn test_code_valid_at_exact_ttl() {
        let (service, clock) = service_with_clock();
        let code = service.generate_code(OperationTag::Encrypt, None).unwrap();

        clock.advance(Duration::minutes(DEFAULT_TTL_MINUTES));

        assert!(service
            .verify_code(&code, OperationTag::Encrypt)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn test_expiry_checked_before_operation() {
        let (service, clock) = service_with_clock();
        let code = service.generate_code(OperationTag::Decrypt, None).unwrap();

        clock.advance(Duration::minutes(11));

        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::Expired
        );
        assert_eq!(service.pending_count().unwrap(), 0);
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let (service, clock) = service_with_clock();
        service.generate_code(OperationTag::Encrypt, None).unwrap();
        service.generate_code(OperationTag::Decrypt, Some(1)).unwrap();

        clock.advance(Duration::minutes(8));
        let fresh = service.generate_code(OperationTag::Encrypt, None).unwrap();
        clock.advance(Duration::minutes(3));

        assert_eq!(service.cleanup_expired().unwrap(), 2);
        assert_eq!(service.pending_count().unwrap(), 1);
        assert!(service
            .verify_code(&fresh, OperationTag::Encrypt)
            .unwrap()
            .is_verified());
    }

    #[test]
    fn test_revoke_withdraws_code() {
        let (service, _clock) = service_with_clock();
        let code = service.generate_code(OperationTag::Decrypt, Some(2)).unwrap();

        assert!(service.revoke(&code).unwrap());
        assert!(!service.revoke(&code).unwrap());
        assert_eq!(
            service.verify_code(&code, OperationTag::Decrypt).unwrap(),
            Verification::NotFound
        );
    }

    #[test]
    fn test_custom_ttl() {
        let (service, clock) = service_with_clock();
        let service = service.with_ttl(Duration::seconds(30));
        let code = service.generate_code(OperationTag::Encrypt, None).unwrap();

        clock.advance(Duration::seconds(31));
        assert_eq!(
            service.verify_code(&code, OperationTag::Encrypt).unwrap(),
            Verification::Expired
        );
    }

    #[test]
    fn test_unknown_code_not_found() {
        let service = ConfirmationService::new();
        assert_eq!(
            service.verify_code("000000", OperationTag::Encrypt).unwrap(),
            Verification::NotFound
        );
    }

    #[test]
    fn test_into_result_maps_errors() {
        assert!(matches!(
            Verification::Expired.into_result(OperationTag::Encrypt),
            Err(RosterError::Expired)
        ));
        assert!(matches!(
            Verification::Mismatched.into_result(OperationTag::Encrypt),
            Err(RosterError::Mismatch { .. })
        ));
        assert!(matches!(
            Verification::NotFound.into_result(OperationTag::Encrypt),
            Err(RosterError::NotFound(_))
        ));
    }

    #[test]
    fn test_live_codes_are_distinct() {
        let service = ConfirmationService::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let code = service.generate_code(OperationTag::Encrypt, None).unwrap();
            assert!(seen.insert(code));
        }
        assert_eq!(service.pending_count().unwrap(), 200);
    }

    #[test]
    fn test_operation_tag_parse() {
        assert_eq!("encrypt".parse::<OperationTag>().unwrap(), OperationTag::Encrypt);
        assert!("export".parse::<OperationTag>().is_err());
    }
}
