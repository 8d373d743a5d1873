use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Duration;
use roster_core::gatekeeper::{Challenge, Gatekeeper};
use roster_core::messaging::log_file::read_log;
use roster_core::messaging::messages::extract_code;
use roster_core::messaging::LogFileGateway;
use roster_core::otp::{ConfirmationService, ManualClock, OperationTag};
use roster_core::storage::RecordType;
use roster_core::RosterError;

struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be available")
            .as_nanos();
        let filename = format!("{}_{}_{}.jsonl", prefix, std::process::id(), nanos);
        let path = std::env::temp_dir().join(filename);
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn last_logged_code(path: &Path) -> String {
    let logged = read_log(path).expect("log should be readable");
    let last = logged.last().expect("a message should be logged");
    extract_code(&last.message)
        .expect("message should carry a code")
        .to_string()
}

#[test]
fn test_code_delivered_through_log_file_is_redeemable_once() {
    let log = TempFile::new("roster_flow_once");
    let keeper = Gatekeeper::new(
        Arc::new(ConfirmationService::new()),
        Arc::new(LogFileGateway::new(&log.path)),
        "+70000000000",
    );

    let challenge = keeper
        .request_encryption(RecordType::Student, None)
        .expect("request should succeed");
    assert!(matches!(challenge, Challenge::AwaitingCode { .. }));

    let code = last_logged_code(&log.path);
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    keeper
        .confirm(&code, OperationTag::Encrypt)
        .expect("first use should verify");
    assert!(matches!(
        keeper.confirm(&code, OperationTag::Encrypt),
        Err(RosterError::NotFound(_))
    ));
}

#[test]
fn test_wrong_operation_keeps_code_then_expiry_removes_it() {
    let log = TempFile::new("roster_flow_expiry");
    let clock = Arc::new(ManualClock::default());
    let service = Arc::new(ConfirmationService::with_clock(clock.clone()));
    let keeper = Gatekeeper::new(
        Arc::clone(&service),
        Arc::new(LogFileGateway::new(&log.path)),
        "+70000000000",
    );

    keeper
        .request_decryption(Some(3))
        .expect("request should succeed");
    let code = last_logged_code(&log.path);

    assert!(matches!(
        keeper.confirm(&code, OperationTag::Encrypt),
        Err(RosterError::Mismatch { .. })
    ));
    assert_eq!(service.pending_count().expect("count"), 1);

    clock.advance(Duration::minutes(11));
    assert!(matches!(
        keeper.confirm(&code, OperationTag::Decrypt),
        Err(RosterError::Expired)
    ));
    assert!(matches!(
        keeper.confirm(&code, OperationTag::Decrypt),
        Err(RosterError::NotFound(_))
    ));
}

#[test]
fn test_new_request_sweeps_expired_codes() {
    let log = TempFile::new("roster_flow_sweep");
    let clock = Arc::new(ManualClock::default());
    let service = Arc::new(ConfirmationService::with_clock(clock.clone()));
    let keeper = Gatekeeper::new(
        Arc::clone(&service),
        Arc::new(LogFileGateway::new(&log.path)),
        "+70000000000",
    );

    keeper.request_decryption(Some(1)).expect("first request");
    clock.advance(Duration::minutes(15));
    keeper.request_decryption(Some(2)).expect("second request");

    assert_eq!(service.pending_count().expect("count"), 1);
    let code = last_logged_code(&log.path);
    assert_eq!(
        keeper
            .confirm(&code, OperationTag::Decrypt)
            .expect("fresh code should verify"),
        Some(2)
    );
}
