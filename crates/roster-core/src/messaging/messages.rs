//! Texts sent through a [`MessageGateway`](super::MessageGateway).
//!
//! Every builder takes the timestamp explicitly so output is reproducible.

use chrono::{DateTime, TimeZone};

use crate::storage::RecordType;

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Line prefix carrying the confirmation code in code messages.
pub const CODE_LINE_PREFIX: &str = "Confirmation code: ";

/// Body of the connection-test message.
pub const CONNECTION_TEST_MESSAGE: &str = "Test message from the personal data protection tool";

/// Outcome reported in an operation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    Success,
    Failure,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            Self::Success => "[OK]",
            Self::Failure => "[FAILED]",
        }
    }
}

fn record_ref(record_id: Option<u64>) -> String {
    record_id.map_or_else(|| "N/A".to_string(), |id| id.to_string())
}

/// Message carrying the code that confirms an encryption.
pub fn encryption_code<Tz: TimeZone>(
    code: &str,
    record_type: RecordType,
    record_id: Option<u64>,
    at: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "ENCRYPTION CONFIRMATION CODE\n\n\
         Record type: {}\n\
         Record ID: {}\n\
         {}{}\n\n\
         Time: {}\n\n\
         Keep this code to confirm the operation.",
        record_type,
        record_ref(record_id),
        CODE_LINE_PREFIX,
        code,
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Message carrying the code that confirms a decryption.
pub fn decryption_code<Tz: TimeZone>(code: &str, record_id: Option<u64>, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "DECRYPTION CONFIRMATION CODE\n\n\
         Record ID: {}\n\
         {}{}\n\n\
         Time: {}\n\n\
         Keep this code to confirm the operation.",
        record_ref(record_id),
        CODE_LINE_PREFIX,
        code,
        at.format(TIMESTAMP_FORMAT)
    )
}

/// Notification sent after an operation completes or fails.
pub fn operation_notification<Tz: TimeZone>(
    operation: &str,
    status: OperationStatus,
    details: &str,
    at: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut message = format!(
        "{} OPERATION NOTIFICATION\n\nOperation: {}\nStatus: {}\n",
        status.marker(),
        operation,
        status.as_str()
    );
    if !details.is_empty() {
        message.push_str(details);
        message.push('\n');
    }
    message.push_str(&format!("\nTime: {}", at.format(TIMESTAMP_FORMAT)));
    message
}

/// Pull the confirmation code back out of a code message.
pub fn extract_code(message: &str) -> Option<&str> {
    message
        .lines()
        .find_map(|line| line.trim().strip_prefix(CODE_LINE_PREFIX))
        .map(str::trim)
}
