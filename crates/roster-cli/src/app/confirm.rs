//! Confirmation codes around encrypt and decrypt operations.
//!
//! When the messenger is enabled, a code is issued and delivered before the
//! operation runs; the user must type it back (or pipe it on stdin) in the
//! same run. When it is disabled, operations run unconfirmed.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;

use roster_core::gatekeeper::Challenge;
use roster_core::messaging::messages::OperationStatus;
use roster_core::{OperationTag, RecordType, RosterError};

use crate::errors::CliError;
use crate::ui::{warn, UiContext};

use super::context::AppContext;

/// A sensitive operation that needs confirmation.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    Encrypt {
        record_type: RecordType,
        record_id: Option<u64>,
    },
    Decrypt {
        record_id: Option<u64>,
    },
}

impl Operation {
    fn tag(&self) -> OperationTag {
        match self {
            Self::Encrypt { .. } => OperationTag::Encrypt,
            Self::Decrypt { .. } => OperationTag::Decrypt,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Encrypt { .. } => "encryption",
            Self::Decrypt { .. } => "decryption",
        }
    }
}

fn read_code() -> anyhow::Result<String> {
    let code = if io::stdin().is_terminal() {
        Input::<String>::new()
            .with_prompt("Confirmation code")
            .interact_text()
            .map_err(|e| anyhow::anyhow!("Failed to read confirmation code: {}", e))?
    } else {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        line
    };

    let code = code.trim().to_string();
    if code.is_empty() {
        return Err(CliError::ConfirmationFailed("No confirmation code entered".into()).into());
    }
    Ok(code)
}

/// An unknown code is a failed confirmation here, not a missing record.
fn rejected_code(err: RosterError) -> anyhow::Error {
    match err {
        RosterError::NotFound(_) => {
            CliError::ConfirmationFailed("Invalid or already used confirmation code".into())
                .into()
        }
        other => other.into(),
    }
}

impl AppContext<'_> {
    /// Issue, deliver and verify a code for `operation`.
    pub fn confirm(&self, ui: &UiContext, operation: Operation) -> anyhow::Result<()> {
        let Some(keeper) = self.gatekeeper()? else {
            return Ok(());
        };

        let challenge = match operation {
            Operation::Encrypt {
                record_type,
                record_id,
            } => keeper.request_encryption(record_type, record_id)?,
            Operation::Decrypt { record_id } => keeper.request_decryption(record_id)?,
        };

        match challenge {
            Challenge::AwaitingCode { info } => {
                if !self.quiet() {
                    eprintln!("Confirmation code sent ({})", info);
                }
                let code = read_code()?;
                keeper
                    .confirm(&code, operation.tag())
                    .map_err(rejected_code)?;
                if !self.quiet() {
                    eprintln!("Code confirmed");
                }
            }
            Challenge::Unconfirmed { reason } => {
                warn(
                    ui,
                    &format!(
                        "Code not delivered ({}); continuing {} without confirmation",
                        reason,
                        operation.label()
                    ),
                );
            }
        }
        Ok(())
    }

    /// Report the outcome of an operation through the messenger, if enabled.
    pub fn notify(&self, operation: &str, status: OperationStatus, details: &str) {
        match self.gatekeeper() {
            Ok(Some(keeper)) => {
                keeper.notify(operation, status, details);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "notification skipped"),
        }
    }
}
