use crate::app::AppContext;
use crate::errors::CliError;
use crate::ui::{print, receipt, UiContext};

/// Send the connection-test message through the configured messenger.
pub fn handle_test(ctx: &AppContext) -> anyhow::Result<()> {
    let keeper = ctx.gatekeeper()?.ok_or_else(|| {
        CliError::invalid_input("Messenger is not configured; run `roster init --recipient <R>`")
    })?;

    let delivery = keeper.test_connection();
    if !delivery.success {
        return Err(CliError::ConfirmationFailed(format!(
            "Test message not delivered: {}",
            delivery.info
        ))
        .into());
    }

    if !ctx.quiet() {
        let ui = UiContext::from_env(false);
        print(
            &ui,
            &receipt(
                &ui,
                "Test message sent",
                &[
                    ("Recipient", ctx.config()?.messenger.recipient.as_str()),
                    ("Info", delivery.info.as_str()),
                ],
            ),
        );
    }
    Ok(())
}
