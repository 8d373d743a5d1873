use crate::app::{AppContext, Operation, PasswordUse};
use crate::cli::DecryptTextArgs;
use crate::errors::CliError;
use crate::ui::{kv, UiContext};

/// Decrypt an envelope pasted on the command line. Nothing touches the store.
pub fn handle_decrypt_text(ctx: &AppContext, args: &DecryptTextArgs) -> anyhow::Result<()> {
    let ciphertext = args.ciphertext.trim();
    if ciphertext.is_empty() {
        return Err(CliError::invalid_input("Ciphertext cannot be empty").into());
    }

    let ui = UiContext::from_env(args.json);
    let encryption = ctx.encryption(&ui, PasswordUse::Decrypt)?;
    ctx.confirm(&ui, Operation::Decrypt { record_id: None })?;
    let fields = encryption.decrypt(ciphertext)?;

    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&fields)?);
    } else {
        for (key, value) in &fields {
            println!("{}", kv(&ui, key, value));
        }
    }
    Ok(())
}
