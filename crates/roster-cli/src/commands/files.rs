use std::path::Path;

use crate::app::{AppContext, PasswordUse};
use crate::cli::{ExportArgs, FileArgs};
use crate::errors::CliError;
use crate::ui::{print, receipt, UiContext};

fn ensure_input(path: &Path) -> anyhow::Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(CliError::not_found(
            format!("Input file {} not found", path.display()),
            "Hint: check the path and try again.",
        )
        .into())
    }
}

fn ensure_distinct(input: &Path, output: &Path) -> anyhow::Result<()> {
    if input == output {
        return Err(CliError::invalid_input("Input and output must be different files").into());
    }
    Ok(())
}

pub fn handle_seal(ctx: &AppContext, args: &FileArgs) -> anyhow::Result<()> {
    let input = Path::new(&args.input);
    let output = Path::new(&args.output);
    ensure_input(input)?;
    ensure_distinct(input, output)?;

    let ui = UiContext::from_env(false);
    let encryption = ctx.encryption(&ui, PasswordUse::Encrypt)?;
    encryption.encrypt_file(input, output)?;

    if !ctx.quiet() {
        print(
            &ui,
            &receipt(&ui, "File sealed", &[("Output", args.output.as_str())]),
        );
    }
    Ok(())
}

pub fn handle_unseal(ctx: &AppContext, args: &FileArgs) -> anyhow::Result<()> {
    let input = Path::new(&args.input);
    let output = Path::new(&args.output);
    ensure_input(input)?;
    ensure_distinct(input, output)?;

    let ui = UiContext::from_env(false);
    let encryption = ctx.encryption(&ui, PasswordUse::Decrypt)?;
    encryption.decrypt_file(input, output)?;

    if !ctx.quiet() {
        print(
            &ui,
            &receipt(&ui, "File unsealed", &[("Output", args.output.as_str())]),
        );
    }
    Ok(())
}

/// Copy the store file as-is. Records stay encrypted in the copy.
pub fn handle_export(ctx: &AppContext, args: &ExportArgs) -> anyhow::Result<()> {
    let source = ctx.open_store()?.path().to_path_buf();
    let count = std::fs::copy(&source, &args.destination).map_err(|e| {
        anyhow::anyhow!(
            "Failed to copy store from {} to {}: {}",
            source.display(),
            args.destination,
            e
        )
    })?;
    if count == 0 {
        return Err(anyhow::anyhow!("Export failed: zero bytes written"));
    }

    if !ctx.quiet() {
        let ui = UiContext::from_env(false);
        print(
            &ui,
            &receipt(
                &ui,
                "Store exported",
                &[("Destination", args.destination.as_str())],
            ),
        );
    }
    Ok(())
}
