use std::path::PathBuf;

use roster_core::crypto::generate_salt;
use roster_core::JsonFileStore;

use crate::app::resolve_config_path;
use crate::cli::{Cli, InitArgs};
use crate::config::{
    default_message_log_path, default_store_path, write_config, FailureMode, RosterConfig,
    SaltMode,
};
use crate::errors::CliError;
use crate::ui::{hint, print, receipt, UiContext};

pub fn handle_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        ))
        .into());
    }

    let store_path = match args.path.as_deref().or(cli.store.as_deref()) {
        Some(path) => PathBuf::from(path),
        None => default_store_path()?,
    };

    let mut config = RosterConfig::new(store_path.clone());
    config.crypto.salt = args.salt;
    if args.salt == SaltMode::Deployment {
        config.crypto.deployment_salt = Some(hex::encode(generate_salt()));
    }

    if args.recipient.is_some() || args.log_path.is_some() {
        let log_path = match args.log_path.as_deref() {
            Some(path) => PathBuf::from(path),
            None => default_message_log_path()?,
        };
        config.messenger.enabled = true;
        config.messenger.recipient = args.recipient.clone().unwrap_or_default();
        config.messenger.log_path = Some(log_path.to_string_lossy().to_string());
    }
    if args.proceed_on_failure {
        config.messenger.on_failure = FailureMode::Proceed;
    }

    write_config(&config_path, &config)?;
    JsonFileStore::open(&store_path)?;

    if !cli.quiet {
        let ui = UiContext::from_env(false);
        let config_display = config_path.display().to_string();
        let store_display = store_path.display().to_string();
        let messenger = if config.messenger.enabled {
            "enabled"
        } else {
            "disabled"
        };
        print(
            &ui,
            &receipt(
                &ui,
                "Initialized roster",
                &[
                    ("Config", config_display.as_str()),
                    ("Store", store_display.as_str()),
                    ("Salt", salt_label(args.salt)),
                    ("Messenger", messenger),
                ],
            ),
        );
        if args.salt == SaltMode::Deployment {
            print(
                &ui,
                &hint(
                    &ui,
                    "back up the config file; the deployment salt is needed to decrypt",
                ),
            );
        }
    }
    Ok(())
}

fn salt_label(mode: SaltMode) -> &'static str {
    match mode {
        SaltMode::Embedded => "embedded",
        SaltMode::Deployment => "deployment",
        SaltMode::PerRecord => "per_record",
    }
}
