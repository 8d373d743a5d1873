//! Application context for the Roster CLI.
//!
//! Combines CLI arguments with the lazily-loaded configuration, and builds
//! the store, encryption context and gatekeeper on demand.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::unsync::OnceCell;
use tracing::debug;

use roster_core::gatekeeper::Gatekeeper;
use roster_core::messaging::{DisabledGateway, LogFileGateway, MessageGateway};
use roster_core::{ConfirmationService, EncryptionContext, JsonFileStore};

use crate::cli::Cli;
use crate::config::RosterConfig;
use crate::errors::CliError;
use crate::ui::{warn, UiContext};

use super::password::{read_password, weak_password_warning, PasswordUse};
use super::resolver::{load_config, missing_store_message};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<RosterConfig>,
    gatekeeper: OnceCell<Option<Gatekeeper>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            gatekeeper: OnceCell::new(),
        }
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&RosterConfig> {
        self.config
            .get_or_try_init(|| load_config(self.cli.store.as_deref()))
    }

    /// Store path: `--store` / `ROSTER_STORE` first, then the config file.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.store.as_deref() {
            return Ok(PathBuf::from(path));
        }
        Ok(PathBuf::from(&self.config()?.store.path))
    }

    /// Open the existing record store.
    pub fn open_store(&self) -> anyhow::Result<JsonFileStore> {
        let path = self.store_path()?;
        if !path.exists() {
            return Err(CliError::not_found(
                missing_store_message(&path),
                "Hint: run `roster init` to create it.",
            )
            .into());
        }
        debug!(path = %path.display(), "opening record store");
        Ok(JsonFileStore::new(path))
    }

    /// Ask for the password and derive the session's encryption context.
    pub fn encryption(
        &self,
        ui: &UiContext,
        purpose: PasswordUse,
    ) -> anyhow::Result<EncryptionContext> {
        let policy = self.config()?.crypto.salt_policy()?;
        let password = read_password(purpose)?;
        if let Some(message) = weak_password_warning(&password) {
            if !self.quiet() {
                warn(ui, message);
            }
        }
        Ok(EncryptionContext::initialize(&password, &policy)?)
    }

    /// Gatekeeper for confirmation codes; `None` when the messenger is off.
    pub fn gatekeeper(&self) -> anyhow::Result<Option<&Gatekeeper>> {
        let keeper = self.gatekeeper.get_or_try_init(|| -> anyhow::Result<_> {
            let config = self.config()?;
            if !config.messenger.enabled {
                return Ok(None);
            }
            Ok(Some(build_gatekeeper(config)))
        })?;
        Ok(keeper.as_ref())
    }
}

fn build_gatekeeper(config: &RosterConfig) -> Gatekeeper {
    let messenger = &config.messenger;
    let gateway: Arc<dyn MessageGateway> = match &messenger.log_path {
        Some(path) => Arc::new(LogFileGateway::new(path)),
        None => Arc::new(DisabledGateway),
    };
    Gatekeeper::new(
        Arc::new(ConfirmationService::new()),
        gateway,
        messenger.recipient.clone(),
    )
    .with_timeout(messenger.timeout())
    .with_policy(messenger.failure_policy())
}
