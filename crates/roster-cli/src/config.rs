use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use roster_core::gatekeeper::{GatewayFailurePolicy, DEFAULT_DELIVERY_TIMEOUT};
use roster_core::SaltPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub store: StoreSection,
    #[serde(default)]
    pub crypto: CryptoSection,
    #[serde(default)]
    pub messenger: MessengerSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CryptoSection {
    #[serde(default)]
    pub salt: SaltMode,
    /// Hex-encoded salt, required when `salt = "deployment"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_salt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessengerSection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub recipient: String,
    /// Messages are appended here as JSON lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub on_failure: FailureMode,
}

impl Default for MessengerSection {
    fn default() -> Self {
        Self {
            enabled: false,
            recipient: String::new(),
            log_path: None,
            timeout_seconds: default_timeout_seconds(),
            on_failure: FailureMode::default(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_DELIVERY_TIMEOUT.as_secs()
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SaltMode {
    #[default]
    Embedded,
    Deployment,
    PerRecord,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    #[default]
    Abort,
    Proceed,
}

impl RosterConfig {
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store: StoreSection {
                path: store_path.to_string_lossy().to_string(),
            },
            crypto: CryptoSection::default(),
            messenger: MessengerSection::default(),
        }
    }
}

impl CryptoSection {
    /// Build the core salt policy from this section.
    pub fn salt_policy(&self) -> anyhow::Result<SaltPolicy> {
        match self.salt {
            SaltMode::Embedded => Ok(SaltPolicy::Embedded),
            SaltMode::PerRecord => Ok(SaltPolicy::PerRecord),
            SaltMode::Deployment => {
                let encoded = self.deployment_salt.as_deref().ok_or_else(|| {
                    anyhow::anyhow!("crypto.deployment_salt is required when salt = \"deployment\"")
                })?;
                let salt = hex::decode(encoded.trim())
                    .map_err(|e| anyhow::anyhow!("crypto.deployment_salt is not valid hex: {}", e))?;
                Ok(SaltPolicy::Deployment(salt))
            }
        }
    }
}

impl MessengerSection {
    pub fn failure_policy(&self) -> GatewayFailurePolicy {
        match self.on_failure {
            FailureMode::Abort => GatewayFailurePolicy::Abort,
            FailureMode::Proceed => GatewayFailurePolicy::ProceedUnconfirmed,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_store_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("records.json"))
}

pub fn default_message_log_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("messages.jsonl"))
}

pub fn read_config(path: &Path) -> anyhow::Result<RosterConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &RosterConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("roster"));
        }
    }
    Ok(home_dir()?.join(".config").join("roster"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("roster"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("roster"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roster").join("config.toml");

        let mut config = RosterConfig::new(dir.path().join("records.json"));
        config.crypto.salt = SaltMode::Deployment;
        config.crypto.deployment_salt = Some("00112233445566778899aabbccddeeff".to_string());
        config.messenger.enabled = true;
        config.messenger.recipient = "+70000000000".to_string();
        config.messenger.log_path = Some("/tmp/messages.jsonl".to_string());
        config.messenger.on_failure = FailureMode::Proceed;

        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: RosterConfig = toml::from_str("[store]\npath = \"/data/records.json\"\n").unwrap();

        assert_eq!(config.crypto.salt, SaltMode::Embedded);
        assert!(!config.messenger.enabled);
        assert_eq!(config.messenger.timeout_seconds, 10);
        assert_eq!(config.messenger.failure_policy(), GatewayFailurePolicy::Abort);
    }

    #[test]
    fn test_salt_policy_from_section() {
        let mut crypto = CryptoSection::default();
        assert_eq!(crypto.salt_policy().unwrap(), SaltPolicy::Embedded);

        crypto.salt = SaltMode::Deployment;
        assert!(crypto.salt_policy().is_err());

        crypto.deployment_salt = Some("zz".to_string());
        assert!(crypto.salt_policy().is_err());

        crypto.deployment_salt = Some("0011".to_string());
        assert_eq!(
            crypto.salt_policy().unwrap(),
            SaltPolicy::Deployment(vec![0x00, 0x11])
        );

        crypto.salt = SaltMode::PerRecord;
        assert_eq!(crypto.salt_policy().unwrap(), SaltPolicy::PerRecord);
    }

    #[test]
    fn test_timeout_never_zero() {
        let messenger = MessengerSection {
            timeout_seconds: 0,
            ..MessengerSection::default()
        };
        assert_eq!(messenger.timeout(), Duration::from_secs(1));
    }
}
