use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub team: TeamConfig,
    #[serde(default)]
    pub kanban: KanbanConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per namespace
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Simulated round trip for login and signup
    #[serde(default = "default_auth_latency_ms")]
    pub latency_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_auth_latency_ms(),
        }
    }
}

impl AuthConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

fn default_auth_latency_ms() -> u64 {
    800
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    #[serde(default = "default_invite_latency_ms")]
    pub invite_latency_ms: u64,
    #[serde(default = "default_notify_latency_ms")]
    pub notify_latency_ms: u64,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            invite_latency_ms: default_invite_latency_ms(),
            notify_latency_ms: default_notify_latency_ms(),
        }
    }
}

impl TeamConfig {
    pub fn invite_latency(&self) -> Duration {
        Duration::from_millis(self.invite_latency_ms)
    }

    pub fn notify_latency(&self) -> Duration {
        Duration::from_millis(self.notify_latency_ms)
    }
}

fn default_invite_latency_ms() -> u64 {
    1000
}

fn default_notify_latency_ms() -> u64 {
    500
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KanbanConfig {
    #[serde(default)]
    pub transition_policy: TransitionPolicyKind,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionPolicyKind {
    #[default]
    Unrestricted,
    ForwardOnly,
    CompletedIsTerminal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Install the demo workspace on first login
    #[serde(default = "default_demo_data")]
    pub demo_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            demo_data: default_demo_data(),
        }
    }
}

fn default_demo_data() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    /// Zero latencies and no demo data, for tests and scripted use
    pub fn instant() -> Self {
        let mut config = Config::default();
        config.auth.latency_ms = 0;
        config.team.invite_latency_ms = 0;
        config.team.notify_latency_ms = 0;
        config.seed.demo_data = false;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(config.auth.latency(), Duration::from_millis(800));
        assert_eq!(config.team.invite_latency_ms, 1000);
        assert_eq!(config.team.notify_latency_ms, 500);
        assert_eq!(
            config.kanban.transition_policy,
            TransitionPolicyKind::Unrestricted
        );
        assert!(config.seed.demo_data);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[kanban]\ntransition_policy = \"completed-is-terminal\"\n\n[auth]\nlatency_ms = 0"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(
            config.kanban.transition_policy,
            TransitionPolicyKind::CompletedIsTerminal
        );
        assert!(config.auth.latency().is_zero());
        assert_eq!(config.team.invite_latency_ms, 1000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("taskflow.toml")).unwrap();
        assert_eq!(config.auth.latency_ms, 800);
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[kanban]\ntransition_policy = \"sideways\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
