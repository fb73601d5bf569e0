use crate::adapters::memory::PlatformSnapshot;
use crate::config::settings::ImportSettings;
use crate::core::report::ReportFormat;
use crate::domain::model::NetworkSettings;
use crate::domain::ports::{ConfigProvider, Storage};
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub import: ImportSettings,
    pub network: Option<NetworkSettings>,
    pub platform: Option<PlatformConfig>,
    pub report: Option<ReportConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// JSON snapshot backing the in-memory platform.
    pub snapshot: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub format: Option<ReportFormat>,
    pub output: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${IMPORT_PASSWORD})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn snapshot_path(&self) -> Option<&str> {
        self.platform.as_ref().and_then(|p| p.snapshot.as_deref())
    }

    pub fn report_format(&self) -> ReportFormat {
        self.report
            .as_ref()
            .and_then(|r| r.format)
            .unwrap_or_default()
    }

    pub fn report_output(&self) -> Option<&str> {
        self.report.as_ref().and_then(|r| r.output.as_deref())
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    /// 載入平台快照；`[network]` 有設定時覆蓋快照內的網路設定
    pub fn load_snapshot<S: Storage>(&self, storage: &S, path: Option<&str>) -> Result<PlatformSnapshot> {
        let mut snapshot = match (path, &self.network) {
            (Some(path), _) => PlatformSnapshot::load(storage, path)?,
            (None, Some(network)) => {
                tracing::warn!("No platform snapshot given, starting from an empty network");
                PlatformSnapshot::new(network.clone())
            }
            (None, None) => {
                return Err(ImportError::MissingConfigError {
                    field: "platform.snapshot".to_string(),
                })
            }
        };

        if let Some(network) = &self.network {
            if snapshot.network != *network {
                tracing::info!(
                    "Using [network] from config ({}{}, subdomain_install = {}) over the snapshot's",
                    network.base_domain,
                    network.base_path,
                    network.subdomain_install
                );
                snapshot.network = network.clone();
            }
        }

        snapshot.network.validate()?;
        Ok(snapshot)
    }
}

impl ConfigProvider for TomlConfig {
    fn max_rows(&self) -> usize {
        self.import.max_rows
    }

    fn reserved_words(&self) -> &[String] {
        &self.import.reserved_words
    }

    fn default_role(&self) -> &str {
        &self.import.default_role
    }

    fn placeholder_password(&self) -> &str {
        &self.import.placeholder_password
    }

    fn public_sites(&self) -> bool {
        self.import.public_sites
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.import.validate()?;

        if let Some(network) = &self.network {
            network.validate()?;
        }

        if let Some(platform) = &self.platform {
            let snapshot = validation::validate_required_field("platform.snapshot", &platform.snapshot)?;
            validation::validate_path("platform.snapshot", snapshot)?;
        }

        if let Some(output) = self.report_output() {
            validation::validate_path("report.output", output)?;
        }

        if self.import.placeholder_password.starts_with("${") {
            return Err(ImportError::ConfigValidationError {
                field: "import.placeholder_password".to_string(),
                message: format!(
                    "environment variable {} is not set",
                    self.import.placeholder_password
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[import]
max_rows = 5
reserved_words = ["page", "wp-admin"]
default_role = "editor"

[network]
base_domain = "example.com"
base_path = "/"
subdomain_install = true

[report]
format = "json"
output = "report.json"
"#;

    #[test]
    fn test_parse_sample() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.max_rows(), 5);
        assert_eq!(config.default_role(), "editor");
        // unspecified keys keep their defaults
        assert_eq!(config.placeholder_password(), "changeme");
        assert!(config.public_sites());
        assert!(config.network.as_ref().unwrap().subdomain_install);
        assert_eq!(config.report_format(), ReportFormat::Json);
        assert_eq!(config.report_output(), Some("report.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.max_rows(), 20);
        assert_eq!(config.report_format(), ReportFormat::Text);
        assert!(config.snapshot_path().is_none());
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("BULK_IMPORT_TEST_PASSWORD", "s3cret");
        let config = TomlConfig::from_toml_str(
            "[import]\nplaceholder_password = \"${BULK_IMPORT_TEST_PASSWORD}\"\n",
        )
        .unwrap();
        assert_eq!(config.placeholder_password(), "s3cret");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let config = TomlConfig::from_toml_str(
            "[import]\nplaceholder_password = \"${BULK_IMPORT_SURELY_UNSET_VAR}\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_network_is_rejected() {
        let config = TomlConfig::from_toml_str(
            "[network]\nbase_domain = \"https://example.com\"\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_network_section_overrides_snapshot() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("platform.json"),
            r#"{"network": {"base_domain": "example.com", "base_path": "/", "subdomain_install": false}}"#,
        )
        .unwrap();
        let storage = crate::adapters::storage::LocalStorage::new(
            temp_dir.path().to_str().unwrap().to_string(),
        );

        let config = TomlConfig::from_toml_str(
            "[network]\nbase_domain = \"example.com\"\nsubdomain_install = true\n",
        )
        .unwrap();
        let snapshot = config.load_snapshot(&storage, Some("platform.json")).unwrap();
        assert!(snapshot.network.subdomain_install);

        let without_network = TomlConfig::default();
        let snapshot = without_network.load_snapshot(&storage, Some("platform.json")).unwrap();
        assert!(!snapshot.network.subdomain_install);
    }

    #[test]
    fn test_load_snapshot_needs_a_source() {
        let storage = crate::adapters::storage::LocalStorage::new(".".to_string());
        assert!(matches!(
            TomlConfig::default().load_snapshot(&storage, None),
            Err(ImportError::MissingConfigError { .. })
        ));

        let config = TomlConfig::from_toml_str("[network]\nbase_domain = \"example.com\"\n").unwrap();
        let snapshot = config.load_snapshot(&storage, None).unwrap();
        assert_eq!(snapshot.network.base_path, "/");
        assert!(snapshot.sites.is_empty());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[import\nmax_rows = 1"),
            Err(ImportError::ConfigValidationError { .. })
        ));
    }
}
