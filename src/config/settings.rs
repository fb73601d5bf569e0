use crate::core::parser::DEFAULT_MAX_ROWS;
use crate::core::site_provisioner::DEFAULT_RESERVED_WORDS;
use crate::domain::model::NetworkSettings;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

/// `[import]` section: knobs the importer reads at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub max_rows: usize,
    pub reserved_words: Vec<String>,
    pub default_role: String,
    pub placeholder_password: String,
    pub public_sites: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            reserved_words: DEFAULT_RESERVED_WORDS.iter().map(|w| w.to_string()).collect(),
            default_role: "administrator".to_string(),
            placeholder_password: "changeme".to_string(),
            public_sites: true,
        }
    }
}

impl ConfigProvider for ImportSettings {
    fn max_rows(&self) -> usize {
        self.max_rows
    }

    fn reserved_words(&self) -> &[String] {
        &self.reserved_words
    }

    fn default_role(&self) -> &str {
        &self.default_role
    }

    fn placeholder_password(&self) -> &str {
        &self.placeholder_password
    }

    fn public_sites(&self) -> bool {
        self.public_sites
    }
}

impl Validate for ImportSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_positive_number("import.max_rows", self.max_rows, 1)?;
        validation::validate_non_empty_string("import.default_role", &self.default_role)?;
        validation::validate_non_empty_string(
            "import.placeholder_password",
            &self.placeholder_password,
        )?;
        for word in &self.reserved_words {
            validation::validate_non_empty_string("import.reserved_words", word)?;
        }
        Ok(())
    }
}

/// `[network]` section or the network stored in a platform snapshot.
impl Validate for NetworkSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_domain("network.base_domain", &self.base_domain)?;
        validation::validate_base_path("network.base_path", &self.base_path)
    }
}
