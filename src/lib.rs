pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryPlatform, LocalStorage, PlatformSnapshot, TracingAuditListener};
pub use config::{settings::ImportSettings, toml_config::TomlConfig};
pub use crate::core::{
    engine::ImportEngine,
    importer::BulkImporter,
    parser::split_and_validate,
    report::{ImportOutcome, ImportReport, ReportFormat},
};
pub use domain::model::{ImportRequest, ImportRow, RowError, RowErrorKind};
pub use utils::error::{ImportError, Result};
