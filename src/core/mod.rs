pub mod engine;
pub mod importer;
pub mod parser;
pub mod report;
pub mod site_provisioner;
pub mod topic_assigner;
pub mod user_resolver;

pub use crate::domain::model::{ImportRequest, ImportRow, RowError, RowErrorKind};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
