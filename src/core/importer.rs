use crate::core::parser::{self, ParsedLine};
use crate::core::report::ImportReport;
use crate::core::site_provisioner::SiteProvisioner;
use crate::core::topic_assigner::TopicAssigner;
use crate::core::user_resolver::UserResolver;
use crate::domain::model::{Capabilities, ImportRequest, ImportRow, SiteOutcome};
use crate::domain::ports::{
    ConfigProvider, DirectoryService, SiteEventListener, SitePlatform, TopicCapability,
    UserDirectory,
};
use crate::utils::error::{ImportError, Result};
use std::sync::Arc;

/// 批次匯入：切分、驗證、逐列派送給外部平台並累計結果
pub struct BulkImporter {
    resolver: UserResolver,
    provisioner: SiteProvisioner,
    topics: Option<TopicAssigner>,
    max_rows: usize,
    capabilities: Capabilities,
}

pub struct BulkImporterBuilder {
    users: Arc<dyn UserDirectory>,
    sites: Arc<dyn SitePlatform>,
    directory: Option<Arc<dyn DirectoryService>>,
    topics: Option<Arc<dyn TopicCapability>>,
    listeners: Vec<Arc<dyn SiteEventListener>>,
    max_rows: usize,
    reserved_words: Vec<String>,
    default_role: String,
    placeholder_password: String,
    public_sites: bool,
}

impl BulkImporterBuilder {
    pub fn with_directory_service(mut self, directory: Arc<dyn DirectoryService>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn with_topics(mut self, topics: Arc<dyn TopicCapability>) -> Self {
        self.topics = Some(topics);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn SiteEventListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn build(self) -> BulkImporter {
        let capabilities = Capabilities {
            directory_service: self.directory.is_some(),
            topics: self.topics.is_some(),
        };
        tracing::debug!("Building importer with capabilities {:?}", capabilities);

        let mut provisioner = SiteProvisioner::new(
            self.sites,
            &self.reserved_words,
            self.default_role,
            self.public_sites,
        );
        for listener in self.listeners {
            provisioner.add_listener(listener);
        }

        BulkImporter {
            resolver: UserResolver::new(self.users, self.directory, self.placeholder_password),
            provisioner,
            topics: self.topics.map(TopicAssigner::new),
            max_rows: self.max_rows,
            capabilities,
        }
    }
}

impl BulkImporter {
    pub fn builder<C: ConfigProvider>(
        config: &C,
        users: Arc<dyn UserDirectory>,
        sites: Arc<dyn SitePlatform>,
    ) -> BulkImporterBuilder {
        BulkImporterBuilder {
            users,
            sites,
            directory: None,
            topics: None,
            listeners: Vec::new(),
            max_rows: config.max_rows(),
            reserved_words: config.reserved_words().to_vec(),
            default_role: config.default_role().to_string(),
            placeholder_password: config.placeholder_password().to_string(),
            public_sites: config.public_sites(),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Validates rows without touching the platform.
    pub fn preview(&self, raw: &str) -> Vec<ParsedLine> {
        parser::split_and_validate(raw, self.max_rows)
    }

    pub fn import(&self, raw: &str) -> Result<ImportReport> {
        self.import_with_limit(raw, self.max_rows)
    }

    /// Entry point for form-style callers; missing text fails the whole invocation.
    pub fn import_request(&self, request: &ImportRequest) -> Result<ImportReport> {
        let raw = request.text.as_deref().ok_or(ImportError::MissingInput)?;
        self.import_with_limit(raw, request.max_rows.unwrap_or(self.max_rows))
    }

    pub fn import_with_limit(&self, raw: &str, max_rows: usize) -> Result<ImportReport> {
        if max_rows == 0 {
            return Err(ImportError::InvalidRowLimit { value: max_rows });
        }

        let mut report = ImportReport::new();
        for (line, parsed) in parser::split_and_validate(raw, max_rows) {
            report.record_processed();
            match parsed {
                Ok(row) => self.process_row(line, &row, &mut report),
                Err(error) => report.record_failure(error),
            }
        }

        tracing::info!(
            "Import finished: {} processed, {} added, {} failed",
            report.lines_processed,
            report.num_added,
            report.num_failed
        );
        Ok(report)
    }

    fn process_row(&self, line: usize, row: &ImportRow, report: &mut ImportReport) {
        tracing::debug!("Line {}: importing {:?}", line, row);

        let owner = match self.resolver.resolve_user(line, &row.username) {
            Ok(owner) => owner,
            Err(error) => return report.record_failure(error),
        };

        let outcome = match self
            .provisioner
            .provision_site(line, &row.domain, owner, row.title())
        {
            Ok(outcome) => outcome,
            Err(error) => return report.record_failure(error),
        };

        match (outcome, row.topic.as_deref()) {
            (SiteOutcome::Created(site), Some(topic)) => match &self.topics {
                Some(assigner) => {
                    if let Err(warning) = assigner.assign_topic(line, site, topic) {
                        report.record_warning(warning);
                    }
                }
                None => tracing::debug!(
                    "Line {}: topic \"{}\" ignored, no topic capability",
                    line,
                    topic
                ),
            },
            (SiteOutcome::Attached(site), Some(topic)) => tracing::debug!(
                "Line {}: topic \"{}\" ignored, site #{} already existed",
                line,
                topic,
                site
            ),
            (_, None) => {}
        }

        report.record_added();
    }
}
