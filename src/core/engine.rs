use crate::core::importer::BulkImporter;
use crate::core::report::{ImportReport, ReportFormat};
use crate::domain::ports::Storage;
use crate::utils::error::{ImportError, Result};

/// 讀取輸入檔 → 匯入 → 輸出報告
pub struct ImportEngine<S: Storage> {
    importer: BulkImporter,
    storage: S,
}

impl<S: Storage> ImportEngine<S> {
    pub fn new(importer: BulkImporter, storage: S) -> Self {
        Self { importer, storage }
    }

    pub fn importer(&self) -> &BulkImporter {
        &self.importer
    }

    pub fn extract(&self, input_path: &str) -> Result<String> {
        tracing::debug!("Reading import rows from: {}", input_path);
        let data = self.storage.read_file(input_path)?;
        let text = String::from_utf8(data)?;
        if text.trim().is_empty() {
            return Err(ImportError::MissingInput);
        }
        Ok(text)
    }

    pub fn load(&self, report: &ImportReport, format: ReportFormat, output_path: &str) -> Result<()> {
        let rendered = report.render(format)?;
        tracing::debug!("Writing {} report ({} bytes) to {}", format.extension(), rendered.len(), output_path);
        self.storage.write_file(output_path, rendered.as_bytes())
    }

    pub fn run(&self, input_path: &str, format: ReportFormat, output_path: Option<&str>) -> Result<ImportReport> {
        tracing::info!("Starting import from {}", input_path);

        let text = self.extract(input_path)?;
        let report = self.importer.import(&text)?;

        if let Some(output_path) = output_path {
            self.load(&report, format, output_path)?;
            tracing::info!("Report saved to: {}", output_path);
        }

        Ok(report)
    }
}
