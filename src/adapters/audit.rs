use crate::domain::model::SiteCreated;
use crate::domain::ports::SiteEventListener;

/// Logs every created site at info level under the `audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditListener;

impl SiteEventListener for TracingAuditListener {
    fn on_site_created(&self, event: &SiteCreated) {
        tracing::info!(
            target: "audit",
            site_id = event.site_id.0,
            owner = event.owner.0,
            line = event.line,
            "site created at {} (\"{}\")",
            event.address,
            event.title
        );
    }
}
