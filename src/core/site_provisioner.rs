use crate::domain::model::{
    NetworkSettings, NewSite, RowError, RowErrorKind, SiteAddress, SiteCreated, SiteOutcome, UserId,
};
use crate::domain::ports::{SiteEventListener, SitePlatform};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Path segments a subdirectory site may not take.
pub const DEFAULT_RESERVED_WORDS: [&str; 5] = ["page", "comments", "blog", "files", "feed"];

pub struct SiteProvisioner {
    platform: Arc<dyn SitePlatform>,
    listeners: Vec<Arc<dyn SiteEventListener>>,
    reserved_words: HashSet<String>,
    default_role: String,
    public: bool,
}

impl SiteProvisioner {
    pub fn new(
        platform: Arc<dyn SitePlatform>,
        reserved_words: &[String],
        default_role: impl Into<String>,
        public: bool,
    ) -> Self {
        Self {
            platform,
            listeners: Vec::new(),
            reserved_words: reserved_words.iter().map(|w| w.to_lowercase()).collect(),
            default_role: default_role.into(),
            public,
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SiteEventListener>) {
        self.listeners.push(listener);
    }

    /// 依網路設定計算新站台的 host 與 path
    pub fn site_address(&self, domain: &str) -> Result<SiteAddress, String> {
        let network = self.platform.network();
        let domain = domain.to_lowercase();

        if domain.is_empty() {
            return Ok(SiteAddress {
                host: network.base_domain,
                path: network.base_path,
            });
        }

        if network.subdomain_install {
            Ok(subdomain_address(&network, &domain))
        } else {
            if self.reserved_words.contains(&domain) {
                return Err(format!(
                    "\"{}\" is reserved and cannot be used as a site path",
                    domain
                ));
            }
            Ok(subdirectory_address(&network, &domain))
        }
    }

    /// Creates the site for `domain`, or attaches `owner` when one already lives there.
    pub fn provision_site(
        &self,
        line: usize,
        domain: &str,
        owner: UserId,
        title: &str,
    ) -> Result<SiteOutcome, RowError> {
        let address = self
            .site_address(domain)
            .map_err(|reason| RowError::new(RowErrorKind::DomainReserved, line, reason))?;

        let existing = self.platform.find_site(&address).map_err(|e| {
            RowError::new(
                RowErrorKind::FailedToCreateBlog,
                line,
                format!("could not look up site {}: {}", address, e),
            )
        })?;

        if let Some(site_id) = existing {
            self.platform
                .add_user_to_site(site_id, owner, &self.default_role)
                .map_err(|e| {
                    RowError::new(
                        RowErrorKind::FailedToCreateBlog,
                        line,
                        format!("could not add user #{} to existing site {}: {}", owner, address, e),
                    )
                })?;
            tracing::info!(
                "Line {}: site {} already exists, added user #{} as {}",
                line,
                address,
                owner,
                self.default_role
            );
            return Ok(SiteOutcome::Attached(site_id));
        }

        let new_site = NewSite {
            address: address.clone(),
            title: title.to_string(),
            owner,
            public: self.public,
        };
        let site_id = self.platform.create_site(&new_site).map_err(|e| {
            RowError::new(
                RowErrorKind::FailedToCreateBlog,
                line,
                format!("failed to create site {}: {}", address, e),
            )
        })?;

        tracing::info!("Line {}: created site #{} at {}", line, site_id, address);

        let event = SiteCreated {
            site_id,
            address,
            title: new_site.title,
            owner,
            line,
            created_at: Utc::now(),
        };
        for listener in &self.listeners {
            listener.on_site_created(&event);
        }

        Ok(SiteOutcome::Created(site_id))
    }
}

fn subdomain_address(network: &NetworkSettings, domain: &str) -> SiteAddress {
    let base = network
        .base_domain
        .strip_prefix("www.")
        .unwrap_or(&network.base_domain);
    SiteAddress {
        host: format!("{}.{}", domain, base),
        path: network.base_path.clone(),
    }
}

fn subdirectory_address(network: &NetworkSettings, domain: &str) -> SiteAddress {
    SiteAddress {
        host: network.base_domain.clone(),
        path: format!("{}{}/", network.base_path, domain),
    }
}
