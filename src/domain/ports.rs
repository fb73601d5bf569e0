use crate::domain::model::{
    DirectoryRecord, NetworkSettings, NewSite, SiteAddress, SiteCreated, SiteId, TopicId, UserId,
};
use crate::utils::error::{PortResult, Result};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn max_rows(&self) -> usize;
    fn reserved_words(&self) -> &[String];
    fn default_role(&self) -> &str;
    fn placeholder_password(&self) -> &str;
    fn public_sites(&self) -> bool;
}

/// Lookup side of the host platform's user store.
pub trait UserDirectory: Send + Sync {
    fn find_by_id(&self, id: UserId) -> PortResult<Option<UserId>>;
    fn find_by_email(&self, email: &str) -> PortResult<Option<UserId>>;
    fn find_by_login(&self, login: &str) -> PortResult<Option<UserId>>;
    fn find_by_slug(&self, slug: &str) -> PortResult<Option<UserId>>;
    fn set_display_name(&self, id: UserId, display_name: &str) -> PortResult<()>;
}

/// Optional directory-service (LDAP) provisioning.
pub trait DirectoryService: Send + Sync {
    fn lookup(&self, username: &str) -> PortResult<DirectoryRecord>;
    fn create_local_user(
        &self,
        username: &str,
        password: &str,
        record: &DirectoryRecord,
    ) -> PortResult<UserId>;
}

pub trait SitePlatform: Send + Sync {
    fn network(&self) -> NetworkSettings;
    fn find_site(&self, address: &SiteAddress) -> PortResult<Option<SiteId>>;
    fn create_site(&self, site: &NewSite) -> PortResult<SiteId>;
    fn add_user_to_site(&self, site: SiteId, user: UserId, role: &str) -> PortResult<()>;
}

/// Optional "blog topics" capability.
pub trait TopicCapability: Send + Sync {
    fn find_topic(&self, name: &str) -> PortResult<Option<TopicId>>;
    fn set_site_topic(&self, site: SiteId, topic: TopicId) -> PortResult<()>;
}

pub trait SiteEventListener: Send + Sync {
    fn on_site_created(&self, event: &SiteCreated);
}
