use crate::core::importer::{BulkImporter, BulkImporterBuilder};
use crate::core::user_resolver::slugify;
use crate::domain::model::{
    DirectoryRecord, NetworkSettings, NewSite, SiteAddress, SiteId, TopicId, UserId,
};
use crate::domain::ports::{
    ConfigProvider, DirectoryService, SitePlatform, Storage, TopicCapability, UserDirectory,
};
use crate::utils::error::{PlatformError, PortResult, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Longest host label or path segment the platform accepts.
const MAX_SITE_NAME_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserRecord {
    fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.login))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user: UserId,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: SiteId,
    pub host: String,
    pub path: String,
    pub title: String,
    pub owner: UserId,
    #[serde(default = "default_public")]
    pub public: bool,
    #[serde(default)]
    pub members: Vec<Membership>,
    #[serde(default)]
    pub topic: Option<TopicId>,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub id: TopicId,
    pub name: String,
}

/// 平台狀態快照；`topics` 或 `directory` 缺席代表該功能不存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    pub network: NetworkSettings,
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub sites: Vec<SiteRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<TopicRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<Vec<DirectoryRecord>>,
}

impl PlatformSnapshot {
    pub fn new(network: NetworkSettings) -> Self {
        Self {
            network,
            users: Vec::new(),
            sites: Vec::new(),
            topics: None,
            directory: None,
        }
    }

    /// Parses a snapshot and rejects a network that would produce malformed addresses.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let snapshot: Self = serde_json::from_slice(data)?;
        snapshot.network.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        Self::from_json(&storage.read_file(path)?)
    }

    pub fn save<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        storage.write_file(path, self.to_json()?.as_bytes())
    }

    pub fn user(&self, login: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.login == login)
    }

    pub fn site_at(&self, host: &str, path: &str) -> Option<&SiteRecord> {
        self.sites.iter().find(|s| s.host == host && s.path == path)
    }
}

/// Host platform kept in memory, backed by a [`PlatformSnapshot`].
pub struct InMemoryPlatform {
    state: Mutex<PlatformSnapshot>,
    has_topics: bool,
    has_directory: bool,
}

impl InMemoryPlatform {
    pub fn new(snapshot: PlatformSnapshot) -> Self {
        Self {
            has_topics: snapshot.topics.is_some(),
            has_directory: snapshot.directory.is_some(),
            state: Mutex::new(snapshot),
        }
    }

    /// Importer builder with every capability this snapshot provides wired in.
    pub fn importer_builder<C: ConfigProvider>(self: &Arc<Self>, config: &C) -> BulkImporterBuilder {
        let mut builder = BulkImporter::builder(config, self.clone(), self.clone());
        if self.has_directory {
            builder = builder.with_directory_service(self.clone());
        }
        if self.has_topics {
            builder = builder.with_topics(self.clone());
        }
        builder
    }

    pub fn snapshot(&self) -> PortResult<PlatformSnapshot> {
        Ok(self.state()?.clone())
    }

    fn state(&self) -> PortResult<MutexGuard<'_, PlatformSnapshot>> {
        self.state
            .lock()
            .map_err(|_| PlatformError::new("platform state lock poisoned"))
    }
}

fn find_user(state: &PlatformSnapshot, pred: impl Fn(&UserRecord) -> bool) -> Option<UserId> {
    state.users.iter().find(|u| pred(u)).map(|u| u.id)
}

impl UserDirectory for InMemoryPlatform {
    fn find_by_id(&self, id: UserId) -> PortResult<Option<UserId>> {
        Ok(find_user(&*self.state()?, |u| u.id == id))
    }

    fn find_by_email(&self, email: &str) -> PortResult<Option<UserId>> {
        Ok(find_user(&*self.state()?, |u| {
            u.email
                .as_deref()
                .is_some_and(|e| e.eq_ignore_ascii_case(email))
        }))
    }

    fn find_by_login(&self, login: &str) -> PortResult<Option<UserId>> {
        Ok(find_user(&*self.state()?, |u| u.login == login))
    }

    fn find_by_slug(&self, slug: &str) -> PortResult<Option<UserId>> {
        Ok(find_user(&*self.state()?, |u| u.slug() == slug))
    }

    fn set_display_name(&self, id: UserId, display_name: &str) -> PortResult<()> {
        let mut state = self.state()?;
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| PlatformError::new(format!("user #{} does not exist", id)))?;
        user.display_name = display_name.to_string();
        Ok(())
    }
}

impl DirectoryService for InMemoryPlatform {
    fn lookup(&self, username: &str) -> PortResult<DirectoryRecord> {
        let state = self.state()?;
        state
            .directory
            .as_ref()
            .ok_or_else(|| PlatformError::new("directory service is not configured"))?
            .iter()
            .find(|r| r.username.eq_ignore_ascii_case(username))
            .cloned()
            .ok_or_else(|| PlatformError::new(format!("no directory entry for \"{}\"", username)))
    }

    fn create_local_user(
        &self,
        username: &str,
        password: &str,
        record: &DirectoryRecord,
    ) -> PortResult<UserId> {
        let mut state = self.state()?;
        if state.users.iter().any(|u| u.login == username) {
            return Err(PlatformError::new(format!("login \"{}\" is already taken", username)));
        }

        let id = UserId(state.users.iter().map(|u| u.id.0).max().unwrap_or(0) + 1);
        // 顯示名稱先用登入名稱，之後由匯入流程修正
        state.users.push(UserRecord {
            id,
            login: username.to_string(),
            email: record.email.clone(),
            slug: None,
            display_name: username.to_string(),
            password: Some(password.to_string()),
        });
        Ok(id)
    }
}

impl SitePlatform for InMemoryPlatform {
    fn network(&self) -> NetworkSettings {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .network
            .clone()
    }

    fn find_site(&self, address: &SiteAddress) -> PortResult<Option<SiteId>> {
        let state = self.state()?;
        Ok(state.site_at(&address.host, &address.path).map(|s| s.id))
    }

    fn create_site(&self, site: &NewSite) -> PortResult<SiteId> {
        let mut state = self.state()?;

        if state.site_at(&site.address.host, &site.address.path).is_some() {
            return Err(PlatformError::new(format!("a site already exists at {}", site.address)));
        }
        if !state.users.iter().any(|u| u.id == site.owner) {
            return Err(PlatformError::new(format!("owner #{} does not exist", site.owner)));
        }
        let too_long = site
            .address
            .host
            .split('.')
            .chain(site.address.path.split('/'))
            .any(|part| part.len() > MAX_SITE_NAME_LEN);
        if too_long {
            return Err(PlatformError::new(format!(
                "site names may not be longer than {} characters",
                MAX_SITE_NAME_LEN
            )));
        }

        let id = SiteId(state.sites.iter().map(|s| s.id.0).max().unwrap_or(0) + 1);
        state.sites.push(SiteRecord {
            id,
            host: site.address.host.clone(),
            path: site.address.path.clone(),
            title: site.title.clone(),
            owner: site.owner,
            public: site.public,
            members: vec![Membership {
                user: site.owner,
                role: "administrator".to_string(),
            }],
            topic: None,
        });
        Ok(id)
    }

    fn add_user_to_site(&self, site: SiteId, user: UserId, role: &str) -> PortResult<()> {
        let mut state = self.state()?;
        let record = state
            .sites
            .iter_mut()
            .find(|s| s.id == site)
            .ok_or_else(|| PlatformError::new(format!("site #{} does not exist", site)))?;

        match record.members.iter_mut().find(|m| m.user == user) {
            Some(member) => member.role = role.to_string(),
            None => record.members.push(Membership {
                user,
                role: role.to_string(),
            }),
        }
        Ok(())
    }
}

impl TopicCapability for InMemoryPlatform {
    fn find_topic(&self, name: &str) -> PortResult<Option<TopicId>> {
        let state = self.state()?;
        Ok(state
            .topics
            .as_ref()
            .and_then(|topics| topics.iter().find(|t| t.name.eq_ignore_ascii_case(name)))
            .map(|t| t.id))
    }

    fn set_site_topic(&self, site: SiteId, topic: TopicId) -> PortResult<()> {
        let mut state = self.state()?;
        let record = state
            .sites
            .iter_mut()
            .find(|s| s.id == site)
            .ok_or_else(|| PlatformError::new(format!("site #{} does not exist", site)))?;
        record.topic = Some(topic);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "network": {"base_domain": "example.com", "base_path": "/", "subdomain_install": false},
        "users": [{"id": 1, "login": "alice", "email": "alice@example.com"}],
        "sites": [{"id": 1, "host": "example.com", "path": "/", "title": "Main", "owner": 1}],
        "topics": [{"id": 4, "name": "Tech"}]
    }"#;

    fn platform() -> InMemoryPlatform {
        InMemoryPlatform::new(PlatformSnapshot::from_json(SNAPSHOT.as_bytes()).unwrap())
    }

    #[test]
    fn test_snapshot_defaults() {
        let snapshot = PlatformSnapshot::from_json(SNAPSHOT.as_bytes()).unwrap();
        assert!(snapshot.sites[0].public);
        assert!(snapshot.sites[0].members.is_empty());
        assert!(snapshot.directory.is_none());
        assert_eq!(snapshot.users[0].slug(), "alice");
    }

    #[test]
    fn test_user_lookups() {
        let platform = platform();
        assert_eq!(platform.find_by_login("alice").unwrap(), Some(UserId(1)));
        assert_eq!(platform.find_by_email("ALICE@example.com").unwrap(), Some(UserId(1)));
        assert_eq!(platform.find_by_id(UserId(2)).unwrap(), None);
    }

    #[test]
    fn test_create_site_and_topic() {
        let platform = platform();
        let id = platform
            .create_site(&NewSite {
                address: SiteAddress {
                    host: "example.com".to_string(),
                    path: "/acme/".to_string(),
                },
                title: "Acme".to_string(),
                owner: UserId(1),
                public: false,
            })
            .unwrap();
        assert_eq!(id, SiteId(2));

        let topic = platform.find_topic("tech").unwrap().unwrap();
        platform.set_site_topic(id, topic).unwrap();

        let snapshot = platform.snapshot().unwrap();
        let site = snapshot.site_at("example.com", "/acme/").unwrap();
        assert_eq!(site.topic, Some(TopicId(4)));
        assert!(!site.public);
        assert_eq!(site.members[0].role, "administrator");
    }

    #[test]
    fn test_create_site_rejects_long_names() {
        let platform = platform();
        let err = platform
            .create_site(&NewSite {
                address: SiteAddress {
                    host: "example.com".to_string(),
                    path: format!("/{}/", "a".repeat(64)),
                },
                title: "Long".to_string(),
                owner: UserId(1),
                public: true,
            })
            .unwrap_err();
        assert!(err.message.contains("63"));
    }

    #[test]
    fn test_snapshot_with_malformed_network_is_rejected() {
        let json = r#"{"network": {"base_domain": "example.com", "base_path": "/sites"}}"#;
        assert!(matches!(
            PlatformSnapshot::from_json(json.as_bytes()),
            Err(crate::utils::error::ImportError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_directory_absent_means_lookup_fails() {
        let platform = platform();
        assert!(platform.lookup("alice").is_err());
    }
}
