use crate::domain::model::{DirectoryRecord, RowError, RowErrorKind, UserId};
use crate::domain::ports::{DirectoryService, UserDirectory};
use crate::utils::error::PortResult;
use regex::Regex;
use std::sync::{Arc, LazyLock};

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));
static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern is valid"));

/// 解析使用者：依 email、數字 id、登入名稱、slug 的順序查找，
/// 找不到時（若有目錄服務）自動建立本地使用者
pub struct UserResolver {
    users: Arc<dyn UserDirectory>,
    directory: Option<Arc<dyn DirectoryService>>,
    placeholder_password: String,
}

impl UserResolver {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        directory: Option<Arc<dyn DirectoryService>>,
        placeholder_password: impl Into<String>,
    ) -> Self {
        Self {
            users,
            directory,
            placeholder_password: placeholder_password.into(),
        }
    }

    /// Looks the token up without provisioning anything.
    pub fn find_existing(&self, token: &str) -> PortResult<Option<UserId>> {
        if EMAIL_PATTERN.is_match(token) {
            return self.users.find_by_email(token);
        }

        if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = token.parse::<u64>() {
                return self.users.find_by_id(UserId(id));
            }
        }

        match self.users.find_by_login(token)? {
            Some(id) => Ok(Some(id)),
            None => self.users.find_by_slug(&slugify(token)),
        }
    }

    pub fn resolve_user(&self, line: usize, token: &str) -> Result<UserId, RowError> {
        match self.find_existing(token) {
            Ok(Some(id)) => {
                tracing::debug!("Line {}: resolved user \"{}\" to #{}", line, token, id);
                return Ok(id);
            }
            Ok(None) => {}
            Err(e) => {
                return Err(RowError::new(
                    RowErrorKind::NoUser,
                    line,
                    format!("user lookup for \"{}\" failed: {}", token, e),
                ));
            }
        }

        match &self.directory {
            Some(directory) => self.provision(directory.as_ref(), line, token),
            None => Err(RowError::new(
                RowErrorKind::NoUser,
                line,
                format!("user \"{}\" does not exist", token),
            )),
        }
    }

    fn provision(
        &self,
        directory: &dyn DirectoryService,
        line: usize,
        username: &str,
    ) -> Result<UserId, RowError> {
        let mut record = directory.lookup(username).map_err(|e| {
            RowError::new(
                RowErrorKind::NoLdapUser,
                line,
                format!("user \"{}\" not found in directory: {}", username, e),
            )
        })?;
        record.surname = normalize_surname(&record.surname);

        let id = directory
            .create_local_user(username, &self.placeholder_password, &record)
            .map_err(|e| {
                RowError::new(
                    RowErrorKind::NoLdapUser,
                    line,
                    format!("could not create user \"{}\" from directory: {}", username, e),
                )
            })?;

        let name = display_name(&record);
        if let Err(e) = self.users.set_display_name(id, &name) {
            tracing::warn!(
                "Line {}: created user #{} but could not set display name \"{}\": {}",
                line,
                id,
                name,
                e
            );
        }

        tracing::info!("Line {}: provisioned user \"{}\" (#{}) from directory", line, username, id);
        Ok(id)
    }
}

/// "sMITH" -> "Smith"
pub fn normalize_surname(surname: &str) -> String {
    let mut chars = surname.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

pub fn display_name(record: &DirectoryRecord) -> String {
    let name = format!("{} {}", record.given_name.trim(), record.surname.trim());
    let name = name.trim();
    if name.is_empty() {
        record.username.clone()
    } else {
        name.to_string()
    }
}

pub fn slugify(value: &str) -> String {
    let lower = value.trim().to_lowercase();
    SLUG_SEPARATORS
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::PlatformError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeUsers {
        by_login: HashMap<String, UserId>,
        by_email: HashMap<String, UserId>,
        by_slug: HashMap<String, UserId>,
        display_names: Mutex<HashMap<UserId, String>>,
        reject_display_names: bool,
    }

    impl UserDirectory for FakeUsers {
        fn find_by_id(&self, id: UserId) -> PortResult<Option<UserId>> {
            Ok(self.by_login.values().find(|u| **u == id).copied())
        }
        fn find_by_email(&self, email: &str) -> PortResult<Option<UserId>> {
            Ok(self.by_email.get(email).copied())
        }
        fn find_by_login(&self, login: &str) -> PortResult<Option<UserId>> {
            Ok(self.by_login.get(login).copied())
        }
        fn find_by_slug(&self, slug: &str) -> PortResult<Option<UserId>> {
            Ok(self.by_slug.get(slug).copied())
        }
        fn set_display_name(&self, id: UserId, display_name: &str) -> PortResult<()> {
            if self.reject_display_names {
                return Err(PlatformError::new("profile table is locked"));
            }
            self.display_names.lock().unwrap().insert(id, display_name.to_string());
            Ok(())
        }
    }

    struct FakeDirectory {
        records: HashMap<String, DirectoryRecord>,
        created: Mutex<Vec<(String, String, DirectoryRecord)>>,
        taken_logins: Vec<String>,
    }

    impl DirectoryService for FakeDirectory {
        fn lookup(&self, username: &str) -> PortResult<DirectoryRecord> {
            self.records
                .get(username)
                .cloned()
                .ok_or_else(|| PlatformError::new("no such entry"))
        }
        fn create_local_user(&self, username: &str, password: &str, record: &DirectoryRecord) -> PortResult<UserId> {
            if self.taken_logins.iter().any(|l| l == username) {
                return Err(PlatformError::new(format!("login \"{}\" is already taken", username)));
            }
            let mut created = self.created.lock().unwrap();
            created.push((username.to_string(), password.to_string(), record.clone()));
            Ok(UserId(100 + created.len() as u64))
        }
    }

    fn users() -> Arc<FakeUsers> {
        let mut users = FakeUsers::default();
        users.by_login.insert("alice".to_string(), UserId(1));
        users.by_email.insert("bob@example.com".to_string(), UserId(2));
        users.by_slug.insert("carol-jones".to_string(), UserId(3));
        Arc::new(users)
    }

    fn directory() -> Arc<FakeDirectory> {
        let mut records = HashMap::new();
        records.insert(
            "dave".to_string(),
            DirectoryRecord {
                username: "dave".to_string(),
                given_name: "Dave".to_string(),
                surname: "o'BRIEN".to_string(),
                email: Some("dave@example.com".to_string()),
            },
        );
        Arc::new(FakeDirectory {
            records,
            created: Mutex::new(Vec::new()),
            taken_logins: Vec::new(),
        })
    }

    #[test]
    fn test_lookup_order() {
        let resolver = UserResolver::new(users(), None, "changeme");
        assert_eq!(resolver.resolve_user(1, "bob@example.com").unwrap(), UserId(2));
        assert_eq!(resolver.resolve_user(1, "1").unwrap(), UserId(1));
        assert_eq!(resolver.resolve_user(1, "alice").unwrap(), UserId(1));
        assert_eq!(resolver.resolve_user(1, "Carol Jones").unwrap(), UserId(3));
    }

    #[test]
    fn test_missing_user_without_directory_is_no_user() {
        let resolver = UserResolver::new(users(), None, "changeme");
        let err = resolver.resolve_user(7, "zed").unwrap_err();
        assert_eq!(err.kind, RowErrorKind::NoUser);
        assert_eq!(err.line, 7);
    }

    #[test]
    fn test_directory_provisioning_normalizes_names() {
        let users = users();
        let directory = directory();
        let resolver = UserResolver::new(users.clone(), Some(directory.clone()), "changeme");

        let id = resolver.resolve_user(2, "dave").unwrap();
        assert_eq!(id, UserId(101));

        let created = directory.created.lock().unwrap();
        assert_eq!(created[0].1, "changeme");
        assert_eq!(created[0].2.surname, "O'brien");
        assert_eq!(
            users.display_names.lock().unwrap().get(&id).map(String::as_str),
            Some("Dave O'brien")
        );
    }

    #[test]
    fn test_directory_miss_is_no_ldap_user() {
        let directory = directory();
        let resolver = UserResolver::new(users(), Some(directory.clone()), "changeme");
        let err = resolver.resolve_user(3, "nobody").unwrap_err();
        assert_eq!(err.kind, RowErrorKind::NoLdapUser);
        assert!(directory.created.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_local_user_creation_is_no_ldap_user() {
        let mut records = HashMap::new();
        records.insert(
            "dave".to_string(),
            DirectoryRecord {
                username: "dave".to_string(),
                given_name: "Dave".to_string(),
                surname: "Brown".to_string(),
                email: None,
            },
        );
        let directory = Arc::new(FakeDirectory {
            records,
            created: Mutex::new(Vec::new()),
            taken_logins: vec!["dave".to_string()],
        });
        let users = users();
        let resolver = UserResolver::new(users.clone(), Some(directory.clone()), "changeme");

        let err = resolver.resolve_user(4, "dave").unwrap_err();
        assert_eq!(err.kind, RowErrorKind::NoLdapUser);
        assert!(err.message.contains("already taken"));
        assert!(directory.created.lock().unwrap().is_empty());
        assert!(users.display_names.lock().unwrap().is_empty());
    }

    #[test]
    fn test_display_name_failure_keeps_provisioned_user() {
        let users = Arc::new(FakeUsers {
            reject_display_names: true,
            ..FakeUsers::default()
        });
        let directory = directory();
        let resolver = UserResolver::new(users, Some(directory.clone()), "changeme");

        assert_eq!(resolver.resolve_user(5, "dave").unwrap(), UserId(101));
        assert_eq!(directory.created.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_normalize_surname_and_slug() {
        assert_eq!(normalize_surname("SMITH"), "Smith");
        assert_eq!(normalize_surname("  jones "), "Jones");
        assert_eq!(normalize_surname(""), "");
        assert_eq!(slugify(" Carol  Jones "), "carol-jones");
        assert_eq!(slugify("ALICE"), "alice");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let record = DirectoryRecord {
            username: "eve".to_string(),
            given_name: String::new(),
            surname: String::new(),
            email: None,
        };
        assert_eq!(display_name(&record), "eve");
    }
}
