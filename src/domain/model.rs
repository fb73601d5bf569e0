use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(UserId);
id_type!(SiteId);
id_type!(TopicId);

/// 一列已通過驗證的匯入資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Empty means the root site.
    pub domain: String,
    pub username: String,
    pub title: Option<String>,
    pub topic: Option<String>,
}

impl ImportRow {
    /// Title to give a new site; falls back to the domain.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.domain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    BadCharactersInLine,
    TooFewArguments,
    BadCharactersInUsername,
    NonAlphanumericDomain,
    NoLdapUser,
    NoUser,
    DomainReserved,
    FailedToCreateBlog,
    NoBlogTopic,
}

impl RowErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowErrorKind::BadCharactersInLine => "bad_characters_in_line",
            RowErrorKind::TooFewArguments => "too_few_arguments",
            RowErrorKind::BadCharactersInUsername => "bad_characters_in_username",
            RowErrorKind::NonAlphanumericDomain => "non_alphanumeric_domain",
            RowErrorKind::NoLdapUser => "no_ldap_user",
            RowErrorKind::NoUser => "no_user",
            RowErrorKind::DomainReserved => "domain_reserved",
            RowErrorKind::FailedToCreateBlog => "failed_to_create_blog",
            RowErrorKind::NoBlogTopic => "no_blog_topic",
        }
    }

    /// Warnings are recorded but leave the row counted as added.
    pub fn is_warning(&self) -> bool {
        matches!(self, RowErrorKind::NoBlogTopic)
    }
}

impl fmt::Display for RowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub kind: RowErrorKind,
    /// 1-based line number in the submitted text.
    pub line: usize,
    pub message: String,
}

impl RowError {
    pub fn new(kind: RowErrorKind, line: usize, detail: impl AsRef<str>) -> Self {
        Self {
            kind,
            line,
            message: format!("Line {}: {}", line, detail.as_ref()),
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for RowError {}

/// Platform-wide addressing configuration, owned by the site platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub base_domain: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    #[serde(default)]
    pub subdomain_install: bool,
}

fn default_base_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiteAddress {
    pub host: String,
    pub path: String,
}

impl fmt::Display for SiteAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.host, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSite {
    pub address: SiteAddress,
    pub title: String,
    pub owner: UserId,
    pub public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOutcome {
    Created(SiteId),
    /// Site already existed; the user was attached to it.
    Attached(SiteId),
}

/// 目錄服務 (LDAP) 回傳的使用者資料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    pub username: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Fired after every successful site creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCreated {
    pub site_id: SiteId,
    pub address: SiteAddress,
    pub title: String,
    pub owner: UserId,
    pub line: usize,
    pub created_at: DateTime<Utc>,
}

/// Which optional collaborators were wired in when the importer was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub directory_service: bool,
    pub topics: bool,
}

/// What a caller (form handler, CLI) submits for one import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRequest {
    pub text: Option<String>,
    pub max_rows: Option<usize>,
}
