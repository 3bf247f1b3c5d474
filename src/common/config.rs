//! Configuration file handling

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Backend location
    #[serde(default)]
    pub server: ServerConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Admin account used to manage users and courses
    #[serde(default = "default_admin", deserialize_with = "admin_account")]
    pub admin: AccountConfig,

    /// Teacher account created and approved by the run
    #[serde(default = "default_teacher", deserialize_with = "teacher_account")]
    pub teacher: AccountConfig,

    /// Course created by the run
    #[serde(default)]
    pub course: CourseConfig,

    /// Workflow behaviour
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Backend location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-request timeout; unset leaves the client default in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_user_agent() -> String {
    concat!("academy-check/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Credentials and display name of an account
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// An `[admin]` or `[teacher]` section as written; missing keys fall back
/// to that account's defaults
#[derive(Deserialize)]
struct AccountSection {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl AccountSection {
    fn over(self, defaults: AccountConfig) -> AccountConfig {
        AccountConfig {
            name: self.name.unwrap_or(defaults.name),
            email: self.email.unwrap_or(defaults.email),
            password: self.password.unwrap_or(defaults.password),
        }
    }
}

fn admin_account<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<AccountConfig, D::Error> {
    AccountSection::deserialize(d).map(|section| section.over(default_admin()))
}

fn teacher_account<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<AccountConfig, D::Error> {
    AccountSection::deserialize(d).map(|section| section.over(default_teacher()))
}

fn default_admin() -> AccountConfig {
    AccountConfig {
        name: "System Admin".to_string(),
        email: "admin@academy.com".to_string(),
        password: "admin123".to_string(),
    }
}

fn default_teacher() -> AccountConfig {
    AccountConfig {
        name: "Dr. John Smith".to_string(),
        email: "john.smith@academy.com".to_string(),
        password: "teacher123".to_string(),
    }
}

/// Course created by the run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CourseConfig {
    #[serde(default = "default_course_title")]
    pub title: String,

    #[serde(default = "default_course_code")]
    pub code: String,

    #[serde(default = "default_course_description")]
    pub description: String,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            title: default_course_title(),
            code: default_course_code(),
            description: default_course_description(),
        }
    }
}

fn default_course_title() -> String {
    "Introduction to Computer Science".to_string()
}
fn default_course_code() -> String {
    "CS600".to_string()
}
fn default_course_description() -> String {
    "A comprehensive introduction to computer science concepts and programming fundamentals."
        .to_string()
}

/// Workflow behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Exit non-zero when any step fails or warns, not only on fatal steps
    #[serde(default)]
    pub strict: bool,
}

impl Config {
    /// Load configuration from an explicit path, or the default config file
    ///
    /// Returns default configuration if no path is given and the default file
    /// doesn't exist. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match config_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| super::Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(super::Error::Config(format!(
                "server.base_url must be an http(s) URL, got '{}'",
                self.server.base_url
            )));
        }
        Ok(())
    }

    /// Apply a command-line base URL override
    pub fn with_base_url(mut self, base_url: Option<String>) -> Result<Self> {
        if let Some(url) = base_url {
            self.server.base_url = url;
            self.validate()?;
        }
        Ok(self)
    }
}

/// Path the config would be loaded from, for display
pub fn effective_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(config_path)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            http: HttpConfig::default(),
            admin: default_admin(),
            teacher: default_teacher(),
            course: CourseConfig::default(),
            workflow: WorkflowConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_accounts() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8080/api");
        assert_eq!(config.admin.email, "admin@academy.com");
        assert_eq!(config.teacher.email, "john.smith@academy.com");
        assert_eq!(config.course.code, "CS600");
        assert!(config.http.timeout_secs.is_none());
        assert!(!config.workflow.strict);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = Config::parse(
            r#"
            [server]
            base_url = "https://staging.example.org/api"

            [course]
            code = "CS700"

            [http]
            timeout_secs = 15
            "#,
        )
        .unwrap();

        assert_eq!(config.server.base_url, "https://staging.example.org/api");
        assert_eq!(config.course.code, "CS700");
        assert_eq!(config.course.title, "Introduction to Computer Science");
        assert_eq!(config.http.timeout(), Some(Duration::from_secs(15)));
        assert!(config.http.user_agent.starts_with("academy-check/"));
    }

    #[test]
    fn test_partial_account_sections_keep_their_own_defaults() {
        let config = Config::parse(
            r#"
            [teacher]
            password = "s3cret"

            [admin]
            email = "root@academy.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.teacher.password, "s3cret");
        assert_eq!(config.teacher.name, "Dr. John Smith");
        assert_eq!(config.teacher.email, "john.smith@academy.com");
        assert_eq!(config.admin.email, "root@academy.com");
        assert_eq!(config.admin.name, "System Admin");
        assert_eq!(config.admin.password, "admin123");
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let err = Config::parse("[server]\nbase_url = \"localhost:8080\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Config::parse("[server\nbase_url =").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_base_url_override() {
        let config = Config::default()
            .with_base_url(Some("http://127.0.0.1:9000/api".to_string()))
            .unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:9000/api");
        assert!(Config::default().with_base_url(Some("ftp://x".into())).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[workflow]\nstrict = true").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert!(config.workflow.strict);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed = Config::parse(&rendered).unwrap();
        assert_eq!(parsed.teacher.name, "Dr. John Smith");
    }
}
