//! Configuration types for gh-avatar-browser

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Upper bound GitHub accepts for `per_page`
pub const MAX_PER_PAGE: u32 = 100;

/// GitHub search settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API base URL (default: "https://api.github.com")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Only accounts with more followers than this are listed (default: 10000)
    #[serde(default = "default_min_followers")]
    pub min_followers: u64,

    /// Number of users requested (default: 50, max: 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Personal access token sent as `Authorization: Bearer` (optional)
    #[serde(default)]
    pub token: Option<String>,

    /// User-Agent header, required by the GitHub API
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout for both the list and avatar requests (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            min_followers: default_min_followers(),
            per_page: default_per_page(),
            token: None,
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

impl GithubConfig {
    /// Search query sent as the `q` parameter
    pub fn search_query(&self) -> String {
        format!("followers:>{} sort:followers", self.min_followers)
    }

    /// Fully-formed search URL
    pub fn search_url(&self) -> String {
        format!(
            "{}/search/users?q={}&per_page={}",
            self.api_base_url.trim_end_matches('/'),
            urlencoding::encode(&self.search_query()),
            self.per_page.min(MAX_PER_PAGE)
        )
    }
}

/// How the saved avatar file is named
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileNaming {
    /// `<login>.<ext>`; two accounts with the same login overwrite each other
    Login,
    /// `<id>.<ext>`
    Id,
    /// `<login>-<id>.<ext>` (default)
    #[default]
    LoginAndId,
}

/// Local storage settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory avatars are written to (default: "./avatars")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// File naming scheme
    #[serde(default)]
    pub file_naming: FileNaming,

    /// Extension used when the response has no recognised image content type (default: "jpg")
    #[serde(default = "default_extension")]
    pub default_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            file_naming: FileNaming::default(),
            default_extension: default_extension(),
        }
    }
}

/// Which screen variant to mount
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenVariant {
    /// List only, no download control
    Browse,
    /// List with a download control per row (default)
    #[default]
    BrowseWithDownloads,
}

impl ScreenVariant {
    /// Whether rows expose a download control
    pub fn downloads_enabled(self) -> bool {
        matches!(self, ScreenVariant::BrowseWithDownloads)
    }
}

/// Screen behaviour settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenConfig {
    /// Screen variant
    #[serde(default)]
    pub variant: ScreenVariant,

    /// Header title shown above the list
    #[serde(default = "default_title")]
    pub title: String,

    /// How long `unmount()` waits for cancelled downloads to drain (default: 5 seconds)
    #[serde(default = "default_unmount_timeout", with = "duration_serde")]
    pub unmount_timeout: Duration,

    /// Event channel buffer size (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            variant: ScreenVariant::default(),
            title: default_title(),
            unmount_timeout: default_unmount_timeout(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Main configuration for [`UserBrowserScreen`](crate::UserBrowserScreen)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// GitHub search settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Screen behaviour settings
    #[serde(default)]
    pub screen: ScreenConfig,
}

impl Config {
    /// Check settings that would otherwise fail at request time
    pub fn validate(&self) -> Result<()> {
        if self.github.api_base_url.trim().is_empty() {
            return Err(Error::Config {
                message: "api_base_url must not be empty".to_string(),
                key: Some("api_base_url".to_string()),
            });
        }
        if url::Url::parse(&self.github.api_base_url).is_err() {
            return Err(Error::Config {
                message: format!("api_base_url is not a valid URL: {}", self.github.api_base_url),
                key: Some("api_base_url".to_string()),
            });
        }
        if self.github.per_page == 0 || self.github.per_page > MAX_PER_PAGE {
            return Err(Error::Config {
                message: format!("per_page must be between 1 and {}", MAX_PER_PAGE),
                key: Some("per_page".to_string()),
            });
        }
        if self.screen.event_capacity == 0 {
            return Err(Error::Config {
                message: "event_capacity must be greater than 0".to_string(),
                key: Some("event_capacity".to_string()),
            });
        }
        if self.storage.default_extension.is_empty()
            || !self
                .storage
                .default_extension
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::Config {
                message: "default_extension must be a non-empty alphanumeric string".to_string(),
                key: Some("default_extension".to_string()),
            });
        }
        Ok(())
    }

    /// Read a JSON config file; missing sections and fields take their defaults
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Overlay environment variables on top of this config
    ///
    /// Reads `GITHUB_TOKEN`, `GITHUB_API_URL` and `AVATAR_DIR`. Empty values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) = non_empty_env("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(url) = non_empty_env("GITHUB_API_URL") {
            self.github.api_base_url = url;
        }
        if let Some(dir) = non_empty_env("AVATAR_DIR") {
            self.storage.download_dir = PathBuf::from(dir);
        }
        self
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_min_followers() -> u64 {
    10_000
}

fn default_per_page() -> u32 {
    50
}

fn default_user_agent() -> String {
    concat!("gh-avatar-browser/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./avatars")
}

fn default_extension() -> String {
    "jpg".to_string()
}

fn default_title() -> String {
    "Welcome to the Coding Exercise".to_string()
}

fn default_unmount_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_event_capacity() -> usize {
    256
}

// Durations are stored as whole seconds
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.github.min_followers, 10_000);
        assert_eq!(config.github.per_page, 50);
        assert_eq!(config.storage.default_extension, "jpg");
        assert!(config.screen.variant.downloads_enabled());
        config.validate().unwrap();
    }

    #[test]
    fn test_search_url_encodes_query() {
        let config = GithubConfig {
            api_base_url: "https://api.github.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.search_url(),
            "https://api.github.com/search/users?q=followers%3A%3E10000%20sort%3Afollowers&per_page=50"
        );
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.github.api_base_url, "https://api.github.com");
        assert_eq!(config.storage.file_naming, FileNaming::LoginAndId);
        assert_eq!(config.screen.unmount_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_partial_json_overrides() {
        let json = r#"{
            "github": { "per_page": 10, "timeout": 3 },
            "storage": { "file_naming": "login" },
            "screen": { "variant": "browse" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.github.per_page, 10);
        assert_eq!(config.github.timeout, Duration::from_secs(3));
        assert_eq!(config.storage.file_naming, FileNaming::Login);
        assert!(!config.screen.variant.downloads_enabled());
    }

    #[test]
    fn test_from_file_reads_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, r#"{ "storage": { "download_dir": "/tmp/faces" } }"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage.download_dir, PathBuf::from("/tmp/faces"));
        assert_eq!(config.github.per_page, 50);
    }

    #[test]
    fn test_from_file_error_kinds() {
        let temp = tempfile::tempdir().unwrap();

        let missing = Config::from_file(temp.path().join("absent.json"));
        assert!(matches!(missing, Err(Error::Io(_))));

        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{ \"github\": ").unwrap();
        let broken = Config::from_file(&path);
        assert!(matches!(broken, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.github.per_page = 0;
        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("per_page")),
            other => panic!("expected config error, got {:?}", other),
        }

        let mut config = Config::default();
        config.github.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.screen.event_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.storage.default_extension = "../jpg".to_string();
        assert!(config.validate().is_err());
    }
}
