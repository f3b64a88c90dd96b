//! Mock GitHub server and screen construction

use gh_avatar_browser::config::{FileNaming, GithubConfig, ScreenConfig, StorageConfig};
use gh_avatar_browser::{Config, StoragePermission, UserBrowserScreen};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// JPEG magic followed by filler
pub const FAKE_JPEG: &[u8] = b"\xFF\xD8\xFF\xE0fake-jpeg-body";

/// Mock GitHub API serving a search result and one avatar per login
pub struct FakeGithub {
    pub server: MockServer,
}

impl FakeGithub {
    /// Start a server whose search returns `logins` (ids 1, 2, ...) and whose
    /// avatar endpoint serves [`FAKE_JPEG`] for each of them
    pub async fn start(logins: &[&str]) -> Self {
        let server = MockServer::start().await;

        let items: Vec<_> = logins
            .iter()
            .enumerate()
            .map(|(i, login)| {
                serde_json::json!({
                    "login": login,
                    "id": i as u64 + 1,
                    "avatar_url": format!("{}/u/{}", server.uri(), login),
                    "site_admin": false
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/search/users"))
            .and(query_param("q", "followers:>10000 sort:followers"))
            .and(query_param("per_page", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": logins.len(),
                "incomplete_results": false,
                "items": items
            })))
            .mount(&server)
            .await;

        for login in logins {
            Mock::given(method("GET"))
                .and(path(format!("/u/{}", login)))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("content-type", "image/jpeg")
                        .set_body_bytes(FAKE_JPEG.to_vec()),
                )
                .mount(&server)
                .await;
        }

        Self { server }
    }

    /// Config pointing at this server, storing avatars under `dir/avatars`
    pub fn config(&self, dir: &TempDir, naming: FileNaming) -> Config {
        Config {
            github: GithubConfig {
                api_base_url: self.server.uri(),
                timeout: Duration::from_secs(5),
                ..Default::default()
            },
            storage: StorageConfig {
                download_dir: avatar_dir(dir),
                file_naming: naming,
                ..Default::default()
            },
            screen: ScreenConfig {
                unmount_timeout: Duration::from_secs(2),
                ..Default::default()
            },
        }
    }
}

/// Directory avatars are written to for `dir`
pub fn avatar_dir(dir: &TempDir) -> PathBuf {
    dir.path().join("avatars")
}

/// Create and mount a screen, waiting for the list load to finish
pub async fn mounted(config: Config, permission: Arc<dyn StoragePermission>) -> UserBrowserScreen {
    let screen = UserBrowserScreen::with_permission(config, permission).unwrap();
    screen.mount().await.unwrap().await.unwrap();
    screen
}
