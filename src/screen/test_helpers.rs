//! Shared test helpers for creating UserBrowserScreen instances in tests.

use crate::config::{Config, FileNaming, GithubConfig, ScreenConfig, ScreenVariant, StorageConfig};
use crate::permission::StoragePermission;
use crate::screen::UserBrowserScreen;
use crate::types::{Event, PermissionStatus};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Permission gate that records how often it was asked
pub(crate) struct CountingPermission {
    status: PermissionStatus,
    pub(crate) calls: AtomicUsize,
}

impl CountingPermission {
    pub(crate) fn new(status: PermissionStatus) -> Arc<Self> {
        Arc::new(Self {
            status,
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoragePermission for CountingPermission {
    async fn request(&self) -> PermissionStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.status
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}

/// Config pointing at `server` and writing into `dir`
pub(crate) fn test_config(server: &MockServer, dir: &std::path::Path) -> Config {
    Config {
        github: GithubConfig {
            api_base_url: server.uri(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        },
        storage: StorageConfig {
            download_dir: dir.join("avatars"),
            file_naming: FileNaming::Login,
            ..Default::default()
        },
        screen: ScreenConfig {
            variant: ScreenVariant::BrowseWithDownloads,
            unmount_timeout: Duration::from_secs(2),
            ..Default::default()
        },
    }
}

/// Screen against `server` with the given permission gate.
/// Returns the screen and the tempdir (which must be kept alive).
pub(crate) fn create_test_screen(
    server: &MockServer,
    permission: Arc<dyn StoragePermission>,
) -> (UserBrowserScreen, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(server, temp_dir.path());
    let screen = UserBrowserScreen::with_permission(config, permission).unwrap();
    (screen, temp_dir)
}

/// Search response body with `logins`; ids are 100, 101, ... in order
pub(crate) fn search_body(server: &MockServer, logins: &[&str]) -> serde_json::Value {
    let items: Vec<_> = logins
        .iter()
        .enumerate()
        .map(|(i, login)| {
            serde_json::json!({
                "id": 100 + i as u64,
                "login": login,
                "avatar_url": format!("{}/avatars/{}", server.uri(), login),
                "type": "User"
            })
        })
        .collect();
    serde_json::json!({
        "total_count": logins.len(),
        "incomplete_results": false,
        "items": items
    })
}

/// Mount a successful search returning `logins`
pub(crate) async fn mount_search(server: &MockServer, logins: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(server, logins)))
        .mount(server)
        .await;
}

/// Mount a JPEG avatar for `login`
pub(crate) async fn mount_avatar(server: &MockServer, login: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/avatars/{}", login)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(body.to_vec()),
        )
        .mount(server)
        .await;
}

/// Mount and load; panics unless the screen ends up populated
pub(crate) async fn mounted_screen(
    server: &MockServer,
    logins: &[&str],
    permission: Arc<dyn StoragePermission>,
) -> (UserBrowserScreen, tempfile::TempDir) {
    mount_search(server, logins).await;
    let (screen, temp_dir) = create_test_screen(server, permission);
    screen.mount().await.unwrap().await.unwrap();
    assert_eq!(screen.state().await.users().len(), logins.len());
    (screen, temp_dir)
}

/// Wait for the first event matching `pred`, failing after five seconds
pub(crate) async fn wait_for_event<F>(rx: &mut broadcast::Receiver<Event>, mut pred: F) -> Event
where
    F: FnMut(&Event) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.unwrap();
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

/// Collect every event currently buffered in `rx`
pub(crate) fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// File names in `dir`, sorted; empty if the directory does not exist
pub(crate) fn list_dir(dir: &std::path::Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<_> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
