//! The user browser screen, split into focused submodules:
//! - [`loading`] - list fetch and the `Loading → {Populated, Failed}` state machine
//! - [`download`] - per-row avatar download tasks
//! - [`lifecycle`] - mount/unmount and cancellation

mod download;
mod lifecycle;
mod loading;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::GithubClient;
use crate::permission::{StoragePermission, WritableDirPermission};
use crate::render::{self, View};
use crate::storage::AvatarStore;
use crate::types::{Event, UserId, ViewState};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64};
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio_util::sync::CancellationToken;

/// View state plus the generation of the load allowed to overwrite it
#[derive(Clone)]
pub(crate) struct ViewModel {
    /// Current view state
    pub(crate) state: Arc<RwLock<ViewState>>,
    /// Bumped on every load; results of older loads are dropped
    pub(crate) generation: Arc<AtomicU64>,
}

/// Background task bookkeeping scoped to the screen's lifetime
#[derive(Clone)]
pub(crate) struct TaskState {
    /// Parent of every load and download token; cancelled on unmount
    pub(crate) lifetime: CancellationToken,
    /// Running downloads keyed by row (at most one per row)
    pub(crate) active_downloads: Arc<Mutex<HashMap<UserId, CancellationToken>>>,
    /// Cleared on unmount
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Platform services the screen talks to
#[derive(Clone)]
pub(crate) struct Services {
    /// GitHub API client
    pub(crate) client: GithubClient,
    /// Storage-write capability gate
    pub(crate) permission: Arc<dyn StoragePermission>,
    /// Avatar file writer
    pub(crate) store: Arc<AvatarStore>,
}

/// Headless controller for the top-users screen (cloneable - all fields are Arc-wrapped)
///
/// # Example
///
/// ```no_run
/// use gh_avatar_browser::{Config, UserBrowserScreen};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let screen = UserBrowserScreen::new(Config::default())?;
/// let mut events = screen.subscribe();
/// screen.mount().await?.await?;
///
/// println!("{}", screen.view().await);
/// if let Some(first) = screen.state().await.users().first() {
///     screen.download_avatar(first.id).await?;
///     while let Ok(event) = events.recv().await {
///         if let Some(notice) = event.notice() {
///             println!("{}", notice);
///             break;
///         }
///     }
/// }
/// screen.unmount().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct UserBrowserScreen {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// HTTP, permission and storage services
    pub(crate) services: Services,
    /// View state
    pub(crate) view: ViewModel,
    /// Load and download task tracking
    pub(crate) tasks: TaskState,
}

impl UserBrowserScreen {
    /// Create a screen that gates writes on the download directory being writable
    ///
    /// The screen starts in [`ViewState::Loading`]; call [`mount()`](Self::mount)
    /// to issue the list request.
    pub fn new(config: Config) -> Result<Self> {
        let permission = Arc::new(WritableDirPermission::new(
            config.storage.download_dir.clone(),
        ));
        Self::with_permission(config, permission)
    }

    /// Create a screen with a custom storage permission gate
    pub fn with_permission(
        config: Config,
        permission: Arc<dyn StoragePermission>,
    ) -> Result<Self> {
        config.validate()?;

        let client = GithubClient::new(&config.github)?;
        let store = Arc::new(AvatarStore::new(config.storage.clone()));
        let (event_tx, _rx) = broadcast::channel(config.screen.event_capacity);

        tracing::info!(
            variant = ?config.screen.variant,
            permission = permission.name(),
            download_dir = %config.storage.download_dir.display(),
            "Screen created"
        );

        Ok(Self {
            config: Arc::new(config),
            event_tx,
            services: Services {
                client,
                permission,
                store,
            },
            view: ViewModel {
                state: Arc::new(RwLock::new(ViewState::Loading)),
                generation: Arc::new(AtomicU64::new(0)),
            },
            tasks: TaskState {
                lifetime: CancellationToken::new(),
                active_downloads: Arc::new(Mutex::new(HashMap::new())),
                accepting_new: Arc::new(AtomicBool::new(true)),
            },
        })
    }

    /// Subscribe to screen events
    ///
    /// Each subscriber receives every event sent after it subscribed. Slow
    /// subscribers that fall more than `event_capacity` events behind see a
    /// `Lagged` error and should re-read [`view()`](Self::view).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current view state
    pub async fn state(&self) -> ViewState {
        self.view.state.read().await.clone()
    }

    /// Rows with a running download
    pub async fn in_flight(&self) -> HashSet<UserId> {
        self.tasks
            .active_downloads
            .lock()
            .await
            .keys()
            .copied()
            .collect()
    }

    /// Render the current state
    pub async fn view(&self) -> View {
        let in_flight = self.in_flight().await;
        let state = self.view.state.read().await;
        render::render(
            &state,
            self.config.screen.variant,
            &in_flight,
            &self.config.screen.title,
        )
    }

    pub(crate) fn emit(&self, event: Event) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    pub(crate) fn ensure_accepting(&self) -> Result<()> {
        if self
            .tasks
            .accepting_new
            .load(std::sync::atomic::Ordering::SeqCst)
        {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }
}
