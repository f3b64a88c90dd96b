//! Core types for gh-avatar-browser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// GitHub account id, used as the stable row key
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Minimal identity + avatar record backing one list row
///
/// Entities are immutable once loaded; a re-fetch replaces the whole set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Unique account id (row key)
    pub id: UserId,
    /// Display name, also used to derive the saved file name
    pub login: String,
    /// Absolute URL of the avatar image
    pub avatar_url: String,
}

/// Wire shape of `GET /search/users`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub(crate) items: Vec<UserSummary>,
}

/// Screen view state
///
/// `Loading` is entered on mount and on refresh. `Populated` and `Failed`
/// are terminal until the next refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewState {
    /// Initial list request in flight
    Loading,
    /// List loaded, in upstream order
    Populated(Vec<UserSummary>),
    /// List request failed
    Failed {
        /// Human-readable failure message
        message: String,
    },
}

impl ViewState {
    /// Lightweight summary used in events
    pub fn kind(&self) -> StateKind {
        match self {
            ViewState::Loading => StateKind::Loading,
            ViewState::Populated(users) => StateKind::Populated { rows: users.len() },
            ViewState::Failed { message } => StateKind::Failed {
                message: message.clone(),
            },
        }
    }

    /// Users in the populated state, empty otherwise
    pub fn users(&self) -> &[UserSummary] {
        match self {
            ViewState::Populated(users) => users,
            ViewState::Loading | ViewState::Failed { .. } => &[],
        }
    }

    /// Look up a loaded user by row key
    pub fn user(&self, id: UserId) -> Option<&UserSummary> {
        self.users().iter().find(|u| u.id == id)
    }
}

/// Serializable summary of a [`ViewState`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StateKind {
    /// Loading spinner
    Loading,
    /// Populated list
    Populated {
        /// Number of rows
        rows: usize,
    },
    /// Error view
    Failed {
        /// Human-readable failure message
        message: String,
    },
}

/// Storage capability outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Writes allowed
    Granted,
    /// Writes refused
    Denied,
}

/// Event emitted by the screen
///
/// Subscribe via [`UserBrowserScreen::subscribe()`](crate::UserBrowserScreen::subscribe).
/// Ordering across different rows is not guaranteed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// View state changed; re-render
    StateChanged {
        /// New state summary
        state: StateKind,
    },

    /// Download task accepted for a row
    DownloadStarted {
        /// Row id
        id: UserId,
        /// User login
        login: String,
    },

    /// Avatar saved to disk
    DownloadSaved {
        /// Row id
        id: UserId,
        /// User login
        login: String,
        /// Final file path
        path: PathBuf,
        /// Bytes written
        bytes: u64,
        /// Completion time
        saved_at: DateTime<Utc>,
    },

    /// Avatar download failed
    DownloadFailed {
        /// Row id
        id: UserId,
        /// User login
        login: String,
        /// Error message
        error: String,
    },

    /// Storage capability refused; nothing was fetched
    PermissionDenied {
        /// Row id
        id: UserId,
        /// User login
        login: String,
    },

    /// Download aborted because the screen unmounted
    DownloadCancelled {
        /// Row id
        id: UserId,
        /// User login
        login: String,
    },

    /// Screen unmounted; no further events
    Unmounted,
}

impl Event {
    /// Modal notice the host should display for this event, if any
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Event::PermissionDenied { .. } => Some(Notice {
                title: "Permission Denied!".to_string(),
                message: "You need to grant media permissions to download images.".to_string(),
            }),
            Event::DownloadSaved { login, path, .. } => Some(Notice {
                title: "Success".to_string(),
                message: format!("Image for {} saved at {}", login, path.display()),
            }),
            Event::DownloadFailed { login, .. } => Some(Notice {
                title: "Error".to_string(),
                message: format!("Failed to download image for {}.", login),
            }),
            Event::StateChanged { .. }
            | Event::DownloadStarted { .. }
            | Event::DownloadCancelled { .. }
            | Event::Unmounted => None,
        }
    }
}

/// Transient modal notice (title + body)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Notice title
    pub title: String,
    /// Notice body
    pub message: String,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.title, self.message)
    }
}
