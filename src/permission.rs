//! Storage-write capability requests
//!
//! The screen asks a [`StoragePermission`] implementation before every
//! download. Hosts with a real permission prompt implement the trait; the
//! terminal front end uses [`WritableDirPermission`].

use crate::types::PermissionStatus;
use async_trait::async_trait;
use std::path::PathBuf;

/// Platform-mediated permission gate for local storage writes
///
/// # Examples
///
/// ```
/// use gh_avatar_browser::permission::{AlwaysGranted, StoragePermission};
/// use gh_avatar_browser::PermissionStatus;
///
/// # #[tokio::main]
/// # async fn main() {
/// let gate = AlwaysGranted;
/// assert_eq!(gate.request().await, PermissionStatus::Granted);
/// # }
/// ```
#[async_trait]
pub trait StoragePermission: Send + Sync {
    /// Ask for write access; may suspend while the user answers a prompt
    async fn request(&self) -> PermissionStatus;

    /// Name of this implementation (for logging)
    fn name(&self) -> &'static str;
}

/// Grants every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

#[async_trait]
impl StoragePermission for AlwaysGranted {
    async fn request(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn name(&self) -> &'static str {
        "always-granted"
    }
}

/// Refuses every request
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysDenied;

#[async_trait]
impl StoragePermission for AlwaysDenied {
    async fn request(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    fn name(&self) -> &'static str {
        "always-denied"
    }
}

/// Grants access when the target directory exists (or can be created) and is writable
///
/// Checked on every request, so fixing the directory and pressing download
/// again succeeds without restarting.
#[derive(Debug, Clone)]
pub struct WritableDirPermission {
    dir: PathBuf,
}

impl WritableDirPermission {
    /// Gate writes on `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl StoragePermission for WritableDirPermission {
    async fn request(&self) -> PermissionStatus {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot create avatar directory");
            return PermissionStatus::Denied;
        }

        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => {
                PermissionStatus::Granted
            }
            Ok(_) => {
                tracing::warn!(dir = %self.dir.display(), "Avatar directory is not writable");
                PermissionStatus::Denied
            }
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Cannot stat avatar directory");
                PermissionStatus::Denied
            }
        }
    }

    fn name(&self) -> &'static str {
        "writable-dir"
    }
}
