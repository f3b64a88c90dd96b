//! # gh-avatar-browser
//!
//! Headless controller for a "top GitHub users" screen: it loads the most-followed
//! accounts, exposes them as a renderable list, and downloads individual avatars
//! to local storage on demand.
//!
//! ## Design
//!
//! - **Headless** - the screen produces a [`View`] and [`Event`]s; any UI can host it
//! - **Lifetime-scoped** - every task the screen spawns is cancelled on [`UserBrowserScreen::unmount`]
//! - **Isolated failures** - a failed download only produces a notice for that row
//! - **Atomic writes** - avatars are written to a temp file and renamed into place
//!
//! ## Quick Start
//!
//! ```no_run
//! use gh_avatar_browser::{Config, UserBrowserScreen};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let screen = UserBrowserScreen::new(Config::default())?;
//!
//!     let mut events = screen.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Some(notice) = event.notice() {
//!                 println!("{}", notice);
//!             }
//!         }
//!     });
//!
//!     screen.mount().await?.await?;
//!     println!("{}", screen.view().await);
//!     screen.unmount().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// GitHub HTTP client
pub mod github;
/// Storage permission gate
pub mod permission;
/// View rendering
pub mod render;
/// Screen controller
pub mod screen;
/// Avatar file storage
pub mod storage;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, FileNaming, GithubConfig, ScreenConfig, ScreenVariant, StorageConfig};
pub use error::{DownloadError, Error, FetchError, Result};
pub use permission::{AlwaysDenied, AlwaysGranted, StoragePermission, WritableDirPermission};
pub use render::{DownloadControl, Row, View};
pub use screen::UserBrowserScreen;
pub use types::{Event, Notice, PermissionStatus, StateKind, UserId, UserSummary, ViewState};

/// Unmount `screen` once the process is asked to stop
///
/// See [`wait_for_signal`] for which signals count.
pub async fn run_until_signal(screen: UserBrowserScreen) -> Result<()> {
    wait_for_signal().await;
    tracing::info!("Stop requested, unmounting screen");
    screen.unmount().await
}

/// Resolve on SIGTERM or SIGINT
///
/// A signal whose handler cannot be installed is simply not waited for. If
/// neither can be installed, falls back to `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut handlers = Vec::with_capacity(2);
    for (kind, name) in [
        (SignalKind::terminate(), "SIGTERM"),
        (SignalKind::interrupt(), "SIGINT"),
    ] {
        match signal(kind) {
            Ok(stream) => handlers.push((stream, name)),
            Err(e) => tracing::warn!(signal = name, error = %e, "Signal handler unavailable"),
        }
    }

    if handlers.is_empty() {
        tracing::warn!("No signal handlers installed, waiting for ctrl_c instead");
        wait_for_ctrl_c().await;
        return;
    }

    let name = first_signal(handlers).await;
    tracing::info!(signal = name, "Stop signal received");
}

/// Wait until any of `handlers` fires and return its name
#[cfg(unix)]
async fn first_signal(handlers: Vec<(tokio::signal::unix::Signal, &'static str)>) -> &'static str {
    let waits = handlers.into_iter().map(|(mut stream, name)| {
        Box::pin(async move {
            stream.recv().await;
            name
        })
    });
    let (name, _, _) = futures::future::select_all(waits).await;
    name
}

/// Resolve on SIGTERM or SIGINT
///
/// Off Unix only Ctrl+C is observed.
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Ctrl+C received"),
        Err(e) => tracing::error!(error = %e, "Ctrl+C listener failed, stopping now"),
    }
}
