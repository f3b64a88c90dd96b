//! Per-row avatar downloads: permission → fetch → base64 → atomic write.

use crate::error::{DownloadError, Error, Result};
use crate::storage::SavedAvatar;
use crate::types::{Event, PermissionStatus, UserId, UserSummary};
use tokio::task::JoinHandle;

use super::UserBrowserScreen;

impl UserBrowserScreen {
    /// Start downloading the avatar of row `id`
    ///
    /// Returns as soon as the task is spawned; the outcome arrives as an
    /// [`Event`] carrying a [`Notice`](crate::Notice). Fails immediately when:
    /// - the screen is the browse-only variant (`NotSupported`)
    /// - the screen is unmounting (`ShuttingDown`)
    /// - `id` is not in the populated list (`UnknownUser`)
    /// - a download for the row is already running (`AlreadyInFlight`); the
    ///   running task is left untouched
    pub async fn download_avatar(&self, id: UserId) -> Result<JoinHandle<()>> {
        if !self.config.screen.variant.downloads_enabled() {
            return Err(Error::NotSupported(
                "avatar downloads are disabled for this screen".to_string(),
            ));
        }
        self.ensure_accepting()?;

        let user = self
            .view
            .state
            .read()
            .await
            .user(id)
            .cloned()
            .ok_or(DownloadError::UnknownUser { id })?;

        let mut active = self.tasks.active_downloads.lock().await;
        if active.contains_key(&id) {
            tracing::debug!(user_id = id.0, login = %user.login, "Download already running, ignoring");
            return Err(DownloadError::AlreadyInFlight { login: user.login }.into());
        }
        let cancel = self.tasks.lifetime.child_token();
        active.insert(id, cancel.clone());

        self.emit(Event::DownloadStarted {
            id,
            login: user.login.clone(),
        });

        let screen = self.clone();
        let handle = tokio::spawn(async move {
            let result: Result<SavedAvatar> = tokio::select! {
                _ = cancel.cancelled() => Err(Error::Download(DownloadError::Cancelled {
                    login: user.login.clone(),
                })),
                result = screen.run_download(&user) => result,
            };

            screen.tasks.active_downloads.lock().await.remove(&user.id);
            screen.report_download(&user, result);
        });
        drop(active);

        Ok(handle)
    }

    /// One download attempt; no retries
    async fn run_download(&self, user: &UserSummary) -> Result<SavedAvatar> {
        match self.services.permission.request().await {
            PermissionStatus::Granted => {}
            PermissionStatus::Denied => return Err(Error::PermissionDenied),
        }

        let payload = self.services.client.fetch_avatar(user).await?;
        let encoded = payload.to_base64();
        let saved = self
            .services
            .store
            .write_base64(user, &encoded, payload.extension())
            .await?;

        Ok(saved)
    }

    fn report_download(&self, user: &UserSummary, result: Result<SavedAvatar>) {
        let id = user.id;
        let login = user.login.clone();

        let event = match result {
            Ok(saved) => {
                tracing::info!(
                    user_id = id.0,
                    login = %login,
                    path = %saved.path.display(),
                    bytes = saved.bytes,
                    "Avatar saved"
                );
                Event::DownloadSaved {
                    id,
                    login,
                    path: saved.path,
                    bytes: saved.bytes,
                    saved_at: chrono::Utc::now(),
                }
            }
            Err(Error::PermissionDenied) => {
                tracing::warn!(user_id = id.0, login = %login, "Storage permission denied");
                Event::PermissionDenied { id, login }
            }
            Err(Error::Download(DownloadError::Cancelled { .. })) => {
                tracing::info!(user_id = id.0, login = %login, "Avatar download cancelled");
                Event::DownloadCancelled { id, login }
            }
            Err(e) => {
                tracing::error!(user_id = id.0, login = %login, error = %e, "Failed to download image");
                Event::DownloadFailed {
                    id,
                    login,
                    error: e.to_string(),
                }
            }
        };

        self.emit(event);
    }
}
