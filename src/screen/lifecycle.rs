//! Mount and unmount: the screen's lifetime bounds every task it spawns.

use crate::error::Result;
use crate::types::{Event, ViewState};
use std::sync::atomic::Ordering;
use tokio::task::JoinHandle;

use super::UserBrowserScreen;

impl UserBrowserScreen {
    /// Mount the screen: show the spinner and issue the list request
    ///
    /// Returns the load task's handle; awaiting it is optional.
    pub async fn mount(&self) -> Result<JoinHandle<()>> {
        tracing::info!(url = self.services.client.search_url(), "Mounting screen");
        self.refresh().await
    }

    /// Unmount the screen
    ///
    /// 1. Stop accepting loads and downloads
    /// 2. Cancel the in-flight load and every running download
    /// 3. Wait up to `unmount_timeout` for download tasks to finish cleanup
    /// 4. Discard the loaded list and emit [`Event::Unmounted`]
    ///
    /// Calling it again is a no-op.
    pub async fn unmount(&self) -> Result<()> {
        if !self.tasks.accepting_new.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::info!("Unmounting screen");

        self.tasks.lifetime.cancel();

        let timeout = self.config.screen.unmount_timeout;
        if tokio::time::timeout(timeout, self.wait_for_active_downloads())
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_ms = timeout.as_millis(),
                "Timeout waiting for downloads to stop, proceeding with unmount"
            );
        }

        let mut state = self.view.state.write().await;
        *state = ViewState::Loading;
        self.emit(Event::Unmounted);
        drop(state);

        tracing::info!("Screen unmounted");
        Ok(())
    }

    /// Whether [`unmount()`](Self::unmount) has been called
    pub fn is_unmounted(&self) -> bool {
        !self.tasks.accepting_new.load(Ordering::SeqCst)
    }

    async fn wait_for_active_downloads(&self) {
        loop {
            let active_count = self.tasks.active_downloads.lock().await.len();
            if active_count == 0 {
                return;
            }

            tracing::debug!(active_count, "Waiting for downloads to stop");
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    }
}
