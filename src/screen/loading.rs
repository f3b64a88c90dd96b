//! List loading and the `Loading → {Populated, Failed}` state machine.

use crate::error::Result;
use crate::types::{Event, UserSummary, ViewState};
use std::sync::atomic::Ordering;
use tokio::task::JoinHandle;

use super::UserBrowserScreen;

impl UserBrowserScreen {
    /// Fetch the user list once, without touching the view state
    ///
    /// Users come back in upstream order (descending follower count) and are
    /// never re-sorted.
    pub async fn load_users(&self) -> Result<Vec<UserSummary>> {
        Ok(self.services.client.search_top_users().await?)
    }

    /// Reset to `Loading` and re-run the list request
    ///
    /// Returns the handle of the spawned load task. If several loads overlap,
    /// only the most recent one may update the view. The task stops early if the
    /// screen unmounts.
    pub async fn refresh(&self) -> Result<JoinHandle<()>> {
        let generation = self.view.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(ViewState::Loading).await?;

        let screen = self.clone();
        let cancel = self.tasks.lifetime.child_token();
        Ok(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(generation, "List load cancelled");
                }
                result = screen.load_users() => {
                    screen.apply_load_result(generation, result).await;
                }
            }
        }))
    }

    async fn apply_load_result(&self, generation: u64, result: Result<Vec<UserSummary>>) {
        let next = match result {
            Ok(users) => {
                tracing::info!(rows = users.len(), "User list loaded");
                ViewState::Populated(users)
            }
            Err(e) => {
                tracing::warn!(error = %e, "User list failed to load");
                ViewState::Failed {
                    message: e.user_message(),
                }
            }
        };

        let mut state = self.view.state.write().await;
        // Checked under the write lock so a newer refresh cannot interleave
        if self.view.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Discarding stale list load");
            return;
        }
        if !self.tasks.accepting_new.load(Ordering::SeqCst) {
            return;
        }
        let kind = next.kind();
        *state = next;
        // Emitted under the lock so it cannot trail `Unmounted`
        self.emit(Event::StateChanged { state: kind });
    }

    /// Replace the state unless the screen is unmounting
    pub(crate) async fn set_state(&self, next: ViewState) -> Result<()> {
        let mut state = self.view.state.write().await;
        // unmount() clears the flag before it takes this lock
        self.ensure_accepting()?;
        let kind = next.kind();
        *state = next;
        self.emit(Event::StateChanged { state: kind });
        Ok(())
    }
}
