//! Event helpers for integration tests

use gh_avatar_browser::{Event, Notice};
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;

/// Wait for the next event that carries a modal notice
pub async fn next_notice(events: &mut broadcast::Receiver<Event>) -> (Event, Notice) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.unwrap();
            if let Some(notice) = event.notice() {
                return (event, notice);
            }
        }
    })
    .await
    .expect("timed out waiting for a notice")
}

/// Sorted file names in `dir`
pub fn files_in(dir: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<_> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
