//! Avatar file storage with atomic writes
//!
//! Payloads arrive base64-encoded, are decoded, written to a hidden `.part`
//! sibling, flushed, and renamed into place. A reader never sees a
//! half-written avatar, and an interrupted write leaves nothing behind.

use crate::config::{FileNaming, StorageConfig};
use crate::error::DownloadError;
use crate::types::UserSummary;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Fallback stem when a login sanitizes to nothing
const FALLBACK_STEM: &str = "user";

/// Result of a successful write
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedAvatar {
    /// Final file path
    pub path: PathBuf,
    /// Decoded bytes written
    pub bytes: u64,
}

/// Writes avatar payloads into the configured directory
#[derive(Debug)]
pub struct AvatarStore {
    config: StorageConfig,
    // Distinguishes temp files of concurrent writes to the same final path
    write_seq: AtomicU64,
}

impl AvatarStore {
    /// Create a store for `config.download_dir`
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            write_seq: AtomicU64::new(0),
        }
    }

    /// File name for `user`, using `extension` or the configured default
    pub fn file_name_for(&self, user: &UserSummary, extension: Option<&str>) -> String {
        let ext = extension.unwrap_or(&self.config.default_extension);
        let stem = match self.config.file_naming {
            FileNaming::Login => sanitize_login(&user.login),
            FileNaming::Id => user.id.to_string(),
            FileNaming::LoginAndId => format!("{}-{}", sanitize_login(&user.login), user.id),
        };
        format!("{}.{}", stem, ext)
    }

    /// Full destination path for `user`
    pub fn path_for(&self, user: &UserSummary, extension: Option<&str>) -> PathBuf {
        self.config
            .download_dir
            .join(self.file_name_for(user, extension))
    }

    /// Decode `encoded` and atomically write it as `user`'s avatar
    pub async fn write_base64(
        &self,
        user: &UserSummary,
        encoded: &str,
        extension: Option<&str>,
    ) -> Result<SavedAvatar, DownloadError> {
        let data = STANDARD
            .decode(encoded)
            .map_err(|e| DownloadError::Encoding {
                login: user.login.clone(),
                reason: e.to_string(),
            })?;

        let final_path = self.path_for(user, extension);
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let temp_path = temp_path_for(&final_path, seq);
        let bytes = data.len() as u64;

        // One blocking job: cancelling the caller cannot split create from cleanup
        let dir = self.config.download_dir.clone();
        let dest = final_path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &temp_path, &dest, &data))
            .await
            .map_err(|e| DownloadError::Write {
                path: final_path.clone(),
                source: std::io::Error::other(e),
            })??;

        tracing::debug!(
            user_id = user.id.0,
            path = %final_path.display(),
            bytes,
            "Avatar written"
        );

        Ok(SavedAvatar {
            path: final_path,
            bytes,
        })
    }
}

fn write_atomically(
    dir: &Path,
    temp_path: &Path,
    final_path: &Path,
    data: &[u8],
) -> Result<(), DownloadError> {
    std::fs::create_dir_all(dir).map_err(|source| DownloadError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let guard = TempFileGuard::new(temp_path.to_path_buf());
    write_file(temp_path, data).map_err(|source| DownloadError::Write {
        path: temp_path.to_path_buf(),
        source,
    })?;
    std::fs::rename(temp_path, final_path).map_err(|source| DownloadError::Write {
        path: final_path.to_path_buf(),
        source,
    })?;
    guard.disarm();
    Ok(())
}

fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path_for(final_path: &Path, seq: u64) -> PathBuf {
    let name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(FALLBACK_STEM);
    final_path.with_file_name(format!(".{}.{}.{}.part", name, std::process::id(), seq))
}

/// Replace anything outside `[A-Za-z0-9._-]` and strip leading dots
pub fn sanitize_login(login: &str) -> String {
    let cleaned: String = login
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Removes the temp file on drop unless the rename completed
struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn disarm(mut self) {
        self.path = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial avatar file");
        }
    }
}
