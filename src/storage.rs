use std::path::{Path, PathBuf};

use log::warn;
use tokio::fs;
use uuid::Uuid;

pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "ogg", "aac"];

/// Suffix carried by files that were written but whose metadata row has not
/// been committed yet. The sweep deletes leftovers at boot.
pub const STAGING_SUFFIX: &str = "part";

pub fn extension_allowed(ext: &str) -> bool {
    AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str())
}

pub fn content_type_for(relative_url: &str) -> &'static str {
    match Path::new(relative_url)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("aac") => "audio/aac",
        _ => "application/octet-stream",
    }
}

/// A staged upload: the bytes are on disk under a `.part` name; the final
/// name only appears once the database row is committed.
pub struct StagedFile {
    pub relative_url: String,
    pub staged_path: PathBuf,
    pub final_path: PathBuf,
}

pub async fn stage_audio(root: &Path, ext: &str, bytes: &[u8]) -> std::io::Result<StagedFile> {
    let dir = root.join("music");
    fs::create_dir_all(&dir).await?;

    let file_name = format!("{}.{}", Uuid::new_v4(), ext.to_ascii_lowercase());
    let final_path = dir.join(&file_name);
    let staged_path = dir.join(format!("{}.{}", file_name, STAGING_SUFFIX));
    fs::write(&staged_path, bytes).await?;

    Ok(StagedFile {
        relative_url: format!("music/{}", file_name),
        staged_path,
        final_path,
    })
}

impl StagedFile {
    /// Atomically move the staged file into its final place.
    pub async fn commit(&self) -> std::io::Result<()> {
        fs::rename(&self.staged_path, &self.final_path).await
    }

    /// Drop the staged file after a failed metadata insert.
    pub async fn discard(&self) {
        if let Err(err) = fs::remove_file(&self.staged_path).await {
            warn!(
                "could not remove staged file {}: {}",
                self.staged_path.display(),
                err
            );
        }
    }
}

pub fn resolve(root: &Path, relative_url: &str) -> PathBuf {
    root.join(relative_url)
}

/// Delete a stored file; failures are logged and swallowed, matching the
/// delete-song contract.
pub async fn remove_media(root: &Path, relative_url: &str) {
    let path = resolve(root, relative_url);
    if let Err(err) = fs::remove_file(&path).await {
        warn!("could not delete {}: {}", path.display(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("soundconnect-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn known_extensions_are_allowed() {
        assert!(extension_allowed("mp3"));
        assert!(extension_allowed("MP3"));
        assert!(extension_allowed("flac"));
        assert!(!extension_allowed("exe"));
        assert!(!extension_allowed(""));
    }

    #[test]
    fn content_types_follow_the_extension() {
        assert_eq!(content_type_for("music/a.mp3"), "audio/mpeg");
        assert_eq!(content_type_for("music/a.OGG"), "audio/ogg");
        assert_eq!(content_type_for("music/a"), "application/octet-stream");
    }

    #[tokio::test]
    async fn staging_commit_moves_the_file_into_place() {
        let root = scratch_dir();
        let staged = stage_audio(&root, "mp3", b"abc").await.unwrap();
        assert!(staged.staged_path.exists());
        assert!(!staged.final_path.exists());
        assert!(staged.relative_url.starts_with("music/"));
        assert!(staged.relative_url.ends_with(".mp3"));

        staged.commit().await.unwrap();
        assert!(!staged.staged_path.exists());
        assert!(staged.final_path.exists());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn staging_discard_removes_the_file() {
        let root = scratch_dir();
        let staged = stage_audio(&root, "wav", b"abc").await.unwrap();
        staged.discard().await;
        assert!(!staged.staged_path.exists());
        assert!(!staged.final_path.exists());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
