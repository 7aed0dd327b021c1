use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_recursion::async_recursion;
use log::{error, info, warn};
use sea_orm::{ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter};
use stopwatch::Stopwatch;
use tokio::fs;

use entities::prelude::Song;
use entities::song;

use crate::storage::STAGING_SUFFIX;

/// Boot-time reconciliation between the storage tree and the songs table.
///
/// A crash can leave either a staged file without a row (the rename never
/// happened) or a row without a file (the disk lost it). Stale staged files
/// are deleted, rows without a file are deactivated, and stray files are
/// only counted; nothing here may abort startup.
pub async fn run(connection: &DatabaseConnection, root: &Path) {
    let sw = Stopwatch::start_new();

    let mut files = Vec::new();
    collect_files(root, &mut files).await;

    let mut staged_removed = 0usize;
    let mut present: HashSet<PathBuf> = HashSet::new();
    for file in files {
        let is_staged = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(STAGING_SUFFIX))
            .unwrap_or(false);
        if is_staged {
            match fs::remove_file(&file).await {
                Ok(()) => staged_removed += 1,
                Err(err) => warn!("could not remove stale staging file {}: {}", file.display(), err),
            }
        } else {
            present.insert(file);
        }
    }

    let songs = match Song::find()
        .filter(song::Column::Active.eq(true))
        .all(connection)
        .await
    {
        Ok(songs) => songs,
        Err(err) => {
            error!("storage sweep could not load songs: {}", err);
            return;
        }
    };

    let referenced: HashSet<PathBuf> = songs
        .iter()
        .map(|s| root.join(&s.file_url))
        .collect();

    let mut deactivated = 0usize;
    for song_row in songs {
        let path = root.join(&song_row.file_url);
        if present.contains(&path) {
            continue;
        }
        let id = song_row.id;
        let mut active_model = song_row.into_active_model();
        active_model.active = ActiveValue::Set(false);
        match active_model.update(connection).await {
            Ok(_) => {
                warn!("song {} lost its audio file, deactivated", id);
                deactivated += 1;
            }
            Err(err) => error!("could not deactivate song {}: {}", id, err),
        }
    }

    let orphans = present
        .iter()
        .filter(|path| !referenced.contains(*path))
        .count();

    info!(
        "storage sweep: {} staged files removed, {} songs deactivated, {} unreferenced files, {}ms",
        staged_removed,
        deactivated,
        orphans,
        sw.elapsed_ms()
    );
}

#[async_recursion]
async fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot read directory {}: {}", dir.display(), err);
            return;
        }
    };

    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => collect_files(&path, out).await,
            Ok(_) => out.push(path),
            Err(err) => warn!("cannot stat {}: {}", path.display(), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collect_files_walks_nested_directories() {
        let root = std::env::temp_dir().join(format!("soundconnect-sweep-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("music/inner")).unwrap();
        std::fs::write(root.join("music/a.mp3"), b"x").unwrap();
        std::fs::write(root.join("music/inner/b.mp3"), b"x").unwrap();

        let mut files = Vec::new();
        collect_files(&root, &mut files).await;
        files.sort();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("music/a.mp3"));
        assert!(files[1].ends_with("music/inner/b.mp3"));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn collect_files_of_missing_directory_is_empty() {
        let mut files = Vec::new();
        collect_files(Path::new("/no/such/dir"), &mut files).await;
        assert!(files.is_empty());
    }
}
