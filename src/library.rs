use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::quality::QualityTier;

/// A rendered video folder: `media/videos/<topic>/<resolution>/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creation {
    pub topic: String,
    pub resolution: String,
    pub path: PathBuf,
    pub created: DateTime<Local>,
}

impl Creation {
    /// Quality tier matching the folder name, if it is one of ours
    pub fn quality(&self) -> Option<QualityTier> {
        QualityTier::from_resolution_label(&self.resolution)
    }
}

/// List rendered creations under `videos_dir`, newest first.
///
/// Unreadable folders and resolution folders without files are skipped.
pub async fn scan_creations<P: AsRef<Path>>(videos_dir: P) -> Result<Vec<Creation>> {
    let videos_dir = videos_dir.as_ref();
    let mut creations = Vec::new();

    if !fs::try_exists(videos_dir).await? {
        return Ok(creations);
    }

    let mut topics = fs::read_dir(videos_dir).await?;
    while let Some(topic_entry) = topics.next_entry().await? {
        if !is_visible_dir(&topic_entry).await {
            continue;
        }
        let topic = topic_entry.file_name().to_string_lossy().to_string();

        let Ok(mut resolutions) = fs::read_dir(topic_entry.path()).await else {
            debug!("Skipping unreadable topic folder {}", topic_entry.path().display());
            continue;
        };
        while let Ok(Some(resolution_entry)) = resolutions.next_entry().await {
            if !is_visible_dir(&resolution_entry).await {
                continue;
            }
            let path = resolution_entry.path();
            let Some(created) = newest_file_time(&path).await else {
                continue;
            };

            creations.push(Creation {
                topic: topic.clone(),
                resolution: resolution_entry.file_name().to_string_lossy().to_string(),
                path,
                created: DateTime::<Local>::from(created),
            });
        }
    }

    creations.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(creations)
}

async fn is_visible_dir(entry: &fs::DirEntry) -> bool {
    let hidden = entry.file_name().to_string_lossy().starts_with('.');
    let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
    is_dir && !hidden
}

/// Modification time of the newest visible file in `dir`
async fn newest_file_time(dir: &Path) -> Option<SystemTime> {
    let mut entries = fs::read_dir(dir).await.ok()?;
    let mut newest: Option<SystemTime> = None;

    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let Ok(metadata) = entry.metadata().await else { continue };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        newest = Some(newest.map_or(modified, |current| current.max(modified)));
    }

    newest
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::time::Duration;

    fn write(file: &assert_fs::fixture::ChildPath, content: &str) {
        std::fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        file.write_str(content).unwrap();
    }

    fn touch_at(file: &assert_fs::fixture::ChildPath, seconds_after_epoch: u64) {
        write(file, "video");
        let handle = std::fs::File::options().write(true).open(file.path()).unwrap();
        handle
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds_after_epoch))
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_library_is_empty() {
        let temp = assert_fs::TempDir::new().unwrap();
        let creations = scan_creations(temp.child("media/videos").path()).await.unwrap();
        assert!(creations.is_empty());
    }

    #[tokio::test]
    async fn test_creations_sorted_newest_first() {
        let temp = assert_fs::TempDir::new().unwrap();
        let videos = temp.child("media/videos");

        touch_at(&videos.child("pythagoras/1080p60/NarratedScene.mp4"), 1_700_000_000);
        touch_at(&videos.child("fourier/480p15/NarratedScene.mp4"), 1_750_000_000);
        touch_at(&videos.child("fourier/2160p60/NarratedScene.mp4"), 1_600_000_000);
        videos.child("empty_topic/720p30").create_dir_all().unwrap();
        write(&videos.child(".hidden/1080p60/NarratedScene.mp4"), "x");
        write(&videos.child("stray_file.mp4"), "x");

        let creations = scan_creations(videos.path()).await.unwrap();
        let summary: Vec<(&str, &str)> = creations
            .iter()
            .map(|c| (c.topic.as_str(), c.resolution.as_str()))
            .collect();

        assert_eq!(
            summary,
            vec![("fourier", "480p15"), ("pythagoras", "1080p60"), ("fourier", "2160p60")]
        );
        assert_eq!(creations[1].quality(), Some(QualityTier::High));
        assert_eq!(creations[0].path, videos.child("fourier/480p15").path());
    }
}
