use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::common::error::{AppError, AppResult};

pub const MASTER_PLAYLIST_NAME: &str = "master.m3u8";
pub const VARIANT_PLAYLIST_NAME: &str = "playlist.m3u8";

/// On-disk shape of one asset's rendition tree. Derived purely from the
/// asset id and the ladder length; variant dir `i` holds ladder entry `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub root_dir: PathBuf,
    pub variant_dirs: Vec<PathBuf>,
    pub master_playlist_path: PathBuf,
}

impl OutputLayout {
    pub fn plan(hls_root: &Path, asset_id: Uuid, ladder_len: usize) -> Self {
        let root_dir = hls_root.join(asset_id.to_string());
        let variant_dirs = (0..ladder_len)
            .map(|i| root_dir.join(format!("v{i}")))
            .collect();
        let master_playlist_path = root_dir.join(MASTER_PLAYLIST_NAME);
        Self {
            root_dir,
            variant_dirs,
            master_playlist_path,
        }
    }

    /// Creates the full tree. ffmpeg does not create parent directories for
    /// segment outputs, so this must run before the encode. Safe to call
    /// again for the same asset.
    pub async fn ensure_dirs(&self) -> AppResult<()> {
        fs::create_dir_all(&self.root_dir)
            .await
            .map_err(|e| AppError::storage(self.root_dir.display().to_string(), e))?;
        for dir in &self.variant_dirs {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::storage(dir.display().to_string(), e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_is_deterministic_and_index_aligned() {
        let id = Uuid::new_v4();
        let a = OutputLayout::plan(Path::new("/data/hls"), id, 4);
        let b = OutputLayout::plan(Path::new("/data/hls"), id, 4);
        assert_eq!(a, b);
        assert_eq!(a.variant_dirs.len(), 4);
        assert_eq!(a.root_dir, Path::new("/data/hls").join(id.to_string()));
        for (i, dir) in a.variant_dirs.iter().enumerate() {
            assert_eq!(dir, &a.root_dir.join(format!("v{i}")));
        }
        assert_eq!(a.master_playlist_path, a.root_dir.join("master.m3u8"));
    }

    #[tokio::test]
    async fn ensure_dirs_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = OutputLayout::plan(tmp.path(), Uuid::new_v4(), 3);
        layout.ensure_dirs().await.unwrap();
        layout.ensure_dirs().await.unwrap();
        for dir in &layout.variant_dirs {
            assert!(dir.is_dir());
        }
    }
}
