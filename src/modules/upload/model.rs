use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::common::error::{AppError, AppResult};

/// Container extensions we accept from client filenames. Everything else in
/// the untrusted filename (directories, traversal sequences, the stem) is
/// discarded; the id alone names the stored file.
const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v", "ts"];

/// One accepted upload. Immutable once created; the raw file is only ever
/// read after this point.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub id: Uuid,
    pub original_extension: String,
    pub raw_storage_path: PathBuf,
}

impl UploadedAsset {
    pub fn new(raw_dir: &Path, client_filename: &str) -> AppResult<Self> {
        let id = Uuid::new_v4();
        let original_extension = sanitize_extension(client_filename)?;
        let raw_storage_path = raw_dir.join(format!("{id}.{original_extension}"));
        Ok(Self {
            id,
            original_extension,
            raw_storage_path,
        })
    }
}

fn sanitize_extension(client_filename: &str) -> AppResult<String> {
    let ext = Path::new(client_filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| AppError::client("filename has no extension"))?;
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AppError::client(format!(
            "unsupported video container '.{ext}'"
        )));
    }
    Ok(ext)
}
