//! Cover and avatar files on disk.
//!
//! Cover filenames are derived from the item title alone, so whether a cover
//! is already present can be answered without touching the database. Two
//! titles that normalize to the same filename share (and overwrite) one file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{Result, StoreError};

pub const COVERS_DIR: &str = "covers";
pub const AVATARS_DIR: &str = "avatars";

/// Image extensions accepted for uploaded avatars.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

const COVER_SUFFIX: &str = "_cover.jpg";
const ILLEGAL_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Derives the cover filename for a title.
///
/// Spaces become underscores, the `_cover.jpg` suffix is appended, then
/// filesystem-illegal characters are removed.
///
/// ```
/// assert_eq!(store::cover_filename("A/B: Test"), "AB_Test_cover.jpg");
/// ```
pub fn cover_filename(title: &str) -> String {
    let joined = format!("{}{}", title.replace(' ', "_"), COVER_SUFFIX);
    joined.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect()
}

/// Reduces a client-supplied filename to a safe, flat name with an image
/// extension.
pub fn sanitize_upload_name(name: &str) -> Result<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', '_']).to_string();

    let extension = Path::new(&cleaned)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(cleaned),
        _ => Err(StoreError::invalid_field(
            "avatar",
            "only jpg, jpeg and png images are allowed",
        )),
    }
}

/// Media directory holding `covers/` and `avatars/`.
#[derive(Debug, Clone)]
pub struct ArtworkStorage {
    root: PathBuf,
}

impl ArtworkStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn covers_dir(&self) -> PathBuf {
        self.root.join(COVERS_DIR)
    }

    pub fn avatars_dir(&self) -> PathBuf {
        self.root.join(AVATARS_DIR)
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.covers_dir()).await?;
        tokio::fs::create_dir_all(self.avatars_dir()).await?;
        debug!("Media directories ready");
        Ok(())
    }

    pub fn cover_path(&self, title: &str) -> PathBuf {
        self.covers_dir().join(cover_filename(title))
    }

    pub async fn has_cover(&self, title: &str) -> bool {
        tokio::fs::try_exists(self.cover_path(title))
            .await
            .unwrap_or(false)
    }

    /// Stores cover bytes for `title` and returns the filename to record.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn write_cover(&self, title: &str, bytes: &[u8]) -> Result<String> {
        let filename = cover_filename(title);
        tokio::fs::create_dir_all(self.covers_dir()).await?;
        tokio::fs::write(self.covers_dir().join(&filename), bytes).await?;
        info!("Wrote cover '{}'", filename);
        Ok(filename)
    }

    /// Stores an uploaded avatar under its sanitized name.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn write_avatar(&self, upload_name: &str, bytes: &[u8]) -> Result<String> {
        let filename = sanitize_upload_name(upload_name)?;
        tokio::fs::create_dir_all(self.avatars_dir()).await?;
        tokio::fs::write(self.avatars_dir().join(&filename), bytes).await?;
        info!("Wrote avatar '{}'", filename);
        Ok(filename)
    }
}
