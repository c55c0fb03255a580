use crate::foundation::error::{AdreelError, AdreelResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Broad media category derived from a MIME content type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// `image/*`
    Image,
    /// `video/*`
    Video,
    /// `audio/*`
    Audio,
    /// Anything else (`text/plain`, `application/octet-stream`, ...).
    Other,
}

/// Where the bytes of a [`MediaAsset`] live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetPayload {
    /// Encoded bytes held in memory.
    Inline(Arc<Vec<u8>>),
    /// Remote locator that has to be downloaded before decoding.
    Url(String),
    /// Local file.
    File(PathBuf),
}

/// Opaque reference to generated or user-supplied media.
///
/// Assets are immutable once produced. Regenerating something yields a new asset; callers replace
/// their handle rather than mutating the old one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaAsset {
    content_type: String,
    payload: AssetPayload,
}

impl MediaAsset {
    /// Asset backed by encoded bytes.
    pub fn inline(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            payload: AssetPayload::Inline(Arc::new(bytes)),
        }
    }

    /// Asset backed by a remote URL.
    pub fn url(content_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            payload: AssetPayload::Url(url.into()),
        }
    }

    /// Asset backed by a local file; the content type is guessed from the extension.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = content_type_for_path(&path).to_string();
        Self {
            content_type,
            payload: AssetPayload::File(path),
        }
    }

    /// Asset backed by a local file with an explicit content type.
    pub fn file_with_type(content_type: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            content_type: content_type.into(),
            payload: AssetPayload::File(path.into()),
        }
    }

    /// Read a local file into an inline asset.
    pub fn read_file(path: impl AsRef<Path>) -> AdreelResult<Self> {
        let path = path.as_ref();
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read asset '{}'", path.display()))?;
        Ok(Self::inline(content_type_for_path(path), bytes))
    }

    /// MIME content type tag, e.g. `video/mp4`.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Payload location.
    pub fn payload(&self) -> &AssetPayload {
        &self.payload
    }

    /// Broad media category.
    pub fn kind(&self) -> MediaKind {
        let major = self.content_type.split('/').next().unwrap_or_default();
        match major {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }

    /// Inline bytes, if the payload is held in memory.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            AssetPayload::Inline(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    /// Encoded bytes of a local asset (inline or file). Remote assets are rejected.
    pub fn read_bytes(&self) -> AdreelResult<Vec<u8>> {
        match &self.payload {
            AssetPayload::Inline(b) => Ok(b.as_ref().clone()),
            AssetPayload::File(p) => {
                use anyhow::Context as _;
                let bytes = std::fs::read(p)
                    .with_context(|| format!("failed to read asset '{}'", p.display()))?;
                Ok(bytes)
            }
            AssetPayload::Url(url) => Err(AdreelError::validation(format!(
                "asset '{url}' is remote and must be downloaded before use"
            ))),
        }
    }

    /// `true` when the asset cannot possibly hold decodable content.
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            AssetPayload::Inline(b) => b.is_empty(),
            AssetPayload::Url(u) => u.trim().is_empty(),
            AssetPayload::File(p) => p.as_os_str().is_empty(),
        }
    }

    /// File extension matching the content type (without the dot).
    pub fn extension(&self) -> &'static str {
        extension_for_content_type(&self.content_type)
    }

    /// Return a local path for this asset, writing inline bytes below `dir` when needed.
    ///
    /// URL payloads are rejected; they must be downloaded through the gateway first.
    pub fn materialize(&self, dir: &Path, stem: &str) -> AdreelResult<PathBuf> {
        match &self.payload {
            AssetPayload::File(p) => Ok(p.clone()),
            AssetPayload::Inline(bytes) => {
                use anyhow::Context as _;
                std::fs::create_dir_all(dir).with_context(|| {
                    format!("failed to create asset directory '{}'", dir.display())
                })?;
                let path = dir.join(format!("{stem}.{}", self.extension()));
                std::fs::write(&path, bytes.as_slice())
                    .with_context(|| format!("failed to write asset '{}'", path.display()))?;
                Ok(path)
            }
            AssetPayload::Url(url) => Err(AdreelError::validation(format!(
                "asset '{url}' is remote and must be downloaded before use"
            ))),
        }
    }
}

/// Guess a MIME content type from a file extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// File extension for a MIME content type.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let base = content_type.split(';').next().unwrap_or_default().trim();
    match base {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/quicktime" => "mov",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/mpeg" => "mp3",
        "audio/ogg" => "ogg",
        "text/plain" => "txt",
        _ => "bin",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/asset.rs"]
mod tests;
