use async_trait::async_trait;
use axum::body::{Body, Bytes};
use futures_util::stream;
use std::{
    collections::HashMap,
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, io::AsyncReadExt};

use crate::error::GatewayError;

/// Fallback for extensions missing from the table below.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Size of each chunk read from disk while streaming a file.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// MediaContent
///
/// Where the bytes of a media object come from. Files are streamed from an open
/// handle; in-memory content is only produced by the mock store.
#[derive(Debug)]
pub enum MediaContent {
    File(fs::File),
    Bytes(Vec<u8>),
}

/// MediaObject
///
/// A resolved, opened media object ready to be framed into a response. `len` is the
/// size reported by the open handle's metadata.
#[derive(Debug)]
pub struct MediaObject {
    pub content: MediaContent,
    pub len: u64,
    pub content_type: &'static str,
}

impl MediaObject {
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// into_body
    ///
    /// Files become a chunked stream read lazily as the client consumes it. Dropping
    /// the body (client disconnect) drops the stream and closes the handle.
    pub fn into_body(self) -> Body {
        match self.content {
            MediaContent::Bytes(bytes) => Body::from(bytes),
            MediaContent::File(file) => Body::from_stream(file_chunks(file)),
        }
    }
}

fn file_chunks(file: fs::File) -> impl futures_util::Stream<Item = io::Result<Bytes>> + Send {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), file)))
    })
}

// 1. MediaStore Contract
/// MediaStore
///
/// Abstract contract for reading media objects out of private storage. Handlers only
/// see this trait, so the on-disk store can be replaced by the in-memory mock in tests.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Resolves `relative_path` inside the store and opens it for streaming.
    ///
    /// Missing files, non-regular files and attempts to leave the store all come back
    /// as `GatewayError::NotFound`. Anything else unexpected is `GatewayError::Internal`.
    async fn open(&self, relative_path: &str) -> Result<MediaObject, GatewayError>;
}

// 2. The Real Implementation (local filesystem)
/// LocalMediaStore
///
/// Serves files from a single root directory that must sit outside any web-served tree.
#[derive(Clone, Debug)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// resolve
    ///
    /// Maps `relative_path` to an absolute path that is guaranteed to be inside the root.
    ///
    /// Two layers: a lexical pass rejecting `..`, absolute and prefix components, then a
    /// canonical comparison against the canonical root so symlinks cannot escape either.
    pub async fn resolve(&self, relative_path: &str) -> Result<PathBuf, GatewayError> {
        let relative = sanitize_relative(relative_path).ok_or_else(|| {
            tracing::warn!(path = %relative_path, "Rejected unsafe media path");
            GatewayError::NotFound(format!("unsafe path: {}", relative_path))
        })?;

        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            GatewayError::Internal(format!("storage root {}: {}", self.root.display(), e))
        })?;

        let target = fs::canonicalize(root.join(&relative))
            .await
            .map_err(|e| io_to_gateway(e, relative_path))?;

        if !target.starts_with(&root) {
            tracing::warn!(path = %relative_path, "Media path escaped storage root");
            return Err(GatewayError::NotFound(format!(
                "escaped root: {}",
                relative_path
            )));
        }

        Ok(target)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn open(&self, relative_path: &str) -> Result<MediaObject, GatewayError> {
        let path = self.resolve(relative_path).await?;

        let file = fs::File::open(&path)
            .await
            .map_err(|e| io_to_gateway(e, relative_path))?;

        // Checked on the handle, so the file streamed is the file inspected.
        let metadata = file
            .metadata()
            .await
            .map_err(|e| io_to_gateway(e, relative_path))?;
        if !metadata.is_file() {
            return Err(GatewayError::NotFound(format!(
                "not a regular file: {}",
                relative_path
            )));
        }

        Ok(MediaObject {
            content: MediaContent::File(file),
            len: metadata.len(),
            content_type: content_type_for(&path),
        })
    }
}

/// sanitize_relative
///
/// Lexical path check. Keeps only normal segments (and skips `.`); returns `None` for
/// empty paths, NUL bytes, `..`, and anything rooted.
fn sanitize_relative(relative_path: &str) -> Option<PathBuf> {
    if relative_path.contains('\0') {
        return None;
    }

    let mut clean = PathBuf::new();
    for component in Path::new(relative_path).components() {
        match component {
            Component::Normal(segment) => clean.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    (!clean.as_os_str().is_empty()).then_some(clean)
}

fn io_to_gateway(e: io::Error, relative_path: &str) -> GatewayError {
    match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory | io::ErrorKind::InvalidInput => {
            GatewayError::NotFound(format!("{}: {}", relative_path, e))
        }
        _ => GatewayError::Internal(format!("{}: {}", relative_path, e)),
    }
}

/// content_type_for
///
/// Extension to MIME mapping for the media formats the catalog stores.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        // Images
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        // Videos
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("ogv") => "video/ogg",
        Some("avi") => "video/x-msvideo",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

// 3. The Mock Implementation (For Tests)
/// MockMediaStore
///
/// In-memory `MediaStore` used to exercise handler paths that are awkward to reach on
/// a real filesystem, mainly the internal failure path.
#[derive(Clone, Default)]
pub struct MockMediaStore {
    objects: HashMap<String, Vec<u8>>,
    /// When true, every read fails with an internal error.
    pub should_fail: bool,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_object(mut self, relative_path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(relative_path.to_string(), bytes.into());
        self
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn open(&self, relative_path: &str) -> Result<MediaObject, GatewayError> {
        if self.should_fail {
            return Err(GatewayError::Internal(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        let relative = sanitize_relative(relative_path)
            .ok_or_else(|| GatewayError::NotFound(relative_path.to_string()))?;

        self.objects
            .get(relative_path)
            .map(|bytes| MediaObject {
                content: MediaContent::Bytes(bytes.clone()),
                len: bytes.len() as u64,
                content_type: content_type_for(&relative),
            })
            .ok_or_else(|| GatewayError::NotFound(relative_path.to_string()))
    }
}

/// MediaStoreState
///
/// The concrete type used to share the media store across the application state.
pub type MediaStoreState = Arc<dyn MediaStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_normal_segments() {
        assert_eq!(
            sanitize_relative("videos/./movie1.mp4"),
            Some(PathBuf::from("videos/movie1.mp4"))
        );
    }

    #[test]
    fn sanitize_rejects_escapes() {
        for path in ["../../etc/passwd", "images/../../x", "/etc/passwd", "", ".", "a\0b"] {
            assert!(sanitize_relative(path).is_none(), "{path:?}");
        }
    }

    #[test]
    fn content_type_is_case_insensitive() {
        assert_eq!(content_type_for(Path::new("videos/MOVIE.MP4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("images/a.JpEg")), "image/jpeg");
    }

    #[test]
    fn unknown_extension_defaults_to_binary() {
        assert_eq!(content_type_for(Path::new("videos/raw.xyz")), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for(Path::new("videos/noext")), DEFAULT_CONTENT_TYPE);
    }
}
