use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("failed to create session directory {}: {source}", .path.display())]
    SessionDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to store {name}: {source}")]
    Write {
        name: String,
        source: std::io::Error,
    },
}

/// An uploaded file as handed over by the file input.
#[derive(Debug, Clone)]
pub struct SummaryBlob {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SummaryBlob {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Compares the essence of the media type, ignoring parameters and case.
    pub fn is_pdf(&self) -> bool {
        self.media_type
            .split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
    }
}

/// Guess a media type from a file extension, the way a browser file input does.
pub fn media_type_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("txt") => "text/plain",
        Some("html") | Some("htm") => "text/html",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// A session-scoped reference to an uploaded file.
///
/// Not `Clone`: the only way to get rid of one is to hand it back to the
/// registry that created it via [`ResourceRegistry::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceHandle {
    id: Uuid,
    url: String,
}

impl ResourceHandle {
    pub fn new(id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// The summary attached to a section. Never persisted.
#[derive(Debug)]
pub struct SummaryDocument {
    pub file_name: String,
    pub handle: ResourceHandle,
}

pub trait ResourceRegistry {
    fn create(&mut self, blob: &SummaryBlob) -> Result<ResourceHandle, ResourceError>;
    fn release(&mut self, handle: ResourceHandle);
}

/// Copies uploads into a per-session directory and hands out `file://` links.
pub struct SessionResources {
    dir: PathBuf,
    live: HashMap<Uuid, PathBuf>,
}

impl SessionResources {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            live: HashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl ResourceRegistry for SessionResources {
    fn create(&mut self, blob: &SummaryBlob) -> Result<ResourceHandle, ResourceError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ResourceError::SessionDir {
            path: self.dir.clone(),
            source,
        })?;

        let id = Uuid::new_v4();
        let path = self.dir.join(format!("{}.pdf", id));
        std::fs::write(&path, &blob.bytes).map_err(|source| ResourceError::Write {
            name: blob.name.clone(),
            source,
        })?;

        let url = format!("file://{}", path.display());
        log::debug!("Created resource {} for {}", url, blob.name);
        self.live.insert(id, path);
        Ok(ResourceHandle::new(id, url))
    }

    fn release(&mut self, handle: ResourceHandle) {
        match self.live.remove(&handle.id) {
            Some(path) => {
                if let Err(e) = std::fs::remove_file(&path) {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                }
            }
            None => log::warn!("Released unknown resource {}", handle.url),
        }
    }
}

impl Drop for SessionResources {
    fn drop(&mut self) {
        for (_, path) in self.live.drain() {
            let _ = std::fs::remove_file(path);
        }
        // Only succeeds once empty; leave anything we did not put there.
        let _ = std::fs::remove_dir(&self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> SummaryBlob {
        SummaryBlob::new(name, "application/pdf", b"%PDF-1.7".to_vec())
    }

    #[test]
    fn pdf_media_type_ignores_case_and_parameters() {
        assert!(pdf("a.pdf").is_pdf());
        assert!(SummaryBlob::new("a", "Application/PDF; name=a.pdf", Vec::new()).is_pdf());
        assert!(!SummaryBlob::new("a", "text/plain", Vec::new()).is_pdf());
        assert!(!SummaryBlob::new("a", "", Vec::new()).is_pdf());
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(media_type_for_path(Path::new("notes/Summary.PDF")), PDF_MEDIA_TYPE);
        assert_eq!(media_type_for_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(media_type_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn create_and_release_manage_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut resources = SessionResources::new(tmp.path().join("session"));

        let handle = resources.create(&pdf("a.pdf")).unwrap();
        assert!(handle.url().starts_with("file://"));
        let path = resources.dir().join(format!("{}.pdf", handle.id()));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        assert_eq!(resources.live_count(), 1);

        resources.release(handle);
        assert!(!path.exists());
        assert_eq!(resources.live_count(), 0);
    }

    #[test]
    fn drop_cleans_session_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("session");
        {
            let mut resources = SessionResources::new(&dir);
            let _handle = resources.create(&pdf("a.pdf")).unwrap();
        }
        assert!(!dir.exists());
    }
}
