use uuid::Uuid;

use super::resource::ResourceError;
use crate::storage::StorageError;

/// Input rejected before any state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("not an absolute URL: {0:?}")]
    InvalidUrl(String),
    #[error("a due date is required")]
    MissingDueDate,
    #[error("expected a PDF, got {0:?}")]
    NotPdf(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Also returned for a blank title, with an empty payload.
    #[error("a section titled {0:?} already exists")]
    DuplicateSection(String),
    #[error("a task with url {url:?} or title {title:?} already exists in this section")]
    DuplicateTask { url: String, title: String },
    #[error("no section or task with id {0}")]
    NotFound(Uuid),
    #[error("title request {0} was superseded")]
    Stale(Uuid),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// A mutation that has been applied in memory.
///
/// The snapshot write that follows it is best-effort: a failure is carried in
/// `persist_error` and the in-memory change stays.
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    pub value: T,
    pub persist_error: Option<StorageError>,
}

impl<T> Committed<T> {
    pub fn into_parts(self) -> (T, Option<StorageError>) {
        (self.value, self.persist_error)
    }

    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}
