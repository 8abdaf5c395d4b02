use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

use super::duplicate::{is_duplicate_section_title, is_duplicate_task, is_duplicate_url};
use super::error::{Committed, StoreError, ValidationError};
use super::resource::{ResourceRegistry, SummaryBlob, SummaryDocument};
use super::section::Section;
use super::task::Task;
use crate::metadata::{FetchError, TitleFetcher};
use crate::storage::{KeyValueStore, StorageAdapter, StorageError};

/// A validated add-task request waiting for its display title.
///
/// Produced by [`Store::begin_add_task`] and consumed by
/// [`Store::finish_add_task`]. While it is outstanding the rest of the store
/// stays usable; the request is discarded if its section is deleted or its
/// section's requests are cancelled in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRequest {
    pub id: Uuid,
    pub section_id: Uuid,
    pub url: String,
    pub title: Option<String>,
    pub due_date: NaiveDate,
}

impl TitleRequest {
    /// True when no explicit title was given and the page title should be fetched.
    pub fn needs_lookup(&self) -> bool {
        self.title.is_none()
    }
}

#[derive(Debug)]
pub struct TaskAdded {
    pub task_id: Uuid,
    pub title: String,
    /// Why the url was used as the title instead of the page title.
    pub fallback: Option<FetchError>,
}

/// The in-memory sections plus everything needed to persist them.
///
/// All mutations apply in memory first and then write the full snapshot
/// through the [`StorageAdapter`].
pub struct Store<K: KeyValueStore, R: ResourceRegistry> {
    sections: Vec<Section>,
    adapter: StorageAdapter<K>,
    resources: R,
    /// Outstanding title requests: request id -> section id.
    pending: HashMap<Uuid, Uuid>,
}

impl<K: KeyValueStore, R: ResourceRegistry> Store<K, R> {
    /// Load the snapshot. A corrupt or unreadable snapshot yields an empty
    /// store and the error as a warning.
    pub fn open(adapter: StorageAdapter<K>, resources: R) -> (Self, Option<StorageError>) {
        let (sections, warning) = match adapter.load() {
            Ok(sections) => (sections, None),
            Err(e) => {
                log::warn!("Starting with an empty store: {}", e);
                (Vec::new(), Some(e))
            }
        };
        let store = Self {
            sections,
            adapter,
            resources,
            pending: HashMap::new(),
        };
        (store, warning)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: Uuid) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn adapter(&self) -> &StorageAdapter<K> {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut StorageAdapter<K> {
        &mut self.adapter
    }

    pub fn resources(&self) -> &R {
        &self.resources
    }

    fn index_of(&self, id: Uuid) -> Result<usize, StoreError> {
        self.sections
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn section_ref(&self, id: Uuid) -> Result<&Section, StoreError> {
        self.section(id).ok_or(StoreError::NotFound(id))
    }

    fn section_mut(&mut self, id: Uuid) -> Result<&mut Section, StoreError> {
        self.sections
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Write the snapshot after an in-memory change. Never rolls back.
    fn commit<T>(&mut self, value: T) -> Committed<T> {
        let persist_error = self.adapter.save(&self.sections).err();
        if let Some(ref e) = persist_error {
            log::warn!("Snapshot not saved, keeping in-memory state: {}", e);
        }
        Committed {
            value,
            persist_error,
        }
    }

    pub fn create_section(&mut self, title: &str) -> Result<Committed<Uuid>, StoreError> {
        let title = title.trim();
        if title.is_empty() || is_duplicate_section_title(&self.sections, title) {
            return Err(StoreError::DuplicateSection(title.to_string()));
        }

        let section = Section::new(title);
        let id = section.id;
        self.sections.push(section);
        log::info!("Created section {} ({})", title, id);
        Ok(self.commit(id))
    }

    /// Remove a section with all its tasks, its summary and its pending title requests.
    pub fn delete_section(&mut self, id: Uuid) -> Result<Committed<()>, StoreError> {
        let idx = self.index_of(id)?;
        let section = self.sections.remove(idx);
        if let Some(summary) = section.summary {
            self.resources.release(summary.handle);
        }
        let cancelled = self.cancel_title_requests(id);
        log::info!(
            "Deleted section {} with {} tasks ({} pending lookups dropped)",
            section.title,
            section.tasks.len(),
            cancelled
        );
        Ok(self.commit(()))
    }

    pub fn toggle_section_expanded(&mut self, id: Uuid) -> Result<Committed<bool>, StoreError> {
        let section = self.section_mut(id)?;
        section.expanded = !section.expanded;
        let expanded = section.expanded;
        Ok(self.commit(expanded))
    }

    /// Validate an add-task request and register it as pending.
    ///
    /// Everything that can be checked without the page title is checked here,
    /// before any network traffic.
    pub fn begin_add_task(
        &mut self,
        section_id: Uuid,
        url: &str,
        title: Option<&str>,
        due_date: Option<NaiveDate>,
    ) -> Result<TitleRequest, StoreError> {
        let url = url.trim();
        if reqwest::Url::parse(url).is_err() {
            return Err(ValidationError::InvalidUrl(url.to_string()).into());
        }
        let due_date = due_date.ok_or(ValidationError::MissingDueDate)?;
        let title = title.map(str::trim).filter(|t| !t.is_empty());

        // A fetched title is checked once it is known, in `finish_add_task`.
        let section = self.section_ref(section_id)?;
        let clash = match title {
            Some(title) => is_duplicate_task(section, url, title),
            None => is_duplicate_url(section, url),
        };
        if clash {
            return Err(StoreError::DuplicateTask {
                url: url.to_string(),
                title: title.unwrap_or_default().to_string(),
            });
        }

        let request = TitleRequest {
            id: Uuid::new_v4(),
            section_id,
            url: url.to_string(),
            title: title.map(str::to_string),
            due_date,
        };
        self.pending.insert(request.id, section_id);
        log::debug!("Pending title request {} for {}", request.id, request.url);
        Ok(request)
    }

    /// Apply a title lookup result and append the task.
    ///
    /// `lookup` is `None` when no lookup was made. The request must still be
    /// live and its section must still exist; the duplicate check runs again
    /// against the resolved title.
    pub fn finish_add_task(
        &mut self,
        request: TitleRequest,
        lookup: Option<Result<String, FetchError>>,
    ) -> Result<Committed<TaskAdded>, StoreError> {
        if self.pending.remove(&request.id).is_none() {
            log::debug!("Discarding stale title request {}", request.id);
            return Err(StoreError::Stale(request.id));
        }

        let (title, fallback) = match (request.title, lookup) {
            (Some(explicit), _) => (explicit, None),
            (None, Some(Ok(fetched))) if !fetched.trim().is_empty() => {
                (fetched.trim().to_string(), None)
            }
            (None, Some(Ok(_))) => (request.url.clone(), Some(FetchError::MissingTitle)),
            (None, Some(Err(e))) => {
                log::warn!("Title lookup for {} failed, using the url: {}", request.url, e);
                (request.url.clone(), Some(e))
            }
            (None, None) => (request.url.clone(), None),
        };

        let section = self.section_mut(request.section_id)?;
        if is_duplicate_task(section, &request.url, &title) {
            return Err(StoreError::DuplicateTask {
                url: request.url,
                title,
            });
        }

        let task = Task::new(title.clone(), request.url, request.due_date);
        let task_id = task.id;
        section.tasks.push(task);
        log::info!("Added task {} to {}", title, section.title);
        Ok(self.commit(TaskAdded {
            task_id,
            title,
            fallback,
        }))
    }

    /// Supersede every outstanding title request of a section. Returns how many were dropped.
    pub fn cancel_title_requests(&mut self, section_id: Uuid) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, sid| *sid != section_id);
        before - self.pending.len()
    }

    pub fn is_pending(&self, request_id: Uuid) -> bool {
        self.pending.contains_key(&request_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Add a task in one go, waiting for the title lookup when one is needed.
    pub async fn add_task<F: TitleFetcher>(
        &mut self,
        fetcher: &F,
        section_id: Uuid,
        url: &str,
        title: Option<&str>,
        due_date: Option<NaiveDate>,
    ) -> Result<Committed<TaskAdded>, StoreError> {
        let request = self.begin_add_task(section_id, url, title, due_date)?;
        let lookup = if request.needs_lookup() {
            Some(fetcher.resolve_title(&request.url).await)
        } else {
            None
        };
        self.finish_add_task(request, lookup)
    }

    pub fn toggle_task_completed(
        &mut self,
        section_id: Uuid,
        task_id: Uuid,
    ) -> Result<Committed<bool>, StoreError> {
        let task = self
            .section_mut(section_id)?
            .task_mut(task_id)
            .ok_or(StoreError::NotFound(task_id))?;
        let completed = task.toggle_completed();
        Ok(self.commit(completed))
    }

    pub fn delete_task(
        &mut self,
        section_id: Uuid,
        task_id: Uuid,
    ) -> Result<Committed<Task>, StoreError> {
        let section = self.section_mut(section_id)?;
        let pos = section
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or(StoreError::NotFound(task_id))?;
        let task = section.tasks.remove(pos);
        log::info!("Deleted task {}", task.title);
        Ok(self.commit(task))
    }

    /// Attach a PDF summary, releasing any previous one. Returns the link to it.
    pub fn attach_summary(
        &mut self,
        section_id: Uuid,
        blob: &SummaryBlob,
    ) -> Result<Committed<String>, StoreError> {
        if !blob.is_pdf() {
            return Err(ValidationError::NotPdf(blob.media_type.clone()).into());
        }
        let idx = self.index_of(section_id)?;

        let handle = self.resources.create(blob)?;
        let url = handle.url().to_string();
        let previous = self.sections[idx].summary.replace(SummaryDocument {
            file_name: blob.name.clone(),
            handle,
        });
        if let Some(previous) = previous {
            self.resources.release(previous.handle);
        }
        log::info!("Attached {} to {}", blob.name, self.sections[idx].title);
        Ok(self.commit(url))
    }

    pub fn completion_percentage(&self, section_id: Uuid) -> Result<f64, StoreError> {
        Ok(self.section_ref(section_id)?.completion_percentage())
    }

    pub fn upcoming_count(&self, section_id: Uuid, today: NaiveDate) -> Result<usize, StoreError> {
        Ok(self.section_ref(section_id)?.upcoming_count(today))
    }

    /// [`Self::upcoming_count`] against the local calendar date.
    pub fn upcoming_count_today(&self, section_id: Uuid) -> Result<usize, StoreError> {
        self.upcoming_count(section_id, chrono::Local::now().date_naive())
    }

    /// Release every summary handle. Runs on drop as well.
    pub fn release_all(&mut self) {
        for section in &mut self.sections {
            if let Some(summary) = section.summary.take() {
                self.resources.release(summary.handle);
            }
        }
    }
}

impl<K: KeyValueStore, R: ResourceRegistry> Drop for Store<K, R> {
    fn drop(&mut self) {
        self.release_all();
    }
}
