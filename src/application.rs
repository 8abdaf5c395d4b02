use chrono::NaiveDate;
use uuid::Uuid;

use crate::command::{Command, Target};
use crate::components::section_card::section_card;
use crate::message::{Effect, Message};
use docket::core::error::{Committed, StoreError, ValidationError};
use docket::core::resource::{ResourceRegistry, SummaryBlob, media_type_for_path};
use docket::core::store::{Store, TaskAdded};
use docket::storage::{KeyValueStore, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

/// The presentation shell: owns the store, the current selection and the
/// notification queue, and turns messages into store mutations.
pub struct App<K: KeyValueStore, R: ResourceRegistry> {
    store: Store<K, R>,
    current_section: Option<Uuid>,
    notifications: Vec<Notification>,
}

impl<K: KeyValueStore, R: ResourceRegistry> App<K, R> {
    pub fn new(store: Store<K, R>, load_warning: Option<StorageError>) -> Self {
        let current_section = store.sections().first().map(|s| s.id);
        let mut app = Self {
            store,
            current_section,
            notifications: Vec::new(),
        };
        if let Some(e) = load_warning {
            app.notify(
                Severity::Warning,
                format!("Saved sections could not be loaded, starting empty ({})", e),
            );
        }
        app
    }

    pub fn store(&self) -> &Store<K, R> {
        &self.store
    }

    pub fn current_section(&self) -> Option<Uuid> {
        self.current_section
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Error => log::debug!("Notify error: {}", message),
            _ => log::debug!("Notify: {}", message),
        }
        self.notifications.push(Notification { severity, message });
    }

    /// Unwrap a committed mutation, surfacing a failed snapshot write.
    fn persisted<T>(&mut self, committed: Committed<T>) -> T {
        let (value, persist_error) = committed.into_parts();
        if let Some(e) = persist_error {
            self.notify(Severity::Error, format!("Changes could not be saved: {}", e));
        }
        value
    }

    fn report(&mut self, err: StoreError) {
        let message = match err {
            StoreError::Validation(ValidationError::InvalidUrl(_)) => {
                "Please enter a valid URL".to_string()
            }
            StoreError::Validation(ValidationError::MissingDueDate) => {
                "Please choose a due date".to_string()
            }
            StoreError::Validation(ValidationError::NotPdf(_)) => {
                "Please upload a PDF file".to_string()
            }
            StoreError::DuplicateSection(title) if title.is_empty() => {
                "Please enter a section title".to_string()
            }
            StoreError::DuplicateSection(_) => {
                "A section with this title already exists".to_string()
            }
            StoreError::DuplicateTask { .. } => {
                "A task with this URL or title already exists in this section".to_string()
            }
            StoreError::NotFound(_) => "That section or task no longer exists".to_string(),
            StoreError::Stale(id) => {
                log::debug!("Ignoring result for superseded request {}", id);
                return;
            }
            StoreError::Resource(e) => format!("Could not store the summary: {}", e),
        };
        self.notify(Severity::Error, message);
    }

    fn task_added(&mut self, added: TaskAdded) {
        if let Some(e) = added.fallback {
            self.notify(
                Severity::Warning,
                format!("Could not fetch the page title ({}), using the URL", e),
            );
        }
        self.notify(Severity::Success, "Task added successfully");
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        let mut effects = Vec::new();

        match message {
            Message::CreateSection(title) => match self.store.create_section(&title) {
                Ok(committed) => {
                    let id = self.persisted(committed);
                    self.current_section = Some(id);
                    self.notify(Severity::Success, "Section created successfully");
                }
                Err(e) => self.report(e),
            },

            Message::DeleteSection(id) => match self.store.delete_section(id) {
                Ok(committed) => {
                    self.persisted(committed);
                    if self.current_section == Some(id) {
                        self.current_section = None;
                    }
                    self.notify(Severity::Success, "Section deleted successfully");
                }
                Err(e) => self.report(e),
            },

            Message::ToggleSection(id) => match self.store.toggle_section_expanded(id) {
                Ok(committed) => {
                    self.persisted(committed);
                }
                Err(StoreError::NotFound(_)) => log::debug!("Toggle of unknown section {}", id),
                Err(e) => self.report(e),
            },

            Message::SelectSection(id) => {
                if self.store.section(id).is_some() {
                    self.current_section = Some(id);
                }
            }

            Message::AddTask {
                section_id,
                url,
                title,
                due_date,
            } => match self
                .store
                .begin_add_task(section_id, &url, title.as_deref(), due_date)
            {
                Ok(request) if request.needs_lookup() => {
                    effects.push(Effect::ResolveTitle(request));
                }
                Ok(request) => match self.store.finish_add_task(request, None) {
                    Ok(committed) => {
                        let added = self.persisted(committed);
                        self.task_added(added);
                    }
                    Err(e) => self.report(e),
                },
                Err(e) => self.report(e),
            },

            Message::BulkAddTasks {
                section_id,
                urls,
                due_date,
            } => {
                for url in urls.lines().map(str::trim).filter(|u| !u.is_empty()) {
                    match self.store.begin_add_task(section_id, url, None, due_date) {
                        Ok(request) => effects.push(Effect::ResolveTitle(request)),
                        Err(e) => {
                            log::info!("Skipping {} in bulk add: {}", url, e);
                            self.report(e);
                        }
                    }
                }
            }

            Message::TitleResolved(request, result) => {
                match self.store.finish_add_task(request, Some(result)) {
                    Ok(committed) => {
                        let added = self.persisted(committed);
                        self.task_added(added);
                    }
                    Err(e) => self.report(e),
                }
            }

            Message::CancelTitleRequests(section_id) => {
                let cancelled = self.store.cancel_title_requests(section_id);
                if cancelled > 0 {
                    self.notify(
                        Severity::Warning,
                        format!("Cancelled {} pending title lookups", cancelled),
                    );
                }
            }

            Message::ToggleTask(section_id, task_id) => {
                match self.store.toggle_task_completed(section_id, task_id) {
                    Ok(committed) => {
                        self.persisted(committed);
                    }
                    Err(StoreError::NotFound(_)) => {
                        log::debug!("Toggle of unknown task {}", task_id)
                    }
                    Err(e) => self.report(e),
                }
            }

            Message::DeleteTask(section_id, task_id) => {
                match self.store.delete_task(section_id, task_id) {
                    Ok(committed) => {
                        self.persisted(committed);
                        self.notify(Severity::Success, "Task deleted successfully");
                    }
                    Err(StoreError::NotFound(_)) => {
                        log::debug!("Delete of unknown task {}", task_id)
                    }
                    Err(e) => self.report(e),
                }
            }

            Message::AttachSummary(section_id, blob) => {
                match self.store.attach_summary(section_id, &blob) {
                    Ok(committed) => {
                        self.persisted(committed);
                        self.notify(Severity::Success, "Summary PDF uploaded successfully");
                    }
                    Err(e) => self.report(e),
                }
            }
        }

        effects
    }

    fn section_at(&self, target: Target) -> Result<Uuid, String> {
        match target {
            Target::Current => self
                .current_section
                .ok_or_else(|| "No current section; create or select one first".to_string()),
            Target::Position(n) => self
                .store
                .sections()
                .get(n.wrapping_sub(1))
                .map(|s| s.id)
                .ok_or_else(|| format!("There is no section {}", n)),
        }
    }

    fn task_at(&self, section: usize, task: usize) -> Result<(Uuid, Uuid), String> {
        let section_id = self.section_at(Target::Position(section))?;
        let task_id = self
            .store
            .section(section_id)
            .and_then(|s| s.tasks.get(task.wrapping_sub(1)))
            .map(|t| t.id)
            .ok_or_else(|| format!("Section {} has no task {}", section, task))?;
        Ok((section_id, task_id))
    }

    /// Resolve a parsed command against the current positions.
    pub fn message_for(&self, command: Command) -> Result<Message, String> {
        Ok(match command {
            Command::New(title) => Message::CreateSection(title),
            Command::Select(n) => Message::SelectSection(self.section_at(Target::Position(n))?),
            Command::Expand(n) => Message::ToggleSection(self.section_at(Target::Position(n))?),
            Command::Remove(n) => Message::DeleteSection(self.section_at(Target::Position(n))?),
            Command::Add {
                section,
                url,
                due_date,
                title,
            } => Message::AddTask {
                section_id: self.section_at(section)?,
                url,
                title,
                due_date,
            },
            Command::Bulk {
                section,
                due_date,
                urls,
            } => Message::BulkAddTasks {
                section_id: self.section_at(section)?,
                urls: urls.join("\n"),
                due_date,
            },
            Command::Done { section, task } => {
                let (section_id, task_id) = self.task_at(section, task)?;
                Message::ToggleTask(section_id, task_id)
            }
            Command::Delete { section, task } => {
                let (section_id, task_id) = self.task_at(section, task)?;
                Message::DeleteTask(section_id, task_id)
            }
            Command::Attach { section, path } => {
                let section_id = self.section_at(section)?;
                let bytes = std::fs::read(&path)
                    .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let blob = SummaryBlob::new(name, media_type_for_path(&path), bytes);
                Message::AttachSummary(section_id, blob)
            }
            Command::Cancel(section) => Message::CancelTitleRequests(self.section_at(section)?),
        })
    }

    pub fn view(&self, today: NaiveDate) -> String {
        let sections = self.store.sections();
        if sections.is_empty() {
            return "No sections yet. Create one with: new <title>".to_string();
        }
        let mut out: Vec<String> = sections
            .iter()
            .enumerate()
            .map(|(i, s)| section_card(s, i + 1, today, self.current_section == Some(s.id)))
            .collect();
        let pending = self.store.pending_count();
        if pending > 0 {
            out.push(format!("({} title lookups pending)", pending));
        }
        out.join("\n\n")
    }
}
