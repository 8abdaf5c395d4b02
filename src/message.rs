use chrono::NaiveDate;
use uuid::Uuid;

use docket::core::resource::SummaryBlob;
use docket::core::store::TitleRequest;
use docket::metadata::FetchError;

#[derive(Debug)]
pub enum Message {
    // Sections
    CreateSection(String),
    DeleteSection(Uuid),
    ToggleSection(Uuid),
    SelectSection(Uuid),

    // Tasks
    AddTask {
        section_id: Uuid,
        url: String,
        title: Option<String>,
        due_date: Option<NaiveDate>,
    },
    /// Newline-separated urls, all with the same due date.
    BulkAddTasks {
        section_id: Uuid,
        urls: String,
        due_date: Option<NaiveDate>,
    },
    TitleResolved(TitleRequest, Result<String, FetchError>),
    CancelTitleRequests(Uuid),
    ToggleTask(Uuid, Uuid),
    DeleteTask(Uuid, Uuid),

    // Summary
    AttachSummary(Uuid, SummaryBlob),
}

/// Work `App::update` hands back to the runtime.
#[derive(Debug)]
pub enum Effect {
    ResolveTitle(TitleRequest),
}
