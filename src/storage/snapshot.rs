//! Wire form of the persisted snapshot.
//!
//! Field names match what the browser build wrote to `localStorage`, so a
//! snapshot exported from it loads here. That build used millisecond
//! timestamps as section ids and stored due dates as full ISO timestamps; both
//! are accepted on the way in, and rewritten as UUIDs and `YYYY-MM-DD` dates on
//! the next save.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::section::Section;
use crate::core::task::Task;

/// Namespace for turning legacy non-UUID ids into stable UUIDs.
const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6b1f_94c2_0d3e_4a51_9f0e_2c7a_d1b8_5e43);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSection {
    #[serde(with = "id_format")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub todos: Vec<StoredTask>,
    #[serde(default)]
    pub is_expanded: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    #[serde(with = "id_format")]
    pub id: Uuid,
    pub title: String,
    pub url: String,
    #[serde(with = "due_date_format")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
}

impl From<&Section> for StoredSection {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id,
            title: section.title.clone(),
            todos: section.tasks.iter().map(StoredTask::from).collect(),
            is_expanded: section.expanded,
        }
    }
}

impl From<StoredSection> for Section {
    fn from(stored: StoredSection) -> Self {
        Self {
            id: stored.id,
            title: stored.title,
            tasks: stored.todos.into_iter().map(Task::from).collect(),
            expanded: stored.is_expanded,
            summary: None,
        }
    }
}

impl From<&Task> for StoredTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            url: task.url.clone(),
            due_date: task.due_date,
            completed: task.completed,
        }
    }
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        Self {
            id: stored.id,
            title: stored.title,
            url: stored.url,
            due_date: stored.due_date,
            completed: stored.completed,
        }
    }
}

/// Parse an id, mapping anything that is not a UUID to a deterministic v5 UUID.
pub fn parse_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::new_v5(&LEGACY_ID_NAMESPACE, raw.as_bytes()))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date taken in UTC).
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc).date_naive())
    })
}

mod id_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Uuid, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    /// Ids may be strings or, from hand-edited snapshots, bare numbers.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => super::parse_id(&s),
            RawId::Number(n) => super::parse_id(&n.to_string()),
        })
    }
}

mod due_date_format {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_due_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid due date {:?}", raw)))
    }
}
