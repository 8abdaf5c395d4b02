use chrono::NaiveDate;
use uuid::Uuid;

/// A URL-linked work item owned by exactly one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub due_date: NaiveDate,
    pub completed: bool,
}

impl Task {
    pub fn new(title: impl Into<String>, url: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            url: url.into(),
            due_date,
            completed: false,
        }
    }

    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Still open and due today or later.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date >= today
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date < today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_task_is_open() {
        let task = Task::new("Read", "https://a.example/", day(2024, 1, 1));
        assert!(!task.completed);
        assert_ne!(task.id, Uuid::nil());
    }

    #[test]
    fn upcoming_includes_today() {
        let today = day(2024, 3, 10);
        let mut task = Task::new("Read", "https://a.example/", today);
        assert!(task.is_upcoming(today));
        assert!(!task.is_overdue(today));

        task.toggle_completed();
        assert!(!task.is_upcoming(today));
    }

    #[test]
    fn past_due_is_overdue() {
        let task = Task::new("Read", "https://a.example/", day(2024, 3, 9));
        assert!(!task.is_upcoming(day(2024, 3, 10)));
        assert!(task.is_overdue(day(2024, 3, 10)));
    }
}
