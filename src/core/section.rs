use chrono::NaiveDate;
use uuid::Uuid;

use super::resource::SummaryDocument;
use super::task::Task;

/// A named, ordered group of tasks.
#[derive(Debug)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub tasks: Vec<Task>,
    pub expanded: bool,
    pub summary: Option<SummaryDocument>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            tasks: Vec::new(),
            expanded: true,
            summary: None,
        }
    }

    pub fn task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn completion_ratio(&self) -> (usize, usize) {
        let total = self.tasks.len();
        let done = self.tasks.iter().filter(|t| t.completed).count();
        (done, total)
    }

    /// Percentage of completed tasks in `[0, 100]`; 0 when there are none.
    pub fn completion_percentage(&self) -> f64 {
        match self.completion_ratio() {
            (_, 0) => 0.0,
            (done, total) => 100.0 * done as f64 / total as f64,
        }
    }

    pub fn upcoming_count(&self, today: NaiveDate) -> usize {
        self.tasks.iter().filter(|t| t.is_upcoming(today)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn section_with(states: &[bool]) -> Section {
        let mut section = Section::new("Reading");
        for (i, done) in states.iter().enumerate() {
            let mut task = Task::new(format!("t{i}"), format!("https://{i}.example/"), day(1));
            task.completed = *done;
            section.tasks.push(task);
        }
        section
    }

    #[test]
    fn empty_section_is_zero_percent() {
        assert_eq!(section_with(&[]).completion_percentage(), 0.0);
    }

    #[test]
    fn two_of_three_done() {
        let pct = section_with(&[true, true, false]).completion_percentage();
        assert!((pct - 66.666_666).abs() < 1e-3);
        assert_eq!(format!("{:.2}", pct), "66.67");
    }

    #[test]
    fn percentage_matches_ratio_for_every_combination() {
        for mask in 0u32..16 {
            let states: Vec<bool> = (0..4).map(|bit| mask & (1 << bit) != 0).collect();
            let done = states.iter().filter(|s| **s).count() as f64;
            let pct = section_with(&states).completion_percentage();
            assert_eq!(pct, 100.0 * done / 4.0);
            assert!((0.0..=100.0).contains(&pct));
        }
    }

    #[test]
    fn upcoming_skips_completed_and_past() {
        let mut section = Section::new("Reading");
        section.tasks.push(Task::new("past", "https://a.example/", day(1)));
        section.tasks.push(Task::new("today", "https://b.example/", day(5)));
        section.tasks.push(Task::new("later", "https://c.example/", day(9)));
        let mut done = Task::new("done", "https://d.example/", day(9));
        done.completed = true;
        section.tasks.push(done);

        assert_eq!(section.upcoming_count(day(5)), 2);
    }

    #[test]
    fn new_section_starts_expanded_and_empty() {
        let section = Section::new("Reading");
        assert!(section.expanded);
        assert!(section.tasks.is_empty());
        assert!(section.summary.is_none());
    }
}
