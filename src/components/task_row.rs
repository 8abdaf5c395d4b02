use chrono::NaiveDate;

use docket::core::task::Task;

/// One task as a single line: `  2. [x] Title <url> due 2024-01-01`.
pub fn task_row(task: &Task, position: usize, today: NaiveDate) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let mut line = format!(
        "    {}. {} {} <{}> due {}",
        position,
        check,
        task.title,
        task.url,
        task.due_date.format("%Y-%m-%d")
    );
    if task.is_overdue(today) {
        line.push_str(" (overdue)");
    } else if task.due_date == today && !task.completed {
        line.push_str(" (today)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn open_task_row() {
        let task = Task::new("Example A", "https://a.example/", day(3));
        assert_eq!(
            task_row(&task, 1, day(1)),
            "    1. [ ] Example A <https://a.example/> due 2024-01-03"
        );
    }

    #[test]
    fn markers() {
        let mut task = Task::new("Example A", "https://a.example/", day(3));
        assert!(task_row(&task, 1, day(3)).ends_with("(today)"));
        assert!(task_row(&task, 1, day(4)).ends_with("(overdue)"));

        task.completed = true;
        let row = task_row(&task, 2, day(4));
        assert!(row.contains("2. [x]"));
        assert!(!row.contains("overdue"));
    }
}
