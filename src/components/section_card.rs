use chrono::NaiveDate;

use super::task_row::task_row;
use docket::core::section::Section;

const BAR_WIDTH: usize = 20;

pub fn progress_bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// A section header with progress, upcoming count and summary link, followed
/// by its tasks when expanded.
pub fn section_card(section: &Section, position: usize, today: NaiveDate, current: bool) -> String {
    let marker = if section.expanded { "v" } else { ">" };
    let (done, total) = section.completion_ratio();
    let percentage = section.completion_percentage();

    let mut lines = vec![format!(
        "{} {}. {}{}",
        marker,
        position,
        section.title,
        if current { "  (current)" } else { "" }
    )];
    lines.push(format!(
        "    {} {:.2}%  {}/{} done, {} upcoming",
        progress_bar(percentage),
        percentage,
        done,
        total,
        section.upcoming_count(today)
    ));
    if let Some(ref summary) = section.summary {
        lines.push(format!("    Summary: {} <{}>", summary.file_name, summary.handle.url()));
    }

    if section.expanded {
        if section.tasks.is_empty() {
            lines.push("    (no tasks)".to_string());
        }
        for (i, task) in section.tasks.iter().enumerate() {
            lines.push(task_row(task, i + 1, today));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket::core::task::Task;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn bar_bounds() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(100.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(50.0).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn expanded_card_lists_tasks() {
        let mut section = Section::new("Reading");
        let mut done = Task::new("A", "https://a.example/", day(1));
        done.completed = true;
        section.tasks.push(done);
        section.tasks.push(Task::new("B", "https://b.example/", day(2)));
        section.tasks.push(Task::new("C", "https://c.example/", day(5)));
        section.tasks[1].completed = true;

        let card = section_card(&section, 1, day(2), true);
        assert!(card.starts_with("v 1. Reading  (current)"));
        assert!(card.contains("66.67%  2/3 done, 1 upcoming"));
        assert!(card.contains("3. [ ] C <https://c.example/>"));
    }

    #[test]
    fn collapsed_card_hides_tasks() {
        let mut section = Section::new("Reading");
        section.expanded = false;
        section.tasks.push(Task::new("A", "https://a.example/", day(1)));

        let card = section_card(&section, 2, day(1), false);
        assert!(card.starts_with("> 2. Reading"));
        assert!(!card.contains("https://a.example/"));
        assert!(card.contains("0.00%"));
    }
}
