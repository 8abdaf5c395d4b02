//! Case-insensitive uniqueness checks run before any create.

use super::section::Section;

fn same(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn is_duplicate_section_title(sections: &[Section], title: &str) -> bool {
    sections.iter().any(|s| same(&s.title, title))
}

/// True if any task in `section` already has this url or this title.
pub fn is_duplicate_task(section: &Section, url: &str, title: &str) -> bool {
    section
        .tasks
        .iter()
        .any(|t| same(&t.url, url) || same(&t.title, title))
}

/// The url-only half of [`is_duplicate_task`], for when the title is not known yet.
pub fn is_duplicate_url(section: &Section, url: &str) -> bool {
    section.tasks.iter().any(|t| same(&t.url, url))
}
