pub mod section_card;
pub mod task_row;
