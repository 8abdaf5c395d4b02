pub mod duplicate;
pub mod error;
pub mod resource;
pub mod section;
pub mod store;
pub mod task;
