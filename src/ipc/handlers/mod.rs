pub mod attendance;
pub mod core;
pub mod notes;
pub mod reports;
pub mod students;
pub mod teachers;
