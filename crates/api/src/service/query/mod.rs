pub mod entries;
pub mod projects;
