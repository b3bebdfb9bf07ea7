pub mod catalog;
pub mod filename;
