pub mod config;
pub mod history;
pub mod record;
pub mod summary;
