pub mod config;
pub mod logging;

pub mod allocator;
pub mod coordinator;
pub mod error;
pub mod fetch;
pub mod filename;
pub mod line_source;
pub mod worker;
