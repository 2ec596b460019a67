pub mod daemon;
pub mod query;
pub mod report;
