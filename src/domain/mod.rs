pub mod aggregate;
pub mod availability;
pub mod catalog;
pub mod check;
pub mod endpoints;
pub mod guild_cache;
pub mod rank;
pub mod report;
pub mod status;
pub mod template;
pub mod url;
pub mod validation_service;
