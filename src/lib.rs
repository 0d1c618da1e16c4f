// Library for tests to access modules

pub mod aggregation;
pub mod cli;
pub mod collector;
pub mod config;
pub mod graphite;
pub mod models;
pub mod version;
pub mod zerto_repo;
