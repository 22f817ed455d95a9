// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod models;
pub mod poller;
pub mod readers;
pub mod sinks;
pub mod version;
