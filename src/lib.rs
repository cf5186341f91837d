pub mod application;
pub mod batch_runner;
pub mod config;
pub mod domain;
pub mod infrastructure;
