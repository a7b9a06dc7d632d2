pub mod catalog;
pub mod config;
pub mod history;
pub mod output;
pub mod planner;
pub mod pricing;
pub mod rows;
pub mod server;
