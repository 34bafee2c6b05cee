pub mod client;
pub mod config;
pub mod dashboard;
pub mod data_models;
pub mod errors;
pub mod export;
pub mod metrics;
pub mod parsers;
pub mod poll_metrics;
pub mod poller;
pub mod retry;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod tests;
