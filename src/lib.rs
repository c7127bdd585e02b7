pub mod cache;
pub mod channels;
pub mod config;
pub mod errors;
pub mod intervals;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod report;

#[cfg(test)]
mod tests;
