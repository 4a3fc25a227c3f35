pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod stats;

#[cfg(test)]
mod tests;
