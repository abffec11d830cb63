pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod listing;
pub mod output;
pub mod runner;
pub mod session;
pub mod utils;

#[cfg(test)]
mod tests;
