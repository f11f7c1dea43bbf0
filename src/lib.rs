pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod debounce;
pub mod dispatch;
pub mod omdb;
pub mod output;
pub mod page;
pub mod render;
pub mod runner;
pub mod search;
pub mod utils;

#[cfg(test)]
mod tests;
