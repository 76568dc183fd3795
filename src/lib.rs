pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod runner;
pub mod scrapers;
pub mod utils;
