#![forbid(unsafe_code)]

pub mod backend;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod formats;
pub mod logging;
pub mod preview;
pub mod prompt;
pub mod research;
pub mod store;
pub mod workflow;
