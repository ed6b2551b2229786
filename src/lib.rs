pub mod admin;
pub mod api;
pub mod catalog;
pub mod cli;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod persistence;
pub mod store;
pub mod sync;
pub mod ui;
