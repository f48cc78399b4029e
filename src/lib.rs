// src/lib.rs

//! Results Watcher Library
//!
//! Polls a results listing page, diffs its posts against the last
//! snapshot, and mails newly added posts.

pub mod config;
pub mod error;
pub mod health;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
