//! Personal daily-productivity tracker: a catalog of recurring activities, per-day completion,
//! focus and break timers, and statistics over closed days. Everything is stored locally as JSON
//! documents.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod fs;
pub mod preferences;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod timer;
pub mod tracker;
pub mod utils;
