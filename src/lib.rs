//! Simple cli for tracking which application owns the active window and for
//! reporting how long each application stayed focused throughout a day.
//!

pub mod cli;
pub mod probe;
pub mod report;
pub mod storage;
pub mod tracker;
pub mod utils;
