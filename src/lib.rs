//! chatwatch: incremental chat message poller.
//!
//! Polls a message-listing endpoint on a fixed delay, keeps the messages of
//! one conversation and kind inside a trailing window, and hands each new
//! message to a processor exactly once per process lifetime.

pub mod clock;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod poller;
pub mod source;
