//! Runtime module
//!
//! Provides the spawned-task handle used by the GitHub operations.

pub mod async_task;

pub use async_task::AsyncTask;
