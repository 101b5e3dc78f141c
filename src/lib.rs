//! Dispatch GitHub Actions workflows and wait for their runs to finish.

pub mod commands;
pub mod config;
pub mod error;
pub mod platform;
pub mod workflow;
