//! Workflow-driven status transitions for work items.
//!
//! The [`engine`] computes which statuses an item may move to and applies
//! requested changes; [`config`] and [`logging`] carry the ambient setup
//! used by the `statusflow` binary.

pub mod config;
pub mod engine;
pub mod logging;
