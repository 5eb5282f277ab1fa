//! Core engine modules for statusflow.

pub mod action;
pub mod board;
pub mod db;
pub mod error;
pub mod graph;
pub mod order;
pub mod ports;
pub mod repo;
pub mod resolver;
pub mod transition;
pub mod types;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod testing;
