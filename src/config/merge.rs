//! Merge layer: defaults and the order in which sources override each other.

pub mod merge_policy;
pub mod service;
