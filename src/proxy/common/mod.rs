// Shared helpers for the relay pipeline

pub mod common_utils;
pub mod error_classifier;
