// ABOUTME: Core constants and utilities for AgriTrace
// ABOUTME: Foundational package providing shared functionality across all AgriTrace packages

pub mod constants;
pub mod utils;

// Re-export constants
pub use constants::{agritrace_dir, database_file, TRACKING_PREFIX};

// Re-export utilities
pub use utils::{generate_tracking_code, normalize_tracking_code};
