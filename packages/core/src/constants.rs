use std::env;
use std::path::PathBuf;

/// Prefix for generated produce tracking codes
pub const TRACKING_PREFIX: &str = "AGR";

/// Get the path to the AgriTrace directory (~/.agritrace)
pub fn agritrace_dir() -> PathBuf {
    // First try HOME environment variable (useful for tests)
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".agritrace")
    } else {
        // Fall back to dirs crate for normal usage
        dirs::home_dir()
            .expect("Unable to get home directory")
            .join(".agritrace")
    }
}

/// Get the path to the default SQLite database (~/.agritrace/agritrace.db)
pub fn database_file() -> PathBuf {
    agritrace_dir().join("agritrace.db")
}
