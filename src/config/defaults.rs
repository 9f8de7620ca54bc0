/// Configuration default values
///
/// All default values for configuration options live here so they are
/// easy to change in one place.
// Broadcast store defaults
pub const DEFAULT_BROADCAST_INPUT: &str = "./data/broadcast.json";
pub const DEFAULT_BROADCAST_OUTPUT: &str = "./data/merged.json";

// Import defaults
pub const DEFAULT_IMPORT_TIMEZONE: &str = "UTC";
pub const DEFAULT_IMPORT_TIME_OFFSET: &str = "0";

// Logging defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
