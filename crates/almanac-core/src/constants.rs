/// Name used for the binary and the config file.
pub const APP_NAME: &str = "almanac";

pub const ENV_PREFIX: &str = "ALMANAC";
pub const CONFIG_FILE_NAME: &str = const_str::concat!(APP_NAME, ".toml");

/// Upper bound on candidates generated by a single recurrence expansion.
pub const DEFAULT_MAX_CANDIDATES: usize = 2000;

pub const DEFAULT_SUBSTITUTE_LABEL: &str = "Substitute Holiday";

pub const DEFAULT_LOG_LEVEL: &str = "info";
