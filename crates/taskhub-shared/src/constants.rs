/// Sentinel stored in a user's default-group pointer when no group is selected.
pub const NO_DEFAULT_GROUP: i64 = 0;

/// Default per-call deadline for store operations, in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 5;

/// Activity level given to freshly created task containers.
pub const DEFAULT_ACTIVITY_LEVEL: i64 = 0;

/// Priority given to tasks created without one.
pub const DEFAULT_TASK_PRIORITY: &str = "normal";
