//! Structured logging schema and field name constants.
//!
//! All crates use these constants for consistent structured logging fields so
//! log aggregation tools can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), write completions |
//! | DEBUG | Decision points, parsed queries, config choices |
//! | TRACE | Per-item iteration (nested example sync steps) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "memory"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "word_suggestions", "example_suggestions"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "insert", "list", "update", "review", "merge"
pub const OPERATION: &str = "op";

/// Uid of the user issuing the request.
pub const USER_ID: &str = "user_id";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Word suggestion UUID being operated on.
pub const WORD_SUGGESTION_ID: &str = "word_suggestion_id";

/// Example suggestion UUID being operated on.
pub const EXAMPLE_SUGGESTION_ID: &str = "example_suggestion_id";

/// Example UUID produced or updated by a merge.
pub const EXAMPLE_ID: &str = "example_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned by a list query.
pub const RESULT_COUNT: &str = "result_count";

/// Total number of rows matching a list query.
pub const TOTAL_COUNT: &str = "total_count";

/// Nested example suggestions created during a sync.
pub const SYNC_CREATED: &str = "sync_created";

/// Nested example suggestions updated during a sync.
pub const SYNC_UPDATED: &str = "sync_updated";

/// Nested example suggestions deleted during a sync.
pub const SYNC_DELETED: &str = "sync_deleted";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
