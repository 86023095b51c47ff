//! Centralized default constants.
//!
//! Single source of truth for shared default values. Crates reference these
//! instead of defining their own magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Entries returned when neither a usable range nor a page is given, and the
/// page size used to turn `page=N` into an offset.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Widest window a single `range=[start,end]` query may return.
pub const MAX_RANGE_SPAN: i64 = 25;

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum number of pooled connections.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default wait for a free pooled connection, in seconds.
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default maximum connection lifetime in seconds.
pub const DB_MAX_LIFETIME_SECS: u64 = 1800;

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 3000;

/// Default request body limit (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Header carrying the authenticated user's uid, set by the upstream gateway.
pub const USER_UID_HEADER: &str = "x-user-uid";

/// Header carrying the authenticated user's email, set by the upstream gateway.
pub const USER_EMAIL_HEADER: &str = "x-user-email";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_span_exceeds_page_size() {
        assert!(MAX_RANGE_SPAN > DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_headers_are_lowercase() {
        assert_eq!(USER_UID_HEADER, USER_UID_HEADER.to_lowercase());
        assert_eq!(USER_EMAIL_HEADER, USER_EMAIL_HEADER.to_lowercase());
    }
}
