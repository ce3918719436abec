//! Error types for costlru

/// Result type alias for costlru operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by list and cache operations
///
/// Cache misses are not errors; lookups report them as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The handle does not name a live node of this list
    #[error("node not found: handle is stale or belongs to another list")]
    NodeNotFound,
}
