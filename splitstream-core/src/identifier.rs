//! ID generation utilities.

use uuid::Uuid;

/// Generate a unique request ID.
///
/// Returns a UUID v4 string prefixed with "req_". Used to correlate
/// log lines across one orchestration call.
///
/// # Example
///
/// ```rust
/// use splitstream_core::identifier::generate_request_id;
///
/// let id = generate_request_id();
/// assert!(id.starts_with("req_"));
/// assert_eq!(id.len(), 36); // "req_" + 32 hex chars
/// ```
#[must_use]
pub fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}

/// Generate a unique chunk ID.
///
/// Returns a UUID v4 string prefixed with "chunk_".
#[must_use]
pub fn generate_chunk_id() -> String {
    format!("chunk_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        let a = generate_request_id();
        let b = generate_request_id();
        assert_ne!(a, b);
        assert!(a.starts_with("req_"));
    }

    #[test]
    fn test_chunk_ids_are_unique() {
        let a = generate_chunk_id();
        let b = generate_chunk_id();
        assert_ne!(a, b);
        assert!(a.starts_with("chunk_"));
        assert_eq!(a.len(), "chunk_".len() + 32);
    }
}
