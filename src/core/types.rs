use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Non-owning identity of the persisted record a value-object tree belongs to.
///
/// Every node of one tree carries the same `OwnerRef`, including nested
/// objects several levels deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerRef {
    record_type: &'static str,
    instance: u64,
}

impl OwnerRef {
    /// Allocates a fresh identity for a record instance of `record_type`.
    pub fn new(record_type: &'static str) -> Self {
        Self {
            record_type,
            instance: NEXT_OWNER_INSTANCE.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn record_type(&self) -> &'static str {
        self.record_type
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.record_type, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_refs_are_distinct_per_instance() {
        let a = OwnerRef::new("User");
        let b = OwnerRef::new("User");
        assert_ne!(a, b);
        assert_eq!(a.record_type(), "User");
        assert!(a.to_string().starts_with("User#"));
    }
}
