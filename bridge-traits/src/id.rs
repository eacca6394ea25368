//! Unique identifier generation
//!
//! Injected so that multipart boundaries (and anything else keyed on a
//! fresh id) are reproducible in tests.

use uuid::Uuid;

/// Source of unique identifiers.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Uuid;
}

/// Random (v4) identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
