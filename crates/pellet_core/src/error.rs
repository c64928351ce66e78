use crate::entity::InstanceKind;
use thiserror::Error;

/// Errors returned when a handle cannot be dereferenced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("handle is the invalid sentinel")]
    InvalidHandle,

    #[error("{kind:?} index {index} is out of bounds (len {len})")]
    IndexOutOfBounds {
        kind: InstanceKind,
        index: u32,
        len: usize,
    },

    #[error("{kind:?} slot {index} is not alive")]
    Dead { kind: InstanceKind, index: u32 },

    #[error("{kind:?} slot {index} is at generation {actual}, handle expects {expected}")]
    StaleGeneration {
        kind: InstanceKind,
        index: u32,
        expected: u32,
        actual: u32,
    },

    #[error("{kind:?} table is full ({limit} slots)")]
    Exhausted { kind: InstanceKind, limit: u32 },
}
