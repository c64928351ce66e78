//! Instance handle with generational index
//!
//! Handles are lightweight (12 bytes) references into a kind-specific table of
//! the `InstanceStore`. The generation counter turns stale handles into
//! detectable no-ops instead of silently aliasing a recycled slot.

use serde::{Deserialize, Serialize};

/// Which table of the instance store a handle points into.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceKind {
    Polygon = 0,
    Circle = 1,
    Line = 2,
}

impl InstanceKind {
    pub const COUNT: usize = 3;
    pub const ALL: [InstanceKind; Self::COUNT] =
        [InstanceKind::Polygon, InstanceKind::Circle, InstanceKind::Line];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Tag value stored in `InstanceData::kind`.
    #[inline]
    pub const fn tag(self) -> u32 {
        self as u32
    }
}

/// Instance handle (generation-indexed for safety)
///
/// - Index: slot in the kind's table, stable for the lifetime of the store
/// - Generation: bumped every time the slot is deleted
/// - Kind: which table the index belongs to
///
/// Example:
/// ```ignore
/// let h = store.add_circle(pos, 3.0, color)?;
/// store.delete(h);
/// let h2 = store.add_circle(pos, 3.0, color)?; // same index, new generation
/// assert!(!store.exists(h));
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
    kind: InstanceKind,
}

impl Handle {
    /// Canonical sentinel. Never refers to a slot.
    pub const INVALID: Handle = Handle {
        index: u32::MAX,
        generation: 0,
        kind: InstanceKind::Circle,
    };

    pub(crate) const fn new(index: u32, generation: u32, kind: InstanceKind) -> Self {
        Self {
            index,
            generation,
            kind,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    pub fn is_invalid(&self) -> bool {
        self.index == u32::MAX
    }

    /// Pack index and generation into 64 bits (kind is not included).
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    pub fn from_bits(bits: u64, kind: InstanceKind) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
            kind,
        }
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinel() {
        assert!(Handle::INVALID.is_invalid());
        assert!(Handle::default().is_invalid());
        assert!(!Handle::new(0, 0, InstanceKind::Circle).is_invalid());
    }

    #[test]
    fn equality_needs_every_field() {
        let a = Handle::new(3, 1, InstanceKind::Circle);
        assert_eq!(a, Handle::new(3, 1, InstanceKind::Circle));
        assert_ne!(a, Handle::new(3, 2, InstanceKind::Circle));
        assert_ne!(a, Handle::new(3, 1, InstanceKind::Line));
        assert_ne!(a, Handle::new(4, 1, InstanceKind::Circle));
    }

    #[test]
    fn bits_round_trip() {
        let h = Handle::new(42, 7, InstanceKind::Polygon);
        assert_eq!(Handle::from_bits(h.to_bits(), InstanceKind::Polygon), h);
    }
}
