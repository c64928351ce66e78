//! Instance store
//!
//! One table per `InstanceKind`, each a flat array of render attributes.
//! Deleted slots are flagged dead and pushed onto a per-kind free list; the
//! next `add` of that kind reuses the most recently freed slot. Slots never
//! move, so an index stays valid for the renderer until it is recycled.

use crate::entity::{Handle, InstanceKind};
use crate::error::StoreError;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

/// Most slots a single kind table can hold. Index `u32::MAX` is reserved
/// for `Handle::INVALID`.
pub const MAX_SLOTS: u32 = u32::MAX;

/// Outline thickness given to freshly spawned circles.
pub const DEFAULT_OUTLINE_SIZE: f32 = 5.0;
/// Outline colour given to freshly spawned circles.
pub const DEFAULT_OUTLINE_COLOR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 0.4);

/// Simulate-and-render attributes of one body.
///
/// `#[repr(C)]` and `Pod` so a renderer can upload `InstanceStore::as_bytes`
/// as an instance buffer without conversion. For circles `scale.x` is the radius.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub position: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
    pub outline_size: f32,
    /// Presentation id, reassigned on every add and zeroed on delete.
    pub object_id: u32,
    /// `InstanceKind::tag()` of the owning table.
    pub kind: u32,
    pub color: Vec4,
    pub outline_color: Vec4,
    /// Non-zero while the slot is live. Readers must skip dead slots.
    pub alive: u32,
    _pad: [u32; 3],
}

impl InstanceData {
    pub fn new(position: Vec2, scale: Vec2, color: Vec4) -> Self {
        Self {
            position,
            scale,
            rotation: 0.0,
            outline_size: 0.0,
            object_id: 0,
            kind: InstanceKind::Circle.tag(),
            color,
            outline_color: Vec4::ZERO,
            alive: 1,
            _pad: [0; 3],
        }
    }

    pub fn circle(position: Vec2, radius: f32, color: Vec4) -> Self {
        Self {
            outline_size: DEFAULT_OUTLINE_SIZE,
            outline_color: DEFAULT_OUTLINE_COLOR,
            ..Self::new(position, Vec2::splat(radius), color)
        }
    }

    pub fn with_outline(mut self, size: f32, color: Vec4) -> Self {
        self.outline_size = size;
        self.outline_color = color;
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive != 0
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.scale.x
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        self.kind == InstanceKind::Circle.tag()
    }
}

#[derive(Default)]
struct KindTable {
    slots: Vec<InstanceData>,
    generations: Vec<u32>,
    free: Vec<u32>,
    live: usize,
}

/// Typed arena of instance records with LIFO slot recycling.
pub struct InstanceStore {
    tables: [KindTable; InstanceKind::COUNT],
    next_object_id: u32,
    slot_limit: u32,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::with_slot_limit(MAX_SLOTS)
    }

    /// Store whose tables refuse to grow past `limit` slots each.
    pub fn with_slot_limit(limit: u32) -> Self {
        Self {
            tables: Default::default(),
            next_object_id: 1,
            slot_limit: limit.min(MAX_SLOTS),
        }
    }

    #[inline]
    fn table(&self, kind: InstanceKind) -> &KindTable {
        &self.tables[kind.index()]
    }

    #[inline]
    fn table_mut(&mut self, kind: InstanceKind) -> &mut KindTable {
        &mut self.tables[kind.index()]
    }

    /// Insert a record, reusing the most recently freed slot of `kind` if any.
    ///
    /// Fails with `StoreError::Exhausted` when the table has no free slot and
    /// is already at the slot limit.
    pub fn add(&mut self, kind: InstanceKind, mut data: InstanceData) -> Result<Handle, StoreError> {
        let limit = self.slot_limit;
        let table = self.table(kind);
        if table.free.is_empty() && table.slots.len() >= limit as usize {
            tracing::warn!(kind = ?kind, limit, "instance table full");
            return Err(StoreError::Exhausted { kind, limit });
        }

        data.kind = kind.tag();
        data.alive = 1;
        data.object_id = self.next_object_id;
        self.next_object_id = self.next_object_id.wrapping_add(1).max(1);

        let table = self.table_mut(kind);
        let handle = match table.free.pop() {
            Some(index) => {
                table.slots[index as usize] = data;
                Handle::new(index, table.generations[index as usize], kind)
            }
            None => {
                let index = table.slots.len() as u32;
                table.slots.push(data);
                table.generations.push(0);
                Handle::new(index, 0, kind)
            }
        };
        table.live += 1;

        tracing::trace!(
            kind = ?kind,
            index = handle.index(),
            generation = handle.generation(),
            "instance added"
        );
        Ok(handle)
    }

    /// Insert a circle with the default outline.
    pub fn add_circle(&mut self, position: Vec2, radius: f32, color: Vec4) -> Result<Handle, StoreError> {
        self.add(InstanceKind::Circle, InstanceData::circle(position, radius, color))
    }

    /// Mark the slot dead and recycle its index.
    ///
    /// Returns false (and changes nothing) for invalid, stale or already
    /// deleted handles.
    pub fn delete(&mut self, handle: Handle) -> bool {
        if self.validate(handle).is_err() {
            return false;
        }
        let table = self.table_mut(handle.kind());
        let idx = handle.index() as usize;
        let slot = &mut table.slots[idx];
        slot.alive = 0;
        slot.object_id = 0;
        table.generations[idx] = table.generations[idx].wrapping_add(1);
        table.free.push(handle.index());
        table.live -= 1;

        tracing::trace!(
            kind = ?handle.kind(),
            index = handle.index(),
            generation = handle.generation(),
            "instance deleted"
        );
        true
    }

    pub fn exists(&self, handle: Handle) -> bool {
        self.validate(handle).is_ok()
    }

    fn validate(&self, handle: Handle) -> Result<usize, StoreError> {
        if handle.is_invalid() {
            return Err(StoreError::InvalidHandle);
        }
        let kind = handle.kind();
        let table = self.table(kind);
        let idx = handle.index() as usize;
        if idx >= table.slots.len() {
            return Err(StoreError::IndexOutOfBounds {
                kind,
                index: handle.index(),
                len: table.slots.len(),
            });
        }
        let actual = table.generations[idx];
        if actual != handle.generation() {
            return Err(StoreError::StaleGeneration {
                kind,
                index: handle.index(),
                expected: handle.generation(),
                actual,
            });
        }
        if !table.slots[idx].is_alive() {
            return Err(StoreError::Dead {
                kind,
                index: handle.index(),
            });
        }
        Ok(idx)
    }

    pub fn get(&self, handle: Handle) -> Result<&InstanceData, StoreError> {
        let idx = self.validate(handle)?;
        Ok(&self.table(handle.kind()).slots[idx])
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut InstanceData, StoreError> {
        let idx = self.validate(handle)?;
        Ok(&mut self.table_mut(handle.kind()).slots[idx])
    }

    /// Handle for the live slot at `index`, if there is one.
    pub fn handle_at(&self, kind: InstanceKind, index: u32) -> Option<Handle> {
        let table = self.table(kind);
        let slot = table.slots.get(index as usize)?;
        slot.is_alive()
            .then(|| Handle::new(index, table.generations[index as usize], kind))
    }

    /// Every slot of `kind`, dead ones included. Callers filter on `alive`.
    pub fn slots(&self, kind: InstanceKind) -> &[InstanceData] {
        &self.table(kind).slots
    }

    /// Mutable view of every slot of `kind`. The slice cannot grow, so no
    /// write can land past the end of the table.
    pub fn slots_mut(&mut self, kind: InstanceKind) -> &mut [InstanceData] {
        &mut self.table_mut(kind).slots
    }

    /// Live records of `kind` with their handles, in storage order.
    pub fn iter_alive(&self, kind: InstanceKind) -> impl Iterator<Item = (Handle, &InstanceData)> + '_ {
        let table = self.table(kind);
        table
            .slots
            .iter()
            .zip(table.generations.iter())
            .enumerate()
            .filter(|(_, (slot, _))| slot.is_alive())
            .map(move |(i, (slot, &generation))| (Handle::new(i as u32, generation, kind), slot))
    }

    /// Raw bytes of the `kind` table for instance-buffer upload.
    pub fn as_bytes(&self, kind: InstanceKind) -> &[u8] {
        bytemuck::cast_slice(&self.table(kind).slots)
    }

    pub fn live_count(&self, kind: InstanceKind) -> usize {
        self.table(kind).live
    }

    pub fn slot_count(&self, kind: InstanceKind) -> usize {
        self.table(kind).slots.len()
    }

    pub fn free_count(&self, kind: InstanceKind) -> usize {
        self.table(kind).free.len()
    }

    /// Delete every record of every kind.
    ///
    /// Slots and generations are kept: live slots get their generation
    /// bumped, so no handle taken before the clear resolves afterwards. Every
    /// index goes back on the free list, lowest index reused first.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            for (slot, generation) in table.slots.iter_mut().zip(table.generations.iter_mut()) {
                if slot.is_alive() {
                    *generation = generation.wrapping_add(1);
                }
                slot.alive = 0;
                slot.object_id = 0;
            }
            table.free.clear();
            table.free.extend((0..table.slots.len() as u32).rev());
            table.live = 0;
        }
    }
}

impl Default for InstanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blue() -> Vec4 {
        Vec4::new(0.0, 0.0, 1.0, 1.0)
    }

    #[test]
    fn add_then_delete() {
        let mut store = InstanceStore::new();
        let h = store.add_circle(Vec2::new(1.0, 2.0), 3.0, blue()).unwrap();

        assert!(store.exists(h));
        assert_eq!(store.live_count(InstanceKind::Circle), 1);
        let rec = store.get(h).unwrap();
        assert_eq!(rec.radius(), 3.0);
        assert_eq!(rec.outline_size, DEFAULT_OUTLINE_SIZE);
        assert!(rec.is_circle());

        assert!(store.delete(h));
        assert!(!store.exists(h));
        assert_eq!(store.live_count(InstanceKind::Circle), 0);
        assert_eq!(store.slot_count(InstanceKind::Circle), 1);
        assert_eq!(store.slots(InstanceKind::Circle)[0].object_id, 0);
        assert!(!store.slots(InstanceKind::Circle)[0].is_alive());
    }

    #[test]
    fn double_delete_leaves_free_list_alone() {
        let mut store = InstanceStore::new();
        let h = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();

        assert!(store.delete(h));
        assert_eq!(store.free_count(InstanceKind::Circle), 1);
        assert!(!store.delete(h));
        assert_eq!(store.free_count(InstanceKind::Circle), 1);
    }

    #[test]
    fn reuse_is_lifo_and_bumps_generation() {
        let mut store = InstanceStore::new();
        let a = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        let b = store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();
        let _c = store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();

        store.delete(a);
        store.delete(b);

        let d = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        assert_eq!(d.index(), b.index());
        assert_eq!(d.generation(), b.generation() + 1);
        let e = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        assert_eq!(e.index(), a.index());

        // Stale handles never alias the new occupant.
        assert!(!store.exists(b));
        assert!(!store.delete(b));
        assert!(store.exists(d));
        assert_eq!(store.slot_count(InstanceKind::Circle), 3);
        assert_eq!(store.free_count(InstanceKind::Circle), 0);
    }

    #[test]
    fn errors_are_specific() {
        let mut store = InstanceStore::new();
        assert_eq!(store.get(Handle::INVALID), Err(StoreError::InvalidHandle));

        let oob = Handle::new(9, 0, InstanceKind::Circle);
        assert!(matches!(
            store.get(oob),
            Err(StoreError::IndexOutOfBounds { index: 9, len: 0, .. })
        ));

        let h = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        store.delete(h);
        assert!(matches!(
            store.get(h),
            Err(StoreError::StaleGeneration { expected: 0, actual: 1, .. })
        ));
    }

    #[test]
    fn kinds_are_separate_tables() {
        let mut store = InstanceStore::new();
        let c = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        let l = store.add(
            InstanceKind::Line,
            InstanceData::new(Vec2::ZERO, Vec2::new(2.0, 0.0), blue()),
        )
        .unwrap();

        assert_eq!(c.index(), 0);
        assert_eq!(l.index(), 0);
        assert_eq!(store.get(l).unwrap().kind, InstanceKind::Line.tag());
        assert!(store.delete(l));
        assert!(store.exists(c));
        assert_eq!(store.free_count(InstanceKind::Circle), 0);
    }

    #[test]
    fn object_ids_are_reassigned() {
        let mut store = InstanceStore::new();
        let a = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        let first = store.get(a).unwrap().object_id;
        store.delete(a);
        let b = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        assert!(store.get(b).unwrap().object_id > first);
    }

    #[test]
    fn iter_alive_and_handle_at_skip_dead() {
        let mut store = InstanceStore::new();
        let a = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        let b = store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();
        store.delete(a);

        let alive: Vec<Handle> = store.iter_alive(InstanceKind::Circle).map(|(h, _)| h).collect();
        assert_eq!(alive, vec![b]);
        assert_eq!(store.handle_at(InstanceKind::Circle, 0), None);
        assert_eq!(store.handle_at(InstanceKind::Circle, 1), Some(b));
        assert_eq!(store.handle_at(InstanceKind::Circle, 7), None);
    }

    #[test]
    fn bytes_cover_every_slot() {
        let mut store = InstanceStore::new();
        store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();
        assert_eq!(
            store.as_bytes(InstanceKind::Circle).len(),
            2 * std::mem::size_of::<InstanceData>()
        );
    }

    #[test]
    fn full_table_refuses_until_a_slot_frees() {
        let mut store = InstanceStore::with_slot_limit(2);
        let a = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();

        assert_eq!(
            store.add_circle(Vec2::ONE, 2.0, blue()),
            Err(StoreError::Exhausted {
                kind: InstanceKind::Circle,
                limit: 2
            })
        );
        // Other kinds have their own tables.
        assert!(store
            .add(InstanceKind::Line, InstanceData::new(Vec2::ZERO, Vec2::ONE, blue()))
            .is_ok());

        store.delete(a);
        let c = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        assert_eq!(c.index(), a.index());
        assert_eq!(store.slot_count(InstanceKind::Circle), 2);
    }

    #[test]
    fn clear_retires_outstanding_handles() {
        let mut store = InstanceStore::new();
        let a = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        let b = store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();
        store.delete(b);
        let b2 = store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();

        store.clear();
        assert_eq!(store.live_count(InstanceKind::Circle), 0);
        assert_eq!(store.iter_alive(InstanceKind::Circle).count(), 0);
        assert!(!store.exists(a));
        assert!(!store.exists(b2));

        let c = store.add_circle(Vec2::ZERO, 2.0, blue()).unwrap();
        let d = store.add_circle(Vec2::ONE, 2.0, blue()).unwrap();
        assert_eq!((c.index(), d.index()), (0, 1));
        assert!(!store.exists(a));
        assert!(!store.exists(b));
        assert!(!store.exists(b2));
        assert!(store.exists(c) && store.exists(d));
        assert_eq!(store.slot_count(InstanceKind::Circle), 2);
    }
}
