//! Pointer-driven spawn and delete.
//!
//! The windowing layer pushes `InputEvent`s into an `InputQueue`; the
//! simulation drains it once per frame before stepping. Screen coordinates
//! have their origin at the top-left corner; simulation coordinates are
//! centred on the viewport.

use crate::entity::{Handle, InstanceKind};
use crate::error::StoreError;
use crate::instance::{InstanceData, InstanceStore, DEFAULT_OUTLINE_COLOR, DEFAULT_OUTLINE_SIZE};
use crate::spatial_hash::{fit_radius, BIGGER_RADIUS, SMALLER_RADIUS};
use crate::verlet::VerletStore;
use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Extra gap right of the UI panel inside which clicks do not spawn.
pub const PANEL_MARGIN: f32 = 5.0;

/// What a pointer button is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerAction {
    Spawn,
    Delete,
}

/// Whether the event comes from the initial press or from dragging while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Pressed,
    Dragged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub action: PointerAction,
    pub phase: PointerPhase,
    /// Cursor position in screen space.
    pub screen_pos: Vec2,
}

impl InputEvent {
    pub fn new(action: PointerAction, phase: PointerPhase, screen_pos: Vec2) -> Self {
        Self {
            action,
            phase,
            screen_pos,
        }
    }
}

/// FIFO of pointer events waiting for the next frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Window size plus the width reserved for the UI panel on the left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub panel_width: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, panel_width: f32) -> Self {
        Self {
            width,
            height,
            panel_width,
        }
    }

    #[inline]
    pub fn half_extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    #[inline]
    pub fn to_simulation(&self, screen: Vec2) -> Vec2 {
        screen - self.half_extent()
    }

    /// True when a simulation-space point lies over the UI panel (or its margin).
    pub fn in_panel(&self, sim_pos: Vec2) -> bool {
        sim_pos.x <= -self.half_extent().x + self.panel_width + PANEL_MARGIN
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1200.0, 800.0, 0.0)
    }
}

/// How freshly spawned circles look.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnStyle {
    pub min_radius: f32,
    pub max_radius: f32,
    pub color: Vec4,
    /// Pick a random RGB per spawn instead of `color`.
    pub random_color: bool,
    pub outline_size: f32,
    pub outline_color: Vec4,
}

impl Default for SpawnStyle {
    fn default() -> Self {
        Self {
            min_radius: SMALLER_RADIUS,
            max_radius: BIGGER_RADIUS,
            color: Vec4::new(0.0, 0.0, 1.0, 1.0),
            random_color: false,
            outline_size: DEFAULT_OUTLINE_SIZE,
            outline_color: DEFAULT_OUTLINE_COLOR,
        }
    }
}

/// Outcome of draining one frame's events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionReport {
    pub spawned: Vec<Handle>,
    pub deleted: Vec<Handle>,
    /// Events dropped because the UI held the pointer.
    pub ignored: usize,
}

/// Translates pointer events into store operations.
pub struct Interaction {
    rng: StdRng,
    style: SpawnStyle,
}

impl Interaction {
    pub fn new(seed: u64) -> Self {
        Self::with_style(seed, SpawnStyle::default())
    }

    pub fn with_style(seed: u64, style: SpawnStyle) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            style: Self::checked(style),
        }
    }

    // Radii above the grid cell size would let overlapping pairs skip the
    // broad phase.
    fn checked(mut style: SpawnStyle) -> SpawnStyle {
        style.max_radius = if style.max_radius.is_nan() {
            BIGGER_RADIUS
        } else {
            fit_radius(style.max_radius)
        };
        style.min_radius = fit_radius(style.min_radius).min(style.max_radius);
        style
    }

    pub fn style(&self) -> &SpawnStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: SpawnStyle) {
        self.style = Self::checked(style);
    }

    /// Apply every queued event in order.
    pub fn apply<I>(
        &mut self,
        events: I,
        instances: &mut InstanceStore,
        bodies: &mut VerletStore,
        viewport: &Viewport,
        ui_captures_pointer: bool,
    ) -> InteractionReport
    where
        I: IntoIterator<Item = InputEvent>,
    {
        let mut report = InteractionReport::default();
        for event in events {
            if ui_captures_pointer {
                report.ignored += 1;
                continue;
            }
            let sim_pos = viewport.to_simulation(event.screen_pos);
            match event.action {
                PointerAction::Spawn => {
                    if viewport.in_panel(sim_pos) {
                        continue;
                    }
                    // A full table is already logged by the store.
                    if let Ok(h) = self.spawn_at(sim_pos, instances, bodies) {
                        report.spawned.push(h);
                    }
                }
                PointerAction::Delete => {
                    if let Some(h) = self.delete_at(sim_pos, instances) {
                        report.deleted.push(h);
                    }
                }
            }
        }
        if !report.spawned.is_empty() || !report.deleted.is_empty() {
            tracing::debug!(
                spawned = report.spawned.len(),
                deleted = report.deleted.len(),
                "pointer events applied"
            );
        }
        report
    }

    /// Create a circle of random radius and its resting body at `sim_pos`.
    pub fn spawn_at(
        &mut self,
        sim_pos: Vec2,
        instances: &mut InstanceStore,
        bodies: &mut VerletStore,
    ) -> Result<Handle, StoreError> {
        let style = self.style;
        let radius = if style.max_radius > style.min_radius {
            self.rng.gen_range(style.min_radius..=style.max_radius)
        } else {
            style.max_radius
        };
        let color = if style.random_color {
            Vec4::new(self.rng.gen(), self.rng.gen(), self.rng.gen(), 1.0)
        } else {
            style.color
        };

        let data = InstanceData::new(sim_pos, Vec2::splat(radius), color)
            .with_outline(style.outline_size, style.outline_color);
        let handle = instances.add(InstanceKind::Circle, data)?;
        bodies.place(handle.index(), sim_pos);
        Ok(handle)
    }

    /// First live circle (in storage order) whose disc contains `sim_pos`.
    pub fn pick(sim_pos: Vec2, instances: &InstanceStore) -> Option<Handle> {
        instances
            .iter_alive(InstanceKind::Circle)
            .find(|(_, c)| {
                let d = sim_pos - c.position;
                d.dot(d) <= c.radius() * c.radius()
            })
            .map(|(h, _)| h)
    }

    /// Delete the circle under `sim_pos`. Clicking empty space is a no-op.
    pub fn delete_at(&mut self, sim_pos: Vec2, instances: &mut InstanceStore) -> Option<Handle> {
        let hit = Self::pick(sim_pos, instances)?;
        instances.delete(hit).then_some(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(200.0, 100.0, 40.0)
    }

    #[test]
    fn screen_to_simulation() {
        let vp = viewport();
        assert_eq!(vp.half_extent(), Vec2::new(100.0, 50.0));
        assert_eq!(vp.to_simulation(Vec2::new(100.0, 50.0)), Vec2::ZERO);
        assert_eq!(vp.to_simulation(Vec2::ZERO), Vec2::new(-100.0, -50.0));
        assert!(vp.in_panel(Vec2::new(-60.0, 0.0)));
        assert!(vp.in_panel(Vec2::new(-55.0, 0.0)));
        assert!(!vp.in_panel(Vec2::new(-54.0, 0.0)));
    }

    #[test]
    fn spawn_respects_panel_and_radius_range() {
        let mut instances = InstanceStore::new();
        let mut bodies = VerletStore::new();
        let mut interaction = Interaction::new(1);
        let vp = viewport();

        let events = (0..50).map(|i| {
            InputEvent::new(
                PointerAction::Spawn,
                PointerPhase::Dragged,
                Vec2::new(60.0 + i as f32 * 2.0, 50.0),
            )
        });
        let report = interaction.apply(events, &mut instances, &mut bodies, &vp, false);

        // Screen x below 100 - 100 + 40 + 5 = 45 lands in the panel; none here.
        assert_eq!(report.spawned.len(), 50);
        for (h, c) in instances.iter_alive(InstanceKind::Circle) {
            assert!(c.radius() >= SMALLER_RADIUS && c.radius() <= BIGGER_RADIUS);
            let body = bodies.get(h.index()).unwrap();
            assert_eq!(body.current_pos, c.position);
            assert_eq!(body.old_pos, c.position);
        }

        let blocked = [InputEvent::new(PointerAction::Spawn, PointerPhase::Pressed, Vec2::new(10.0, 50.0))];
        let report = interaction.apply(blocked, &mut instances, &mut bodies, &vp, false);
        assert!(report.spawned.is_empty());
    }

    #[test]
    fn bad_radius_range_is_repaired() {
        let negative = Interaction::with_style(
            0,
            SpawnStyle {
                max_radius: -1.0,
                ..SpawnStyle::default()
            },
        );
        assert_eq!(negative.style().max_radius, 0.0);
        assert_eq!(negative.style().min_radius, 0.0);

        let mut nan = Interaction::new(0);
        nan.set_style(SpawnStyle {
            min_radius: f32::NAN,
            max_radius: f32::NAN,
            ..SpawnStyle::default()
        });
        assert_eq!(nan.style().max_radius, BIGGER_RADIUS);
        assert_eq!(nan.style().min_radius, SMALLER_RADIUS);

        let mut instances = InstanceStore::new();
        let mut bodies = VerletStore::new();
        let mut inverted = Interaction::with_style(
            0,
            SpawnStyle {
                min_radius: 3.5,
                max_radius: 2.5,
                ..SpawnStyle::default()
            },
        );
        let h = inverted.spawn_at(Vec2::ZERO, &mut instances, &mut bodies).unwrap();
        assert_eq!(instances.get(h).unwrap().radius(), 2.5);
    }

    #[test]
    fn spawns_stop_when_the_table_is_full() {
        let mut instances = InstanceStore::with_slot_limit(1);
        let mut bodies = VerletStore::new();
        let mut interaction = Interaction::new(2);
        let events = [
            InputEvent::new(PointerAction::Spawn, PointerPhase::Pressed, Vec2::new(150.0, 50.0)),
            InputEvent::new(PointerAction::Spawn, PointerPhase::Dragged, Vec2::new(160.0, 50.0)),
        ];

        let report = interaction.apply(events, &mut instances, &mut bodies, &viewport(), false);
        assert_eq!(report.spawned.len(), 1);
        assert_eq!(instances.live_count(InstanceKind::Circle), 1);
        assert_eq!(bodies.len(), 1);
    }

    #[test]
    fn pick_takes_first_in_storage_order() {
        let mut instances = InstanceStore::new();
        let a = instances.add_circle(Vec2::new(0.0, 0.0), 4.0, Vec4::ONE).unwrap();
        let b = instances.add_circle(Vec2::new(1.0, 0.0), 4.0, Vec4::ONE).unwrap();

        // Closer to b, but a comes first.
        assert_eq!(Interaction::pick(Vec2::new(1.0, 0.0), &instances), Some(a));
        instances.delete(a);
        assert_eq!(Interaction::pick(Vec2::new(1.0, 0.0), &instances), Some(b));
        assert_eq!(Interaction::pick(Vec2::new(30.0, 0.0), &instances), None);
    }

    #[test]
    fn delete_under_cursor() {
        let mut instances = InstanceStore::new();
        let mut bodies = VerletStore::new();
        let mut interaction = Interaction::new(3);
        let vp = viewport();

        let h = interaction.spawn_at(Vec2::new(10.0, 10.0), &mut instances, &mut bodies).unwrap();
        let miss = [InputEvent::new(PointerAction::Delete, PointerPhase::Pressed, Vec2::new(190.0, 90.0))];
        let report = interaction.apply(miss, &mut instances, &mut bodies, &vp, false);
        assert!(report.deleted.is_empty());
        assert!(instances.exists(h));

        let hit = [InputEvent::new(PointerAction::Delete, PointerPhase::Pressed, Vec2::new(110.0, 60.0))];
        let report = interaction.apply(hit, &mut instances, &mut bodies, &vp, false);
        assert_eq!(report.deleted, vec![h]);
        assert!(!instances.exists(h));
    }

    #[test]
    fn ui_capture_drops_events() {
        let mut instances = InstanceStore::new();
        let mut bodies = VerletStore::new();
        let mut interaction = Interaction::new(3);
        let mut queue = InputQueue::new();
        queue.push(InputEvent::new(PointerAction::Spawn, PointerPhase::Pressed, Vec2::new(150.0, 50.0)));
        queue.push(InputEvent::new(PointerAction::Spawn, PointerPhase::Dragged, Vec2::new(151.0, 50.0)));

        let report = interaction.apply(queue.drain(), &mut instances, &mut bodies, &viewport(), true);
        assert_eq!(report.ignored, 2);
        assert!(queue.is_empty());
        assert_eq!(instances.live_count(InstanceKind::Circle), 0);
    }

    #[test]
    fn fixed_and_random_colours() {
        let mut instances = InstanceStore::new();
        let mut bodies = VerletStore::new();
        let mut fixed = Interaction::new(9);
        let h = fixed.spawn_at(Vec2::ZERO, &mut instances, &mut bodies).unwrap();
        assert_eq!(instances.get(h).unwrap().color, SpawnStyle::default().color);

        let mut random = Interaction::with_style(
            9,
            SpawnStyle {
                random_color: true,
                max_radius: 50.0,
                ..SpawnStyle::default()
            },
        );
        assert_eq!(random.style().max_radius, BIGGER_RADIUS);
        let h = random.spawn_at(Vec2::ZERO, &mut instances, &mut bodies).unwrap();
        let c = instances.get(h).unwrap().color;
        assert!(c.x >= 0.0 && c.x < 1.0 && c.w == 1.0);
    }
}
