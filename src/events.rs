//! Typed notification bus between simulation systems
//!
//! Payloads are a closed enum rather than type-erased blobs, and the bus is
//! an explicitly constructed value owned by the simulation root - no global
//! registry. Systems subscribe by kind; the root drains the queue at the end
//! of each tick and delivers every event to its subscribers in registration
//! order. Delivered events are also kept in a per-tick outbox so external
//! collaborators (rendering, audio, camera) can observe them between frames.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::grenade::GrenadeKind;

/// Event discriminant used for subscription routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    FireWeapon,
    SecondaryFire,
    Explosion,
    ProjectileSpawned,
    PlayerDied,
    PlayerTeleport,
}

/// Simulation systems that can subscribe to events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemId {
    Terrain,
    Grenades,
    Players,
}

/// Snapshot of the firing player taken when the trigger was pulled
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FireData {
    pub player_id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub aim_direction: f32,
    pub weapon: GrenadeKind,
}

/// Explosion payload consumed by terrain, players and external collaborators
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExplosionData {
    pub position: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub knockback: f32,
    pub terrain_damage_modifier: f32,
    pub terrain_wobble_modifier: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    FireWeapon(FireData),
    SecondaryFire {
        player_id: u32,
    },
    Explosion(ExplosionData),
    ProjectileSpawned {
        kind: GrenadeKind,
        owner: Option<u32>,
        position: Vec2,
    },
    PlayerDied {
        player_id: u32,
    },
    PlayerTeleport {
        player_id: u32,
        position: Vec2,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::FireWeapon(_) => EventKind::FireWeapon,
            Event::SecondaryFire { .. } => EventKind::SecondaryFire,
            Event::Explosion(_) => EventKind::Explosion,
            Event::ProjectileSpawned { .. } => EventKind::ProjectileSpawned,
            Event::PlayerDied { .. } => EventKind::PlayerDied,
            Event::PlayerTeleport { .. } => EventKind::PlayerTeleport,
        }
    }
}

/// Event queue plus a kind-to-subscribers routing table
#[derive(Default)]
pub struct EventBus {
    queue: VecDeque<Event>,
    routes: BTreeMap<EventKind, Vec<SystemId>>,
    outbox: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a system to an event kind. Delivery within a kind follows
    /// registration order.
    pub fn register(&mut self, kind: EventKind, system: SystemId) {
        self.routes.entry(kind).or_default().push(system);
    }

    /// Enqueue an event for end-of-tick routing
    pub fn send(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Next queued event, in emission order. Used by the simulation root
    /// while routing.
    pub fn pop(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    pub fn subscribers(&self, kind: EventKind) -> &[SystemId] {
        self.routes.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events routed during the last tick, for external collaborators
    pub fn outbox(&self) -> &[Event] {
        &self.outbox
    }

    pub(crate) fn begin_tick(&mut self) {
        self.outbox.clear();
    }

    pub(crate) fn record(&mut self, event: Event) {
        self.outbox.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_preserved() {
        let mut bus = EventBus::new();
        bus.register(EventKind::Explosion, SystemId::Terrain);
        bus.register(EventKind::Explosion, SystemId::Players);

        assert_eq!(
            bus.subscribers(EventKind::Explosion),
            &[SystemId::Terrain, SystemId::Players]
        );
        assert!(bus.subscribers(EventKind::FireWeapon).is_empty());
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut bus = EventBus::new();
        bus.send(Event::PlayerDied { player_id: 1 });
        bus.send(Event::SecondaryFire { player_id: 2 });

        assert_eq!(bus.pop().map(|e| e.kind()), Some(EventKind::PlayerDied));
        assert_eq!(bus.pop().map(|e| e.kind()), Some(EventKind::SecondaryFire));
        assert!(bus.pop().is_none());
    }

    #[test]
    fn test_outbox_cleared_per_tick() {
        let mut bus = EventBus::new();
        bus.record(Event::PlayerDied { player_id: 0 });
        assert_eq!(bus.outbox().len(), 1);

        bus.begin_tick();
        assert!(bus.outbox().is_empty());
    }
}
