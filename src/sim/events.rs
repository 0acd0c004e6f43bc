//! Discrete combat events for presentation collaborators
//!
//! Resolution code pushes events as it mutates state; audio, particles and
//! combat text drain the queue after each tick. Nothing in the simulation
//! reads events back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Side;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Thrust,
    Slash,
    /// Neutral blade-vs-blade clash, or a blade stopped by a wall
    Clash,
    /// Emitted for the side whose slash parried a thrust
    ParrySuccess,
    /// Emitted for the side whose thrust was parried
    ParryFailure,
    /// Non-fatal hit absorbed by a light combatant
    ShieldHit,
    FatalHit,
    Dash,
    WallPlace,
    FocusStart,
    RoundStart,
    RoundEnd,
    MatchEnd,
}

/// A single event with its world position and acting side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatEvent {
    pub kind: EventKind,
    pub pos: Vec2,
    pub side: Side,
}

/// Ordered event buffer, drained once per tick by the consumer
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<CombatEvent>,
}

impl EventQueue {
    pub fn push(&mut self, kind: EventKind, pos: Vec2, side: Side) {
        self.events.push(CombatEvent { kind, pos, side });
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True if an event of `kind` is pending
    pub fn contains(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }
}
