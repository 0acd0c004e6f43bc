//! Deterministic simulation module
//!
//! All combat logic lives here. This module must stay deterministic:
//! - Fixed 16 ms timestep only
//! - Seeded RNG only (one `Pcg32` per AI brain)
//! - Stable iteration order (blades and walls in insertion order)
//! - No rendering, audio or transport dependencies

pub mod actions;
pub mod ai;
pub mod collision;
pub mod events;
pub mod geometry;
pub mod physics;
pub mod round;
pub mod state;
pub mod tick;

pub use ai::{AiBrain, DifficultyPreset, Posture};
pub use collision::{BladeContact, resolve_collisions};
pub use events::{CombatEvent, EventKind, EventQueue};
pub use geometry::{blade_threatens, distance_to_segment, segment_intersection};
pub use state::{
    AttackKind, Authority, Blade, Combatant, Difficulty, DuelState, Focus, MatchPhase, PerSide,
    Resources, Role, Side, Style, Wall,
};
pub use tick::{RemoteFeed, TickInput, tick, tick_with_remote};
