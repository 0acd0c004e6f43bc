//! Ink Duel - a two-combatant dueling simulation
//!
//! Core modules:
//! - `sim`: Deterministic combat simulation (physics, blades, walls, AI, rounds)
//! - `net`: Remote peer protocol (validated action and position messages)
//! - `rl`: Observation vector and discrete action set for learning agents
//! - `settings`: Match configuration

pub mod net;
pub mod rl;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Nominal tick length in milliseconds (~60 Hz)
    pub const TICK_MS: f32 = 16.0;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 1200.0;
    pub const ARENA_HEIGHT: f32 = 800.0;
    /// Velocity kept (and inverted) when bouncing off an arena edge
    pub const ARENA_BOUNCE: f32 = 0.5;

    /// Combatant body radius, also the blade-vs-body hit radius
    pub const COMBATANT_RADIUS: f32 = 20.0;
    /// Velocity retained per unit dt
    pub const FRICTION: f32 = 0.85;
    pub const MOVE_SPEED: f32 = 0.8;
    pub const SPRINT_MULTIPLIER: f32 = 1.7;
    pub const SPRINT_STAMINA_DRAIN: f32 = 0.3;
    /// Trail points are only recorded above this squared speed
    pub const TRAIL_SPEED_SQ: f32 = 25.0;
    pub const TRAIL_LENGTH: usize = 8;

    /// Stamina economy
    pub const STAMINA_MAX: f32 = 150.0;
    pub const STAMINA_REGEN: f32 = 0.5;
    pub const THRUST_COST: f32 = 25.0;
    pub const SLASH_COST: f32 = 15.0;
    pub const DASH_COST: f32 = 30.0;
    pub const WALL_COST: f32 = 30.0;
    /// Stamina refunded to the player on a successful parry
    pub const PARRY_STAMINA_BONUS: f32 = 20.0;

    /// Thrust: a lunge with a long, narrow blade anchored to the owner
    pub const THRUST_RANGE: f32 = 230.0;
    pub const THRUST_DURATION_MS: f32 = 350.0;
    pub const THRUST_LUNGE: f32 = 22.0;

    /// Slash: a wide arc in front of the owner, fixed at spawn
    pub const SLASH_REACH: f32 = 130.0;
    pub const SLASH_OFFSET: f32 = 50.0;
    pub const SLASH_DURATION_MS: f32 = 280.0;
    pub const SLASH_RECOIL: f32 = 3.0;
    pub const FINISHER_REACH_SCALE: f32 = 1.2;
    pub const COMBO_WINDOW_MS: f64 = 800.0;
    pub const COMBO_MAX: u8 = 2;

    /// Dash
    pub const DASH_FORCE: f32 = 35.0;
    pub const DASH_INVULN_MS: f64 = 350.0;

    /// Walls
    pub const WALL_DURATION_MS: f64 = 12_000.0;
    pub const WALL_OFFSET: f32 = 70.0;
    pub const WALL_HALF_LEN: f32 = 110.0;
    pub const WALL_PUSH: f32 = 2.5;
    /// Extra clearance added to the body radius for wall pushes
    pub const WALL_BODY_MARGIN: f32 = 5.0;

    /// Clash and parry resolution
    pub const RECOIL_FORCE: f32 = 12.0;
    pub const PARRY_PUNISH_MS: f32 = 600.0;
    pub const PARRY_PUNISH_LENIENT_MS: f32 = 400.0;
    pub const PARRY_AI_LOCK_MS: f32 = 300.0;

    /// Hits
    pub const KNOCKBACK_FORCE: f32 = 30.0;
    pub const SHIELD_INVULN_MS: f64 = 800.0;

    /// Focus (the zone)
    pub const FOCUS_MAX: f32 = 100.0;
    pub const FOCUS_PASSIVE_GAIN: f32 = 0.02;
    pub const FOCUS_PARRY_GAIN: f32 = 30.0;
    pub const FOCUS_MATCH_START: f32 = 50.0;
    pub const FOCUS_ROUND_CARRYOVER: f32 = 25.0;
    pub const FOCUS_DURATION_MS: f32 = 2000.0;
    pub const FOCUS_TIME_SCALE: f32 = 0.4;
    /// Additional attack cooldown drained per tick while focused
    pub const FOCUS_COOLDOWN_DRAIN: f32 = 30.0;

    /// Presentation feedback driven by the simulation
    pub const SLOW_MO_RECOVERY: f32 = 0.05;
    pub const CLASH_SLOW_MO: f32 = 0.2;
    pub const ROUND_END_SLOW_MO: f32 = 0.05;
    pub const CLASH_SHAKE: f32 = 15.0;
    pub const SHIELD_SHAKE: f32 = 10.0;
    pub const ROUND_END_SHAKE: f32 = 25.0;
    pub const PARRY_FLASH: f32 = 0.8;

    /// Round / match
    pub const WIN_SCORE: u32 = 5;
    pub const ROUND_FREEZE_MS: f64 = 1000.0;
    pub const LEFT_SPAWN: (f32, f32) = (300.0, 400.0);
    pub const RIGHT_SPAWN: (f32, f32) = (900.0, 400.0);
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
