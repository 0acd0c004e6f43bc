//! Rule-based opponent
//!
//! An `AiBrain` observes the post-resolution world and drives one side
//! through the same `perform_*` entry points a human uses. Each brain owns
//! a seeded RNG so two matches with the same seed and inputs make the same
//! decisions.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::{angle_to, blade_threatens};
use super::state::{AttackKind, Difficulty, DuelState, Side};
use crate::consts::*;

/// How close a blade must pass to trigger a defensive reaction
const THREAT_RADIUS: f32 = 100.0;
/// Punish attempts only happen inside this distance
const PUNISH_RANGE: f32 = 400.0;
const BASE_IDEAL_DISTANCE: f32 = 200.0;
const CLOSE_SLASH_RANGE: f32 = 80.0;
const CLOSE_SLASH_CHANCE: f64 = 0.1;
/// Minimum stamina (exclusive) before the brain considers dodging
const DODGE_STAMINA: f32 = 30.0;
const ESCAPE_LOCK_MS: f32 = 400.0;
const PUNISH_DASH_LOCK_MS: f32 = 50.0;
const LOW_STAMINA: f32 = 40.0;

/// Per-tier tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyPreset {
    /// Chance to answer an incoming thrust with a slash
    pub parry_chance: f64,
    /// Chance to attack an opponent stuck in recovery
    pub punish_chance: f64,
    /// Added to the ideal fighting distance
    pub spacing: f32,
    /// Action lock after a defensive move (doubled for dodges)
    pub reaction_delay_ms: f32,
    /// Per-tick chance of a thrust when already in range
    pub opportunistic_thrust: f64,
    /// Opponent cooldown above which a punish is attempted
    pub punish_threshold_ms: f32,
    pub move_speed: f32,
}

impl DifficultyPreset {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Novice => Self {
                parry_chance: 0.15,
                punish_chance: 0.10,
                spacing: 100.0,
                reaction_delay_ms: 150.0,
                opportunistic_thrust: 0.03,
                punish_threshold_ms: 200.0,
                move_speed: MOVE_SPEED,
            },
            Difficulty::Duelist => Self {
                parry_chance: 0.20,
                punish_chance: 0.15,
                spacing: 50.0,
                reaction_delay_ms: 150.0,
                opportunistic_thrust: 0.03,
                punish_threshold_ms: 200.0,
                move_speed: MOVE_SPEED,
            },
            Difficulty::Grandmaster => Self {
                parry_chance: 0.95,
                punish_chance: 0.90,
                spacing: -50.0,
                reaction_delay_ms: 100.0,
                opportunistic_thrust: 0.08,
                punish_threshold_ms: 200.0,
                move_speed: MOVE_SPEED,
            },
            Difficulty::Inferno => Self {
                parry_chance: 0.99,
                punish_chance: 1.0,
                spacing: -80.0,
                reaction_delay_ms: 50.0,
                opportunistic_thrust: 0.15,
                punish_threshold_ms: 50.0,
                move_speed: MOVE_SPEED * 1.15,
            },
        }
    }
}

/// Coarse temperament, re-rolled every 600-1200 ms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Posture {
    #[default]
    Neutral,
    /// Opponent is exhausted or exposed; fight closer
    Aggressive,
    /// Own stamina is low; keep extra distance
    Defensive,
}

impl Posture {
    /// Offset applied to the ideal fighting distance
    pub fn distance_bias(self) -> f32 {
        match self {
            Posture::Neutral => 0.0,
            Posture::Aggressive => -40.0,
            Posture::Defensive => 80.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiBrain {
    pub difficulty: Difficulty,
    pub preset: DifficultyPreset,
    posture: Posture,
    action_timer: f32,
    posture_timer: f32,
    /// Movement direction applied on the next tick
    pending_move: Vec2,
    rng: Pcg32,
}

impl AiBrain {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            preset: DifficultyPreset::for_difficulty(difficulty),
            posture: Posture::Neutral,
            action_timer: 0.0,
            posture_timer: 0.0,
            pending_move: Vec2::ZERO,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Forget everything tied to the previous round
    pub fn reset(&mut self) {
        self.posture = Posture::Neutral;
        self.action_timer = 0.0;
        self.posture_timer = 0.0;
        self.pending_move = Vec2::ZERO;
    }

    pub fn posture(&self) -> Posture {
        self.posture
    }

    pub fn action_timer(&self) -> f32 {
        self.action_timer
    }

    pub fn pending_move(&self) -> Vec2 {
        self.pending_move
    }

    pub fn move_speed(&self) -> f32 {
        self.preset.move_speed
    }

    /// Hold off any action for at least `ms`
    pub fn lock_actions(&mut self, ms: f32) {
        self.action_timer = self.action_timer.max(ms);
    }

    pub fn tick_timers(&mut self, elapsed_ms: f32) {
        self.action_timer = (self.action_timer - elapsed_ms).max(0.0);
        self.posture_timer = (self.posture_timer - elapsed_ms).max(0.0);
    }

    /// Decide this tick's actions for `actor` and plan next tick's movement
    pub fn think(&mut self, state: &mut DuelState, actor: Side) {
        if !state.round_active() {
            self.pending_move = Vec2::ZERO;
            return;
        }

        if self.posture_timer <= 0.0 {
            self.update_posture(state, actor);
        }

        if self.action_timer <= 0.0 {
            self.defend(state, actor);
        }
        if self.action_timer <= 0.0 && state.combatant(actor).resources.attack_cooldown <= 0.0 {
            self.attack(state, actor);
        }

        self.pending_move = self.plan_movement(state, actor);
    }

    fn update_posture(&mut self, state: &DuelState, actor: Side) {
        let me = state.combatant(actor);
        let target = state.combatant(actor.opponent());

        let next = if me.resources.stamina < LOW_STAMINA {
            Posture::Defensive
        } else if target.resources.stamina < LOW_STAMINA
            || target.resources.attack_cooldown > self.preset.punish_threshold_ms
        {
            Posture::Aggressive
        } else {
            Posture::Neutral
        };
        if next != self.posture {
            log::trace!("{:?} posture {:?} -> {:?}", actor, self.posture, next);
        }
        self.posture = next;
        self.posture_timer = self.rng.random_range(600.0..1200.0);
    }

    /// React to an opposing blade about to connect
    fn defend(&mut self, state: &mut DuelState, actor: Side) {
        let me = state.combatant(actor);
        let target_pos = state.combatant(actor.opponent()).pos;
        let incoming = state.blades.iter().find(|b| {
            b.owner != actor && b.active && blade_threatens(b.p1, b.p2, b.dir, me.pos, THREAT_RADIUS)
        });
        let Some(incoming) = incoming else {
            return;
        };
        let incoming_kind = incoming.kind;

        let angle = angle_to(me.pos, target_pos);
        let has_stamina = me.resources.stamina > DODGE_STAMINA;

        if me.resources.attack_cooldown <= 0.0 {
            if incoming_kind == AttackKind::Thrust && self.rng.random_bool(self.preset.parry_chance)
            {
                state.perform_attack(actor, AttackKind::Slash, target_pos);
                self.action_timer = self.preset.reaction_delay_ms;
            } else if has_stamina {
                let sign = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                state.perform_dash(actor, Vec2::from_angle(angle + FRAC_PI_2 * sign));
                self.action_timer = self.preset.reaction_delay_ms * 2.0;
            }
        } else if has_stamina {
            state.perform_dash(actor, -Vec2::from_angle(angle));
            self.action_timer = ESCAPE_LOCK_MS;
        }
    }

    fn attack(&mut self, state: &mut DuelState, actor: Side) {
        let me = state.combatant(actor);
        let target = state.combatant(actor.opponent());
        let dist = me.pos.distance(target.pos);
        let target_pos = target.pos;

        let exposed = target.resources.attack_cooldown > self.preset.punish_threshold_ms
            && dist < PUNISH_RANGE;
        if exposed && self.rng.random_bool(self.preset.punish_chance) {
            if dist > THRUST_RANGE {
                if me.resources.stamina > DASH_COST {
                    let toward = Vec2::from_angle(angle_to(me.pos, target_pos));
                    state.perform_dash(actor, toward);
                    self.action_timer = PUNISH_DASH_LOCK_MS;
                }
            } else {
                state.perform_attack(actor, AttackKind::Thrust, target_pos);
            }
        } else if dist < THRUST_RANGE - 20.0 {
            if dist < CLOSE_SLASH_RANGE && self.rng.random_bool(CLOSE_SLASH_CHANCE) {
                state.perform_attack(actor, AttackKind::Slash, target_pos);
            } else if self.rng.random_bool(self.preset.opportunistic_thrust) {
                state.perform_attack(actor, AttackKind::Thrust, target_pos);
            }
        }
    }

    fn plan_movement(&self, state: &DuelState, actor: Side) -> Vec2 {
        let me = state.combatant(actor).pos;
        let target = state.combatant(actor.opponent()).pos;
        let dist = me.distance(target);
        let toward = Vec2::from_angle(angle_to(me, target));

        let ideal = BASE_IDEAL_DISTANCE + self.preset.spacing + self.posture.distance_bias();
        let intent = if dist > ideal + 100.0 {
            toward
        } else if dist < ideal - 50.0 {
            -toward
        } else {
            let orbit = if me.x > ARENA_WIDTH * 0.5 { 1.0 } else { -1.0 };
            let jitter = ((state.clock_ms / 150.0).sin() as f32) * 0.3;
            toward.perp() * orbit * 0.5 + toward * jitter
        };
        intent.normalize_or_zero()
    }
}
