//! Learning-agent boundary
//!
//! A fixed 16-value observation, a 13-way discrete action set and a shaped
//! step reward. Training itself happens outside this crate.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::consts::*;
use crate::sim::physics::apply_intent;
use crate::sim::{AttackKind, CombatEvent, DuelState, EventKind, Side, TickInput};

pub const OBSERVATION_LEN: usize = 16;
pub const ACTION_COUNT: usize = 13;

/// Component of a diagonal move
const DIAGONAL: f32 = 0.707;

/// Normalized view of the duel from one side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation(pub [f32; OBSERVATION_LEN]);

impl Observation {
    /// Capture the world as seen by `me`
    pub fn capture(state: &DuelState, me: Side) -> Self {
        let own = state.combatant(me);
        let opp = state.combatant(me.opponent());
        let d = opp.pos - own.pos;

        Self([
            own.pos.x / ARENA_WIDTH,
            own.pos.y / ARENA_HEIGHT,
            own.vel.x / 50.0,
            own.vel.y / 50.0,
            opp.pos.x / ARENA_WIDTH,
            opp.pos.y / ARENA_HEIGHT,
            opp.vel.x / 50.0,
            opp.vel.y / 50.0,
            d.length() / ARENA_WIDTH,
            d.y.atan2(d.x) / TAU,
            own.resources.stamina / STAMINA_MAX,
            opp.resources.stamina / STAMINA_MAX,
            own.resources.attack_cooldown / 500.0,
            opp.resources.attack_cooldown / 500.0,
            if opp.resources.attack_cooldown > 0.0 { 1.0 } else { 0.0 },
            state.round_index as f32 / 10.0,
        ])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Discrete agent action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RlAction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    Thrust,
    Slash,
    Dash,
    Wall,
    Idle,
}

impl RlAction {
    pub const ALL: [RlAction; ACTION_COUNT] = [
        RlAction::Up,
        RlAction::Down,
        RlAction::Left,
        RlAction::Right,
        RlAction::UpLeft,
        RlAction::UpRight,
        RlAction::DownLeft,
        RlAction::DownRight,
        RlAction::Thrust,
        RlAction::Slash,
        RlAction::Dash,
        RlAction::Wall,
        RlAction::Idle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Movement vector for the move actions (screen space, +y down)
    pub fn movement(self) -> Vec2 {
        match self {
            RlAction::Up => Vec2::new(0.0, -1.0),
            RlAction::Down => Vec2::new(0.0, 1.0),
            RlAction::Left => Vec2::new(-1.0, 0.0),
            RlAction::Right => Vec2::new(1.0, 0.0),
            RlAction::UpLeft => Vec2::new(-DIAGONAL, -DIAGONAL),
            RlAction::UpRight => Vec2::new(DIAGONAL, -DIAGONAL),
            RlAction::DownLeft => Vec2::new(-DIAGONAL, DIAGONAL),
            RlAction::DownRight => Vec2::new(DIAGONAL, DIAGONAL),
            _ => Vec2::ZERO,
        }
    }

    /// Player tick input for this action, aimed at the counterpart
    pub fn to_input(self, state: &DuelState) -> TickInput {
        TickInput {
            movement: self.movement(),
            aim: state.combatant(Side::Counterpart).pos,
            attack: match self {
                RlAction::Thrust => Some(AttackKind::Thrust),
                RlAction::Slash => Some(AttackKind::Slash),
                _ => None,
            },
            dash: self == RlAction::Dash,
            wall: self == RlAction::Wall,
            ..Default::default()
        }
    }

    /// Perform this action directly for `side`
    ///
    /// Used when the agent drives the counterpart instead of the player.
    /// Movement is applied as a velocity intent at normal speed.
    pub fn apply(self, state: &mut DuelState, side: Side) {
        let target = state.combatant(side.opponent()).pos;
        match self {
            RlAction::Thrust => state.perform_attack(side, AttackKind::Thrust, target),
            RlAction::Slash => state.perform_attack(side, AttackKind::Slash, target),
            RlAction::Dash => {
                let facing = state.combatant(side).facing;
                state.perform_dash(side, facing);
            }
            RlAction::Wall => state.perform_wall(side, target),
            RlAction::Idle => {}
            _ => {
                if state.round_active() {
                    let dt = state.time_scale();
                    apply_intent(state.combatant_mut(side), self.movement(), MOVE_SPEED, dt);
                }
            }
        }
    }
}

/// Shaped reward for one side, tracking stamina between steps
#[derive(Debug, Clone)]
pub struct RewardTracker {
    side: Side,
    last_own_stamina: f32,
    last_opp_stamina: f32,
}

impl RewardTracker {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            last_own_stamina: STAMINA_MAX,
            last_opp_stamina: STAMINA_MAX,
        }
    }

    /// Reward for the tick that produced `events`
    pub fn step(&mut self, state: &DuelState, events: &[CombatEvent]) -> f32 {
        let me = self.side;
        let mut reward = 0.0;

        for event in events {
            match event.kind {
                // Hit events carry the victim
                EventKind::FatalHit | EventKind::ShieldHit if event.side == me => reward -= 10.0,
                EventKind::FatalHit | EventKind::ShieldHit => reward += 10.0,
                EventKind::ParrySuccess if event.side == me => reward += 5.0,
                EventKind::ParryFailure if event.side == me => reward -= 3.0,
                EventKind::RoundEnd if event.side == me => reward += 50.0,
                EventKind::RoundEnd => reward -= 50.0,
                _ => {}
            }
        }

        let dist = state.separation();
        if (180.0..=280.0).contains(&dist) {
            reward += 0.1;
        } else if dist < 100.0 {
            reward -= 0.2;
        } else if dist > 500.0 {
            reward -= 0.15;
        }

        let own = state.combatant(me).resources.stamina;
        let opp = state.combatant(me.opponent()).resources.stamina;
        if own - self.last_own_stamina < -30.0 {
            reward -= 0.5;
        } else if own > 100.0 {
            reward += 0.05;
        }
        if opp - self.last_opp_stamina < -20.0 {
            reward += 0.3;
        }
        self.last_own_stamina = own;
        self.last_opp_stamina = opp;

        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::tick;

    fn duel() -> DuelState {
        let mut state = DuelState::new(&Settings::default());
        state.start_match();
        state
    }

    #[test]
    fn test_observation_layout() {
        let mut state = duel();
        state.combatants.counterpart.resources.attack_cooldown = 250.0;
        state.round_index = 3;
        let obs = Observation::capture(&state, Side::Player);
        let v = obs.as_slice();

        assert_eq!(v.len(), OBSERVATION_LEN);
        assert!((v[0] - 300.0 / 1200.0).abs() < 1e-6);
        assert!((v[1] - 0.5).abs() < 1e-6);
        assert!((v[4] - 0.75).abs() < 1e-6);
        assert!((v[8] - 0.5).abs() < 1e-6);
        assert!(v[9].abs() < 1e-6); // counterpart straight to the right
        assert_eq!(v[10], 1.0);
        assert!((v[13] - 0.5).abs() < 1e-6);
        assert_eq!(v[14], 1.0);
        assert!((v[15] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_observation_is_relative_to_side() {
        let state = duel();
        let obs = Observation::capture(&state, Side::Counterpart);
        assert!((obs.0[0] - 0.75).abs() < 1e-6);
        assert!((obs.0[4] - 0.25).abs() < 1e-6);
        assert!((obs.0[9] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_action_indices_round_trip() {
        for (i, action) in RlAction::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(RlAction::from_index(i), Some(*action));
        }
        assert_eq!(RlAction::from_index(ACTION_COUNT), None);
        assert_eq!(RlAction::from_index(8), Some(RlAction::Thrust));
        assert_eq!(RlAction::from_index(12), Some(RlAction::Idle));
    }

    #[test]
    fn test_action_translation() {
        let state = duel();
        let input = RlAction::UpLeft.to_input(&state);
        assert_eq!(input.movement, Vec2::new(-0.707, -0.707));
        assert!(input.attack.is_none());

        let input = RlAction::Slash.to_input(&state);
        assert_eq!(input.attack, Some(AttackKind::Slash));
        assert_eq!(input.aim, state.combatants.counterpart.pos);
        assert!(RlAction::Wall.to_input(&state).wall);
        assert!(RlAction::Dash.to_input(&state).dash);
    }

    #[test]
    fn test_apply_drives_counterpart() {
        let mut state = duel();
        state.counterpart_ai = None;
        RlAction::Thrust.apply(&mut state, Side::Counterpart);
        assert_eq!(state.blades.len(), 1);
        assert_eq!(state.blades[0].owner, Side::Counterpart);

        RlAction::Up.apply(&mut state, Side::Counterpart);
        assert!(state.combatants.counterpart.vel.y < 0.0);
    }

    #[test]
    fn test_reward_for_landing_a_hit() {
        let mut state = duel();
        let mut tracker = RewardTracker::new(Side::Player);
        let attacker = state.combatants.player.pos;
        state.drain_events();
        state.register_hit(Side::Counterpart, attacker);
        let events = state.drain_events();
        let reward = tracker.step(&state, &events);
        // Hit, round win, distance 600 too far
        assert!((reward - (10.0 + 50.0 - 0.15 + 0.05)).abs() < 1e-4);
    }

    #[test]
    fn test_reward_tracks_stamina_swings() {
        let mut state = duel();
        let mut tracker = RewardTracker::new(Side::Counterpart);
        state.combatants.player.resources.stamina = 100.0;
        state.combatants.counterpart.resources.stamina = 110.0;
        let reward = tracker.step(&state, &[]);
        // Opponent burned 50, own lost 40
        assert!((reward - (-0.15 - 0.5 + 0.3)).abs() < 1e-4);

        let input = RlAction::Idle.to_input(&state);
        tick(&mut state, &input);
        let events = state.drain_events();
        let reward = tracker.step(&state, &events);
        assert!(reward.is_finite());
    }
}
