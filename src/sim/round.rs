//! Hit accounting and the round / match state machine

use glam::Vec2;

use super::events::EventKind;
use super::geometry::direction_or;
use super::physics::impulse;
use super::state::{DuelState, MatchPhase, Side};
use crate::consts::*;

impl DuelState {
    /// Begin a fresh match from the idle state
    pub fn start_match(&mut self) {
        self.score = Default::default();
        self.round_index = 0;
        self.place_for_round();
        self.focus = Default::default();
        self.focus.add(FOCUS_MATCH_START, self.combatants.player.style);
        self.begin_round();
        log::info!(
            "Match started: {} vs {} ({})",
            self.combatants.player.style.as_str(),
            self.combatants.counterpart.style.as_str(),
            self.difficulty.as_str()
        );
    }

    /// Count a body hit against `victim`
    pub fn register_hit(&mut self, victim: Side, attacker_pos: Vec2) {
        if !self.round_active() {
            return;
        }
        let now = self.clock_ms;
        let body = self.combatants.get_mut(victim);
        body.round_hits += 1;
        let pos = body.pos;

        if body.round_hits >= body.style.max_hits() {
            self.emit(EventKind::FatalHit, pos, victim);
            self.end_round(victim.opponent());
            return;
        }

        // Survivable hit: shove the victim away and shield it briefly
        let away = direction_or(attacker_pos, body.pos, body.facing * -1.0);
        impulse(body, away, KNOCKBACK_FORCE);
        body.invulnerable_until = now + SHIELD_INVULN_MS;
        self.screen_shake = SHIELD_SHAKE;
        self.emit(EventKind::ShieldHit, pos, victim);
    }

    /// Award the round to `winner` and freeze the arena
    pub(crate) fn end_round(&mut self, winner: Side) {
        self.focus.active = false;
        self.focus.remaining_ms = 0.0;
        self.screen_shake = ROUND_END_SHAKE;
        self.slow_mo = ROUND_END_SLOW_MO;

        *self.score.get_mut(winner) += 1;
        let pos = self.combatants.get(winner).pos;
        self.emit(EventKind::RoundEnd, pos, winner);
        log::info!(
            "Round {} to {:?} (score {}-{})",
            self.round_index + 1,
            winner,
            self.score.player,
            self.score.counterpart
        );

        if *self.score.get(winner) >= WIN_SCORE {
            self.phase = MatchPhase::MatchEnded { winner };
            self.emit(EventKind::MatchEnd, pos, winner);
            log::info!("Match over, {:?} wins", winner);
        } else {
            self.phase = MatchPhase::RoundEnding {
                resume_at_ms: self.clock_ms + ROUND_FREEZE_MS,
            };
        }
    }

    /// Reset the arena once the round-ending freeze has elapsed
    pub(crate) fn update_round_timer(&mut self) {
        if let MatchPhase::RoundEnding { resume_at_ms } = self.phase {
            if self.clock_ms >= resume_at_ms {
                self.reset_round();
            }
        }
    }

    /// Start the next round of the current match
    pub fn reset_round(&mut self) {
        if self.match_over() {
            return;
        }
        let carried = self.focus.gauge + FOCUS_ROUND_CARRYOVER;
        self.place_for_round();
        self.focus = Default::default();
        self.focus.add(carried, self.combatants.player.style);
        self.slow_mo = 1.0;
        self.round_index += 1;
        self.begin_round();
    }

    fn begin_round(&mut self) {
        if let Some(brain) = self.counterpart_ai.as_mut() {
            brain.reset();
        }
        if let Some(brain) = self.autopilot.as_mut() {
            brain.reset();
        }
        self.phase = MatchPhase::RoundActive;
        let pos = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) * 0.5;
        self.emit(EventKind::RoundStart, pos, Side::Player);
        log::debug!("Round {} begins at {:.0} ms", self.round_index + 1, self.clock_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::Style;

    fn duel_with(style: Style) -> DuelState {
        let settings = Settings {
            player_style: style,
            counterpart_style: Some(style),
            difficulty: crate::sim::state::Difficulty::Grandmaster,
            ..Settings::default()
        };
        let mut state = DuelState::new(&settings);
        state.start_match();
        state.events.clear();
        state
    }

    #[test]
    fn test_start_match_seeds_focus_by_style() {
        let heavy = duel_with(Style::Heavy);
        assert_eq!(heavy.focus.gauge, FOCUS_MATCH_START);
        assert!(heavy.round_active());

        let light = duel_with(Style::Light);
        assert_eq!(light.focus.gauge, 0.0);
    }

    #[test]
    fn test_heavy_dies_in_one_hit() {
        let mut state = duel_with(Style::Heavy);
        let attacker = state.combatants.player.pos;
        state.register_hit(Side::Counterpart, attacker);

        assert_eq!(state.score.player, 1);
        assert!(matches!(
            state.phase,
            MatchPhase::RoundEnding { resume_at_ms } if resume_at_ms == state.clock_ms + ROUND_FREEZE_MS
        ));
        assert_eq!(state.slow_mo, ROUND_END_SLOW_MO);
        assert_eq!(state.screen_shake, ROUND_END_SHAKE);
        assert!(state.events.contains(EventKind::FatalHit));
        assert!(state.events.contains(EventKind::RoundEnd));
    }

    #[test]
    fn test_light_survives_first_hit() {
        let mut state = duel_with(Style::Light);
        let attacker = state.combatants.player.pos;
        state.register_hit(Side::Counterpart, attacker);

        let victim = &state.combatants.counterpart;
        assert_eq!(victim.round_hits, 1);
        assert!(victim.vel.x > 0.0); // knocked away from the attacker
        assert!(victim.is_invulnerable(state.clock_ms + 700.0));
        assert!(state.round_active());
        assert!(state.events.contains(EventKind::ShieldHit));
        assert_eq!(state.score.player, 0);

        state.register_hit(Side::Counterpart, attacker);
        assert_eq!(state.score.player, 1);
        assert!(!state.round_active());
    }

    #[test]
    fn test_hits_ignored_outside_active_round() {
        let mut state = duel_with(Style::Heavy);
        state.register_hit(Side::Counterpart, Vec2::ZERO);
        state.register_hit(Side::Counterpart, Vec2::ZERO);
        assert_eq!(state.score.player, 1);
    }

    #[test]
    fn test_round_end_cancels_focus() {
        let mut state = duel_with(Style::Heavy);
        state.focus.active = true;
        state.focus.remaining_ms = 1500.0;
        state.register_hit(Side::Player, Vec2::ZERO);
        assert!(!state.focus.active);
        assert_eq!(state.score.counterpart, 1);
    }

    #[test]
    fn test_reset_after_freeze() {
        let mut state = duel_with(Style::Heavy);
        state.focus.gauge = 90.0;
        state.combatants.player.resources.stamina = 10.0;
        state.combatants.player.resources.attack_cooldown = 400.0;
        state.register_hit(Side::Counterpart, Vec2::ZERO);

        state.clock_ms += ROUND_FREEZE_MS - 16.0;
        state.update_round_timer();
        assert!(!state.round_active());

        state.clock_ms += 16.0;
        state.update_round_timer();
        assert!(state.round_active());
        assert_eq!(state.round_index, 1);
        assert_eq!(state.slow_mo, 1.0);
        assert_eq!(state.focus.gauge, FOCUS_MAX);
        let player = &state.combatants.player;
        assert_eq!(player.pos, Vec2::new(LEFT_SPAWN.0, LEFT_SPAWN.1));
        assert_eq!(player.resources.stamina, STAMINA_MAX);
        assert_eq!(player.resources.attack_cooldown, 0.0);
        assert!(state.blades.is_empty() && state.walls.is_empty());
        assert!(state.events.contains(EventKind::RoundStart));
    }

    #[test]
    fn test_reset_restores_round_start_snapshot() {
        use crate::sim::state::AttackKind;
        use crate::sim::tick::{TickInput, tick};

        let mut state = duel_with(Style::Heavy);
        state.counterpart_ai = None;
        let start = state.combatants.clone();

        // Dirty both bodies, then land a fatal thrust through the tick loop
        state.combatants.counterpart.pos = start.player.pos + Vec2::new(150.0, 0.0);
        state.combatants.counterpart.vel = Vec2::new(3.0, -2.0);
        state.combatants.counterpart.resources.stamina = 40.0;
        state.combatants.counterpart.combo.count = 2;
        state.combatants.player.invulnerable_until = 5_000.0;
        let input = TickInput {
            aim: state.combatants.counterpart.pos,
            attack: Some(AttackKind::Thrust),
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.score.player, 1);
        assert!(!state.round_active());

        let idle = TickInput::default();
        for _ in 0..1000 {
            if state.round_active() {
                break;
            }
            tick(&mut state, &idle);
        }
        assert!(state.round_active());
        assert_eq!(state.round_index, 1);
        assert_eq!(state.score.player, 1);

        for side in [Side::Player, Side::Counterpart] {
            let now = state.combatants.get(side);
            let then = start.get(side);
            assert_eq!(now.pos, then.pos);
            assert_eq!(now.vel, Vec2::ZERO);
            assert_eq!(now.facing, then.facing);
            assert_eq!(now.resources, then.resources);
            assert_eq!(now.round_hits, 0);
            assert_eq!(now.invulnerable_until, 0.0);
            assert_eq!(now.combo, then.combo);
            assert!(now.trail.is_empty());
        }
        assert!(state.blades.is_empty());
        assert!(state.walls.is_empty());
    }

    #[test]
    fn test_fifth_point_ends_match_immediately() {
        let mut state = duel_with(Style::Heavy);
        state.score.counterpart = WIN_SCORE - 1;
        state.register_hit(Side::Player, Vec2::ZERO);

        assert_eq!(
            state.phase,
            MatchPhase::MatchEnded {
                winner: Side::Counterpart
            }
        );
        assert!(state.events.contains(EventKind::MatchEnd));

        // No pending reset survives
        state.clock_ms += 10.0 * ROUND_FREEZE_MS;
        state.update_round_timer();
        assert!(state.match_over());
        state.reset_round();
        assert!(state.match_over());
    }
}
