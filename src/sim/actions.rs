//! Intent entry points shared by local input, the AI and remote peers
//!
//! Every action validates its own preconditions and silently does nothing
//! when they fail. Callers observe failure only through unchanged
//! resources and cooldowns.

use glam::Vec2;

use super::events::EventKind;
use super::geometry::direction_or;
use super::physics::impulse;
use super::state::{AttackKind, Blade, DuelState, Side, Wall};
use crate::consts::*;

impl DuelState {
    /// Thrust or slash toward `aim`
    pub fn perform_attack(&mut self, side: Side, kind: AttackKind, aim: Vec2) {
        if !self.round_active() || !aim.is_finite() {
            return;
        }
        let now = self.clock_ms;
        let focus_active = self.focus.active;

        let fighter = self.combatants.get_mut(side);
        if fighter.resources.attack_cooldown > 0.0 || !fighter.resources.try_spend(kind.cost()) {
            return;
        }

        let dir = direction_or(fighter.pos, aim, fighter.facing);
        fighter.facing = dir;
        let style = fighter.style;
        let pos = fighter.pos;

        let mut finisher = false;
        let (p1, p2) = match kind {
            AttackKind::Thrust => {
                fighter.combo.count = 0;
                impulse(fighter, dir, THRUST_LUNGE);
                fighter.resources.attack_cooldown = style.thrust_cooldown();
                (pos, pos + dir * THRUST_RANGE)
            }
            AttackKind::Slash => {
                if now - fighter.combo.last_ms < COMBO_WINDOW_MS && fighter.combo.count < COMBO_MAX
                {
                    fighter.combo.count += 1;
                } else {
                    fighter.combo.count = 1;
                }
                fighter.combo.last_ms = now;
                impulse(fighter, -dir, SLASH_RECOIL);

                finisher = fighter.combo.count >= COMBO_MAX;
                fighter.resources.attack_cooldown = if finisher {
                    style.finisher_cooldown()
                } else {
                    style.slash_cooldown()
                };

                let reach = if finisher {
                    SLASH_REACH * FINISHER_REACH_SCALE
                } else {
                    SLASH_REACH
                };
                let center = pos + dir * SLASH_OFFSET;
                let perp = dir.perp() * reach;
                // The finisher sweeps the opposite way
                if finisher {
                    (center + perp, center - perp)
                } else {
                    (center - perp, center + perp)
                }
            }
        };
        let id = self.next_entity_id();
        self.blades.push(Blade {
            id,
            kind,
            owner: side,
            p1,
            p2,
            dir,
            created_at: now,
            duration_ms: kind.duration_ms(),
            active: true,
            finisher,
        });
        let event = match kind {
            AttackKind::Thrust => EventKind::Thrust,
            AttackKind::Slash => EventKind::Slash,
        };
        self.emit(event, pos, side);
        log::trace!(
            "{:?} {:?} blade {} (focus={}, finisher={})",
            side,
            kind,
            id,
            focus_active,
            finisher
        );
    }

    /// Burst of speed with brief invulnerability
    ///
    /// A near-zero `move_vec` dashes along the combatant's facing.
    pub fn perform_dash(&mut self, side: Side, move_vec: Vec2) {
        if !self.round_active() || !move_vec.is_finite() {
            return;
        }
        let now = self.clock_ms;
        let fighter = self.combatants.get_mut(side);
        if fighter.resources.dash_cooldown > 0.0 || !fighter.resources.try_spend(DASH_COST) {
            return;
        }

        fighter.resources.dash_cooldown = fighter.style.dash_cooldown();
        fighter.invulnerable_until = now + DASH_INVULN_MS;

        let dir = if move_vec.x.abs() < 0.1 && move_vec.y.abs() < 0.1 {
            fighter.facing
        } else {
            move_vec.normalize_or_zero()
        };
        impulse(fighter, dir, DASH_FORCE);

        let pos = fighter.pos;
        self.emit(EventKind::Dash, pos, side);
    }

    /// Raise a blocking wall between the caster and `aim`
    pub fn perform_wall(&mut self, side: Side, aim: Vec2) {
        if !self.round_active() || !aim.is_finite() {
            return;
        }
        let now = self.clock_ms;
        let fighter = self.combatants.get_mut(side);
        if fighter.resources.wall_cooldown > 0.0 || !fighter.resources.try_spend(WALL_COST) {
            return;
        }

        fighter.resources.wall_cooldown = fighter.style.wall_cooldown();

        let dir = direction_or(fighter.pos, aim, fighter.facing);
        fighter.facing = dir;
        let center = fighter.pos + dir * WALL_OFFSET;
        let angle = dir.y.atan2(dir.x) + std::f32::consts::FRAC_PI_2;

        let id = self.next_entity_id();
        self.walls.push(Wall {
            id,
            center,
            angle,
            owner: side,
            created_at: now,
            duration_ms: WALL_DURATION_MS,
        });
        self.emit(EventKind::WallPlace, center, side);
    }

    /// Enter the zone: slowed time for the player, pinned stamina
    pub fn activate_focus(&mut self) {
        if !self.round_active() || self.focus.active || !self.focus.is_full() {
            return;
        }
        let player = &self.combatants.player;
        if !player.style.can_focus() {
            return;
        }
        let pos = player.pos;

        self.focus.active = true;
        self.focus.gauge = 0.0;
        self.focus.remaining_ms = FOCUS_DURATION_MS;
        self.emit(EventKind::FocusStart, pos, Side::Player);
        log::info!("Focus engaged at tick {}", self.time_ticks);
    }
}
