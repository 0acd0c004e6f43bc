//! Collision detection and resolution between blades, walls and bodies
//!
//! Blades are processed in insertion order. A blade is consumed by the first
//! thing it touches, so a single blade can never both parry and hit.

use glam::Vec2;

use super::events::EventKind;
use super::geometry::{direction_or, distance_to_segment, segment_intersection};
use super::physics::{clamp_to_arena, impulse};
use super::state::{AttackKind, DuelState, Side};
use crate::consts::*;

/// Outcome of two opposing blades meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BladeContact {
    /// Slash met thrust; the slash owner wins the exchange
    Parry { parrier: Side },
    /// Same kind met; both sides are stunned and pushed apart
    Clash,
}

impl BladeContact {
    pub fn classify(a_kind: AttackKind, a_owner: Side, b_kind: AttackKind, b_owner: Side) -> Self {
        match (a_kind, b_kind) {
            (AttackKind::Slash, AttackKind::Thrust) => BladeContact::Parry { parrier: a_owner },
            (AttackKind::Thrust, AttackKind::Slash) => BladeContact::Parry { parrier: b_owner },
            _ => BladeContact::Clash,
        }
    }
}

/// Run every collision pass for the current tick
pub fn resolve_collisions(state: &mut DuelState) {
    push_bodies_from_walls(state);

    for i in 0..state.blades.len() {
        if !state.blades[i].active {
            continue;
        }
        if block_with_walls(state, i) {
            continue;
        }
        if contest_blades(state, i) {
            continue;
        }
        strike_body(state, i);
    }
}

/// Shove combatants out of any wall they are pressing against
fn push_bodies_from_walls(state: &mut DuelState) {
    for wall in &state.walls {
        let (a, b) = wall.endpoints();
        for side in [Side::Player, Side::Counterpart] {
            let body = state.combatants.get_mut(side);
            if distance_to_segment(body.pos, a, b) < COMBATANT_RADIUS + WALL_BODY_MARGIN {
                let push = (body.pos - wall.center).normalize_or_zero() * WALL_PUSH;
                body.pos += push;
                body.vel += push;
                clamp_to_arena(body);
            }
        }
    }
}

/// Returns true if an opposing wall stopped blade `i`
fn block_with_walls(state: &mut DuelState, i: usize) -> bool {
    let blade = &state.blades[i];
    let hit = state
        .walls
        .iter()
        .filter(|wall| wall.owner != blade.owner)
        .find_map(|wall| {
            let (a, b) = wall.endpoints();
            segment_intersection(blade.p1, blade.p2, a, b)
        });

    let Some(point) = hit else {
        return false;
    };
    let owner = blade.owner;
    state.blades[i].active = false;
    state.emit(EventKind::Clash, point, owner);
    true
}

/// Returns true if blade `i` met an opposing blade
fn contest_blades(state: &mut DuelState, i: usize) -> bool {
    let blade = &state.blades[i];
    let found = state.blades.iter().enumerate().find_map(|(j, other)| {
        if j == i || !other.active || other.owner == blade.owner {
            return None;
        }
        segment_intersection(blade.p1, blade.p2, other.p1, other.p2).map(|point| (j, point))
    });

    let Some((j, point)) = found else {
        return false;
    };

    state.blades[i].active = false;
    state.blades[j].active = false;

    let (a, b) = (&state.blades[i], &state.blades[j]);
    let contact = BladeContact::classify(a.kind, a.owner, b.kind, b.owner);
    let owner = a.owner;
    let recoil_dir = direction_or(a.p1, a.p2, a.dir);

    match contact {
        BladeContact::Parry { parrier } => resolve_parry(state, parrier, point),
        BladeContact::Clash => resolve_clash(state, owner, point),
    }

    // Every blade contact knocks the scanning owner back and the other forward
    let (this, other) = state.combatants.split_mut(owner);
    impulse(this, -recoil_dir, RECOIL_FORCE);
    impulse(other, recoil_dir, RECOIL_FORCE);

    state.screen_shake = CLASH_SHAKE;
    state.slow_mo = CLASH_SLOW_MO;
    true
}

fn resolve_parry(state: &mut DuelState, parrier: Side, point: Vec2) {
    let attacker = parrier.opponent();
    log::debug!("{:?} parried {:?} at tick {}", parrier, attacker, state.time_ticks);

    match parrier {
        Side::Player => {
            let style = state.combatants.player.style;
            let (player, counterpart) = state.combatants.split_mut(Side::Player);
            player.resources.attack_cooldown = 0.0;
            player.resources.gain_stamina(PARRY_STAMINA_BONUS);
            counterpart.resources.attack_cooldown = PARRY_PUNISH_MS;
            state.focus.add(FOCUS_PARRY_GAIN, style);
            state.flash = PARRY_FLASH;
        }
        Side::Counterpart => {
            state.combatants.counterpart.resources.attack_cooldown = 0.0;
            if state.difficulty.is_forgiving() {
                state.combatants.player.resources.attack_cooldown = PARRY_PUNISH_LENIENT_MS;
                if let Some(brain) = state.counterpart_ai.as_mut() {
                    brain.lock_actions(PARRY_AI_LOCK_MS);
                }
            } else {
                state.combatants.player.resources.attack_cooldown = PARRY_PUNISH_MS;
            }
        }
    }

    state.emit(EventKind::ParrySuccess, point, parrier);
    state.emit(EventKind::ParryFailure, point, attacker);
}

fn resolve_clash(state: &mut DuelState, owner: Side, point: Vec2) {
    log::debug!("Neutral clash at tick {}", state.time_ticks);

    let (this, other) = state.combatants.split_mut(owner);
    this.resources.attack_cooldown = this.style.clash_stun();
    other.resources.attack_cooldown = other.style.clash_stun();

    state.emit(EventKind::Clash, point, owner);
}

/// Hit the opposing body if blade `i` reaches it
fn strike_body(state: &mut DuelState, i: usize) {
    let blade = &state.blades[i];
    let owner = blade.owner;
    let target = owner.opponent();
    let victim = state.combatants.get(target);

    if victim.is_invulnerable(state.clock_ms) {
        return;
    }
    if distance_to_segment(victim.pos, blade.p1, blade.p2) >= COMBATANT_RADIUS {
        return;
    }

    state.blades[i].active = false;
    let attacker_pos = state.combatants.get(owner).pos;
    state.register_hit(target, attacker_pos);
}
