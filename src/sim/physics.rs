//! Combatant movement and integration
//!
//! Velocities are in arena units per nominal tick; `dt` is the time
//! dilation for the tick (1.0 at normal speed).

use glam::Vec2;

use super::state::Combatant;
use crate::consts::*;

/// Add a movement intent to a combatant's velocity
///
/// `intent` is normalized so diagonals are not faster; a zero intent does
/// nothing.
pub fn apply_intent(combatant: &mut Combatant, intent: Vec2, speed: f32, dt: f32) {
    if !intent.is_finite() || intent == Vec2::ZERO {
        return;
    }
    combatant.vel += intent.normalize_or_zero() * speed * dt;
}

/// Integrate position, apply drag and bounce off the arena edges
pub fn integrate(combatant: &mut Combatant, dt: f32) {
    combatant.pos += combatant.vel * dt;
    // Continuous drag so friction doesn't depend on dt
    combatant.vel *= FRICTION.powf(dt);

    combatant.record_trail();
    clamp_to_arena(combatant);
}

/// Keep a combatant inside the arena with a damped bounce
pub fn clamp_to_arena(combatant: &mut Combatant) {
    let min = Vec2::splat(COMBATANT_RADIUS);
    let max = Vec2::new(ARENA_WIDTH - COMBATANT_RADIUS, ARENA_HEIGHT - COMBATANT_RADIUS);

    if combatant.pos.x < min.x {
        combatant.pos.x = min.x;
        combatant.vel.x *= -ARENA_BOUNCE;
    }
    if combatant.pos.x > max.x {
        combatant.pos.x = max.x;
        combatant.vel.x *= -ARENA_BOUNCE;
    }
    if combatant.pos.y < min.y {
        combatant.pos.y = min.y;
        combatant.vel.y *= -ARENA_BOUNCE;
    }
    if combatant.pos.y > max.y {
        combatant.pos.y = max.y;
        combatant.vel.y *= -ARENA_BOUNCE;
    }
}

/// Instantaneous velocity change (lunges, recoil, knockback)
#[inline]
pub fn impulse(combatant: &mut Combatant, dir: Vec2, force: f32) {
    combatant.vel += dir * force;
}
