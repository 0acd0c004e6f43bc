//! Fixed timestep simulation tick
//!
//! One call advances the duel by 16 ms of real time. The order of the
//! phases below is part of the game's behavior: timers, remote input,
//! movement, integration, blade/wall aging, collisions, the round timer and
//! finally the AI, which sees the post-resolution world.

use glam::Vec2;

use super::ai::AiBrain;
use super::collision::resolve_collisions;
use super::physics::{apply_intent, integrate};
use super::state::{AttackKind, Authority, Difficulty, DuelState, MatchPhase, Side};
use crate::consts::*;

/// Seed salt so the autopilot never mirrors the counterpart's rolls
const AUTOPILOT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Player commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Raw movement direction (normalized internally)
    pub movement: Vec2,
    /// World-space aim point for attacks and walls
    pub aim: Vec2,
    pub sprint: bool,
    pub attack: Option<AttackKind>,
    pub dash: bool,
    pub wall: bool,
    pub focus: bool,
    /// Hand the player side to an AI brain (demo / training opponent)
    pub autopilot: bool,
}

/// Source of counterpart actions under remote authority
pub trait RemoteFeed {
    /// Apply every queued message to `state`, oldest first
    fn apply_pending(&mut self, state: &mut DuelState);
}

/// Advance the duel by one tick without a remote peer
pub fn tick(state: &mut DuelState, input: &TickInput) {
    advance(state, input, None);
}

/// Advance the duel by one tick, draining `feed` for the counterpart
pub fn tick_with_remote(state: &mut DuelState, input: &TickInput, feed: &mut dyn RemoteFeed) {
    advance(state, input, Some(feed));
}

fn advance(state: &mut DuelState, input: &TickInput, feed: Option<&mut dyn RemoteFeed>) {
    match state.phase {
        MatchPhase::Idle | MatchPhase::MatchEnded { .. } => return,
        _ => {}
    }

    let dt = state.time_scale();
    state.clock_ms += TICK_MS as f64;
    state.time_ticks += 1;
    decay_feedback(state);

    // 1. Resources and timers
    let sprinting = update_timers(state, input, dt);

    // 2. Remote inbox
    if let Some(feed) = feed {
        feed.apply_pending(state);
    }

    // 3. Movement intents and player actions
    if state.round_active() {
        apply_player_input(state, input, sprinting, dt);
        apply_counterpart_movement(state, dt);
    }

    // 4. Integration
    integrate(&mut state.combatants.player, dt);
    if !state.authority.is_remote() {
        integrate(&mut state.combatants.counterpart, dt);
    }

    // 5. Blade and wall lifecycle
    age_geometry(state);

    // 6. Collisions
    if state.round_active() {
        resolve_collisions(state);
    }

    // 7. Round-ending freeze
    state.update_round_timer();

    // 8. AI decisions for the next tick
    run_brains(state, input.autopilot);
}

fn decay_feedback(state: &mut DuelState) {
    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
    state.flash = (state.flash - 0.05).max(0.0);
    state.slow_mo = (state.slow_mo + SLOW_MO_RECOVERY).min(1.0);
}

/// Cooldowns, stamina, focus and brain timers. Returns whether the player
/// is sprinting this tick.
fn update_timers(state: &mut DuelState, input: &TickInput, dt: f32) -> bool {
    let elapsed = TICK_MS * dt;
    let focus_active = state.focus.active;
    let inferno = state.difficulty == Difficulty::Inferno;

    let player = &mut state.combatants.player;
    player.resources.tick_cooldowns(elapsed);
    let sprinting = !input.autopilot
        && input.sprint
        && input.movement != Vec2::ZERO
        && player.resources.stamina > 0.0;

    if focus_active {
        player.resources.attack_cooldown =
            (player.resources.attack_cooldown - FOCUS_COOLDOWN_DRAIN).max(0.0);
        player.resources.stamina = STAMINA_MAX;
    } else if sprinting {
        player.resources.gain_stamina(-SPRINT_STAMINA_DRAIN * dt);
    } else {
        let regen = STAMINA_REGEN * dt * player.style.regen_multiplier();
        player.resources.gain_stamina(regen);
    }
    let player_style = player.style;

    let counterpart = &mut state.combatants.counterpart;
    counterpart.resources.tick_cooldowns(elapsed);
    let boost = if inferno { 1.5 } else { 1.0 };
    let regen = STAMINA_REGEN * dt * counterpart.style.regen_multiplier() * boost;
    counterpart.resources.gain_stamina(regen);

    if focus_active {
        state.focus.remaining_ms -= TICK_MS;
        if state.focus.remaining_ms <= 0.0 {
            state.focus.remaining_ms = 0.0;
            state.focus.active = false;
            log::debug!("Focus expired at tick {}", state.time_ticks);
        }
    } else if state.round_active() {
        state.focus.add(FOCUS_PASSIVE_GAIN, player_style);
    }

    for brain in [state.counterpart_ai.as_mut(), state.autopilot.as_mut()]
        .into_iter()
        .flatten()
    {
        brain.tick_timers(elapsed);
    }

    sprinting
}

fn apply_player_input(state: &mut DuelState, input: &TickInput, sprinting: bool, dt: f32) {
    if input.autopilot {
        if let Some(brain) = state.autopilot.as_ref() {
            let (intent, speed) = (brain.pending_move(), brain.move_speed());
            apply_intent(&mut state.combatants.player, intent, speed, dt);
        }
        return;
    }

    if input.focus {
        state.activate_focus();
    }
    if let Some(kind) = input.attack {
        state.perform_attack(Side::Player, kind, input.aim);
    }
    if input.dash {
        state.perform_dash(Side::Player, input.movement);
    }
    if input.wall {
        state.perform_wall(Side::Player, input.aim);
    }

    let speed = if sprinting {
        MOVE_SPEED * SPRINT_MULTIPLIER
    } else {
        MOVE_SPEED
    };
    apply_intent(&mut state.combatants.player, input.movement, speed, dt);
}

fn apply_counterpart_movement(state: &mut DuelState, dt: f32) {
    if let Some(brain) = state.counterpart_ai.as_ref() {
        let (intent, speed) = (brain.pending_move(), brain.move_speed());
        apply_intent(&mut state.combatants.counterpart, intent, speed, dt);
    }
}

/// Re-anchor thrusts and drop expired blades and walls
fn age_geometry(state: &mut DuelState) {
    let now = state.clock_ms;
    let focus_active = state.focus.active;

    for blade in &mut state.blades {
        let owner_pos = state.combatants.get(blade.owner).pos;
        blade.reanchor(owner_pos);
    }
    state.blades.retain(|b| !b.is_expired(now, focus_active));
    state.walls.retain(|w| !w.is_expired(now));
}

fn run_brains(state: &mut DuelState, autopilot: bool) {
    if state.authority == Authority::LocalAi {
        if let Some(mut brain) = state.counterpart_ai.take() {
            brain.think(state, Side::Counterpart);
            state.counterpart_ai = Some(brain);
        }
    }

    if autopilot {
        let mut brain = state
            .autopilot
            .take()
            .unwrap_or_else(|| AiBrain::new(state.difficulty, state.seed ^ AUTOPILOT_SEED_SALT));
        brain.think(state, Side::Player);
        state.autopilot = Some(brain);
    }
}
