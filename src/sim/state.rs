//! Duel state and core simulation types
//!
//! Everything the tick mutates lives here. Presentation reads these fields
//! directly; only the simulation writes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai::AiBrain;
use super::events::{CombatEvent, EventKind, EventQueue};
use crate::consts::*;
use crate::settings::Settings;

/// Which combatant an action, blade or event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The locally controlled combatant
    Player,
    /// The AI or remote opponent
    Counterpart,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Counterpart,
            Side::Counterpart => Side::Player,
        }
    }
}

/// One value per side
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub player: T,
    pub counterpart: T,
}

impl<T> PerSide<T> {
    pub fn new(player: T, counterpart: T) -> Self {
        Self {
            player,
            counterpart,
        }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Player => &self.player,
            Side::Counterpart => &self.counterpart,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Player => &mut self.player,
            Side::Counterpart => &mut self.counterpart,
        }
    }

    /// Mutable access to `side` and its opponent at once
    pub fn split_mut(&mut self, side: Side) -> (&mut T, &mut T) {
        match side {
            Side::Player => (&mut self.player, &mut self.counterpart),
            Side::Counterpart => (&mut self.counterpart, &mut self.player),
        }
    }
}

/// Fighting style, fixed for a whole round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// One hit loses the round; slower recovery; can enter focus
    #[default]
    Heavy,
    /// Two hits lose the round; faster recovery; no focus
    Light,
}

impl Style {
    pub fn max_hits(self) -> u8 {
        match self {
            Style::Heavy => 1,
            Style::Light => 2,
        }
    }

    pub fn thrust_cooldown(self) -> f32 {
        match self {
            Style::Heavy => 500.0,
            Style::Light => 200.0,
        }
    }

    pub fn slash_cooldown(self) -> f32 {
        match self {
            Style::Heavy => 150.0,
            Style::Light => 100.0,
        }
    }

    /// Recovery after the second swing of a slash combo
    pub fn finisher_cooldown(self) -> f32 {
        match self {
            Style::Heavy => 500.0,
            Style::Light => 200.0,
        }
    }

    pub fn dash_cooldown(self) -> f32 {
        match self {
            Style::Heavy => 800.0,
            Style::Light => 300.0,
        }
    }

    pub fn wall_cooldown(self) -> f32 {
        match self {
            Style::Heavy => 5000.0,
            Style::Light => 2500.0,
        }
    }

    /// Cooldown applied by a neutral clash
    pub fn clash_stun(self) -> f32 {
        match self {
            Style::Heavy => 300.0,
            Style::Light => 150.0,
        }
    }

    pub fn regen_multiplier(self) -> f32 {
        match self {
            Style::Heavy => 1.0,
            Style::Light => 1.2,
        }
    }

    pub fn can_focus(self) -> bool {
        self == Style::Heavy
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Heavy => "heavy",
            Style::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "heavy" | "foil" => Some(Style::Heavy),
            "light" | "sabre" | "saber" => Some(Style::Light),
            _ => None,
        }
    }
}

/// AI difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Novice,
    #[default]
    Duelist,
    Grandmaster,
    Inferno,
}

impl Difficulty {
    /// Lower tiers soften parry punishment so the victim can disengage
    pub fn is_forgiving(self) -> bool {
        matches!(self, Difficulty::Novice | Difficulty::Duelist)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Novice => "novice",
            Difficulty::Duelist => "duelist",
            Difficulty::Grandmaster => "grandmaster",
            Difficulty::Inferno => "inferno",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "novice" => Some(Difficulty::Novice),
            "duelist" => Some(Difficulty::Duelist),
            "grandmaster" | "gm" => Some(Difficulty::Grandmaster),
            "inferno" => Some(Difficulty::Inferno),
            _ => None,
        }
    }
}

/// Seat in a remote match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Spawns on the left
    Host,
    /// Spawns on the right
    Guest,
}

/// Who drives the counterpart, chosen once per match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Authority {
    /// Counterpart is driven by the built-in AI
    #[default]
    LocalAi,
    /// Counterpart is driven by a remote peer's messages
    Remote { role: Role },
}

impl Authority {
    pub fn is_remote(&self) -> bool {
        matches!(self, Authority::Remote { .. })
    }

    /// Starting positions for this seat assignment
    pub fn spawn_points(&self) -> PerSide<Vec2> {
        let left = Vec2::new(LEFT_SPAWN.0, LEFT_SPAWN.1);
        let right = Vec2::new(RIGHT_SPAWN.0, RIGHT_SPAWN.1);
        match self {
            Authority::Remote { role: Role::Guest } => PerSide::new(right, left),
            _ => PerSide::new(left, right),
        }
    }
}

/// Per-combatant resource pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub stamina: f32,
    /// Milliseconds until the next attack is allowed
    pub attack_cooldown: f32,
    pub dash_cooldown: f32,
    pub wall_cooldown: f32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            stamina: STAMINA_MAX,
            attack_cooldown: 0.0,
            dash_cooldown: 0.0,
            wall_cooldown: 0.0,
        }
    }
}

impl Resources {
    /// Deduct `cost` if affordable
    pub fn try_spend(&mut self, cost: f32) -> bool {
        if self.stamina < cost {
            return false;
        }
        self.stamina = (self.stamina - cost).max(0.0);
        true
    }

    pub fn gain_stamina(&mut self, amount: f32) {
        self.stamina = (self.stamina + amount).clamp(0.0, STAMINA_MAX);
    }

    /// Count every cooldown down by `elapsed_ms`, clamping at zero
    pub fn tick_cooldowns(&mut self, elapsed_ms: f32) {
        self.attack_cooldown = (self.attack_cooldown - elapsed_ms).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - elapsed_ms).max(0.0);
        self.wall_cooldown = (self.wall_cooldown - elapsed_ms).max(0.0);
    }
}

/// Slash combo tracker
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlashCombo {
    pub count: u8,
    pub last_ms: f64,
}

/// One of the two duelists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Unit vector of the last aim, used when an action has no direction
    pub facing: Vec2,
    pub resources: Resources,
    /// Body hits are ignored while the clock is below this timestamp
    pub invulnerable_until: f64,
    /// Hits taken this round
    pub round_hits: u8,
    pub style: Style,
    pub combo: SlashCombo,
    /// Recent positions while moving fast (newest last)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Combatant {
    pub fn new(pos: Vec2, style: Style, facing: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            facing,
            resources: Resources::default(),
            invulnerable_until: 0.0,
            round_hits: 0,
            style,
            combo: SlashCombo::default(),
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        now_ms < self.invulnerable_until
    }

    /// Record or shed trail points depending on current speed
    pub fn record_trail(&mut self) {
        if self.vel.length_squared() > TRAIL_SPEED_SQ {
            self.trail.push(self.pos);
            if self.trail.len() > TRAIL_LENGTH {
                self.trail.remove(0);
            }
        } else if !self.trail.is_empty() {
            self.trail.remove(0);
        }
    }

    /// Restore the start-of-round condition at `pos`
    pub fn reset_for_round(&mut self, pos: Vec2, facing: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.facing = facing;
        self.resources = Resources::default();
        self.invulnerable_until = 0.0;
        self.round_hits = 0;
        self.combo = SlashCombo::default();
        self.trail.clear();
    }
}

/// Attack flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Thrust,
    Slash,
}

impl AttackKind {
    pub fn cost(self) -> f32 {
        match self {
            AttackKind::Thrust => THRUST_COST,
            AttackKind::Slash => SLASH_COST,
        }
    }

    pub fn duration_ms(self) -> f32 {
        match self {
            AttackKind::Thrust => THRUST_DURATION_MS,
            AttackKind::Slash => SLASH_DURATION_MS,
        }
    }
}

/// A live attack segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blade {
    pub id: u32,
    pub kind: AttackKind,
    pub owner: Side,
    pub p1: Vec2,
    pub p2: Vec2,
    /// Unit aim direction at spawn
    pub dir: Vec2,
    pub created_at: f64,
    /// Nominal duration before focus scaling
    pub duration_ms: f32,
    /// Cleared the moment the blade is consumed by any collision
    pub active: bool,
    /// Second swing of a slash combo
    pub finisher: bool,
}

impl Blade {
    /// Actual lifetime given the focus state
    pub fn lifetime_ms(&self, focus_active: bool) -> f64 {
        let scale = if focus_active { FOCUS_TIME_SCALE } else { 1.0 };
        (self.duration_ms / scale) as f64
    }

    pub fn is_expired(&self, now_ms: f64, focus_active: bool) -> bool {
        now_ms - self.created_at >= self.lifetime_ms(focus_active)
    }

    /// Remaining life in 0..=1 for fade-out rendering
    pub fn life_fraction(&self, now_ms: f64, focus_active: bool) -> f32 {
        let age = now_ms - self.created_at;
        (1.0 - age / self.lifetime_ms(focus_active)).clamp(0.0, 1.0) as f32
    }

    /// Move a thrust so it stays attached to its owner
    pub fn reanchor(&mut self, owner_pos: Vec2) {
        if self.kind == AttackKind::Thrust {
            self.p1 = owner_pos;
            self.p2 = owner_pos + self.dir * THRUST_RANGE;
        }
    }
}

/// A temporary blocking segment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wall {
    pub id: u32,
    pub center: Vec2,
    /// Orientation of the segment (perpendicular to the caster's aim)
    pub angle: f32,
    pub owner: Side,
    pub created_at: f64,
    pub duration_ms: f64,
}

impl Wall {
    /// Segment endpoints used for collisions
    pub fn endpoints(&self) -> (Vec2, Vec2) {
        let along = Vec2::from_angle(self.angle) * WALL_HALF_LEN;
        (self.center - along, self.center + along)
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at >= self.duration_ms
    }

    pub fn life_fraction(&self, now_ms: f64) -> f32 {
        (1.0 - (now_ms - self.created_at) / self.duration_ms).clamp(0.0, 1.0) as f32
    }
}

/// Player-only slow-time gauge
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Focus {
    pub gauge: f32,
    pub active: bool,
    pub remaining_ms: f32,
}

impl Focus {
    pub fn add(&mut self, amount: f32, style: Style) {
        if !style.can_focus() {
            self.gauge = 0.0;
            return;
        }
        self.gauge = (self.gauge + amount).clamp(0.0, FOCUS_MAX);
    }

    pub fn is_full(&self) -> bool {
        self.gauge >= FOCUS_MAX
    }
}

/// Round / match phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Before the first round
    Idle,
    /// Hits count
    RoundActive,
    /// Frozen aftermath of a fatal hit, resets at `resume_at_ms`
    RoundEnding { resume_at_ms: f64 },
    MatchEnded { winner: Side },
}

/// Complete duel state
#[derive(Debug, Clone)]
pub struct DuelState {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub authority: Authority,
    /// Simulation clock in milliseconds (advances 16 ms per tick)
    pub clock_ms: f64,
    pub time_ticks: u64,
    pub phase: MatchPhase,
    /// Rounds completed this match
    pub round_index: u32,
    pub score: PerSide<u32>,
    pub combatants: PerSide<Combatant>,
    /// Live blades in insertion order
    pub blades: Vec<Blade>,
    pub walls: Vec<Wall>,
    pub focus: Focus,
    /// Global time dilation (1.0 = normal speed)
    pub slow_mo: f32,
    pub screen_shake: f32,
    pub flash: f32,
    pub events: EventQueue,
    /// Decision engine for the counterpart under local-AI authority
    pub counterpart_ai: Option<AiBrain>,
    /// Decision engine driving the player in autopilot mode
    pub autopilot: Option<AiBrain>,
    next_id: u32,
}

impl DuelState {
    /// Build an idle duel from settings
    pub fn new(settings: &Settings) -> Self {
        let spawns = settings.authority.spawn_points();
        let player_style = settings.effective_player_style();
        let counterpart_style = settings.counterpart_style.unwrap_or(player_style);
        let toward_counterpart = (spawns.counterpart - spawns.player).normalize_or_zero();

        let counterpart_ai = match settings.authority {
            Authority::LocalAi => Some(AiBrain::new(settings.difficulty, settings.seed)),
            Authority::Remote { .. } => None,
        };

        Self {
            seed: settings.seed,
            difficulty: settings.difficulty,
            authority: settings.authority,
            clock_ms: 0.0,
            time_ticks: 0,
            phase: MatchPhase::Idle,
            round_index: 0,
            score: PerSide::default(),
            combatants: PerSide::new(
                Combatant::new(spawns.player, player_style, toward_counterpart),
                Combatant::new(spawns.counterpart, counterpart_style, -toward_counterpart),
            ),
            blades: Vec::new(),
            walls: Vec::new(),
            focus: Focus::default(),
            slow_mo: 1.0,
            screen_shake: 0.0,
            flash: 0.0,
            events: EventQueue::default(),
            counterpart_ai,
            autopilot: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        self.combatants.get(side)
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        self.combatants.get_mut(side)
    }

    pub fn round_active(&self) -> bool {
        self.phase == MatchPhase::RoundActive
    }

    pub fn match_over(&self) -> bool {
        matches!(self.phase, MatchPhase::MatchEnded { .. })
    }

    /// Distance between the two combatants
    pub fn separation(&self) -> f32 {
        self.combatants.player.pos.distance(self.combatants.counterpart.pos)
    }

    /// Time dilation applied to movement and timers this tick
    pub fn time_scale(&self) -> f32 {
        if self.focus.active {
            FOCUS_TIME_SCALE
        } else {
            self.slow_mo
        }
    }

    pub(crate) fn emit(&mut self, kind: EventKind, pos: Vec2, side: Side) {
        self.events.push(kind, pos, side);
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    /// Put both combatants on their spawn points with fresh round resources
    pub(crate) fn place_for_round(&mut self) {
        let spawns = self.authority.spawn_points();
        let toward_counterpart = (spawns.counterpart - spawns.player).normalize_or_zero();
        self.combatants
            .player
            .reset_for_round(spawns.player, toward_counterpart);
        self.combatants
            .counterpart
            .reset_for_round(spawns.counterpart, -toward_counterpart);
        self.blades.clear();
        self.walls.clear();
        self.events.clear();
    }
}
