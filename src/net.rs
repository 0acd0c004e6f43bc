//! Remote peer protocol
//!
//! Wire types for peer-to-peer duels. Every inbound message is parsed and
//! validated before it is queued, so malformed or out-of-range input never
//! reaches the simulation. The transport (sockets, signaling) lives outside
//! this crate and only moves JSON strings in and out of a [`PeerLink`].

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{AttackKind, DuelState, RemoteFeed, Side, TickInput};

/// Minimum interval between outgoing position snapshots
pub const MOVE_SYNC_INTERVAL_MS: f64 = 50.0;
/// Aim targets may sit this far outside the arena
pub const AIM_SLACK: f32 = 200.0;
/// Largest velocity component accepted in a snapshot
pub const MAX_WIRE_SPEED: f32 = 100.0;
/// Largest dash vector component accepted
pub const MAX_DASH_COMPONENT: f32 = 1.5;

/// A point as it appears on the wire: `{ "x": .., "y": .. }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for WirePoint {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<WirePoint> for Vec2 {
    fn from(p: WirePoint) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Messages exchanged between peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RemoteMessage {
    Attack {
        #[serde(rename = "attackType")]
        attack_type: AttackKind,
        target: WirePoint,
    },
    /// Authoritative transform of the sender's combatant
    Move {
        position: WirePoint,
        velocity: WirePoint,
    },
    Dash {
        #[serde(rename = "moveVec")]
        move_vec: WirePoint,
    },
    Wall {
        target: WirePoint,
    },
}

/// Rejected remote input
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Non-finite value in {field}")]
    NonFinite { field: &'static str },

    #[error("Value out of range in {field}: ({x}, {y})")]
    OutOfRange { field: &'static str, x: f32, y: f32 },
}

fn check_point(
    field: &'static str,
    p: WirePoint,
    min: Vec2,
    max: Vec2,
) -> Result<(), RemoteError> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return Err(RemoteError::NonFinite { field });
    }
    if p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y {
        return Err(RemoteError::OutOfRange {
            field,
            x: p.x,
            y: p.y,
        });
    }
    Ok(())
}

impl RemoteMessage {
    /// Parse and validate a JSON message
    pub fn from_json(text: &str) -> Result<Self, RemoteError> {
        let msg: RemoteMessage = serde_json::from_str(text)?;
        msg.validate()?;
        Ok(msg)
    }

    pub fn to_json(&self) -> Result<String, RemoteError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reject non-finite and out-of-range values
    pub fn validate(&self) -> Result<(), RemoteError> {
        let aim_min = Vec2::splat(-AIM_SLACK);
        let aim_max = Vec2::new(ARENA_WIDTH + AIM_SLACK, ARENA_HEIGHT + AIM_SLACK);
        match *self {
            RemoteMessage::Attack { target, .. } => check_point("target", target, aim_min, aim_max),
            RemoteMessage::Wall { target } => check_point("target", target, aim_min, aim_max),
            RemoteMessage::Move { position, velocity } => {
                // Same bounds the arena clamp keeps a body inside
                check_point(
                    "position",
                    position,
                    Vec2::splat(COMBATANT_RADIUS),
                    Vec2::new(
                        ARENA_WIDTH - COMBATANT_RADIUS,
                        ARENA_HEIGHT - COMBATANT_RADIUS,
                    ),
                )?;
                check_point(
                    "velocity",
                    velocity,
                    Vec2::splat(-MAX_WIRE_SPEED),
                    Vec2::splat(MAX_WIRE_SPEED),
                )
            }
            RemoteMessage::Dash { move_vec } => check_point(
                "moveVec",
                move_vec,
                Vec2::splat(-MAX_DASH_COMPONENT),
                Vec2::splat(MAX_DASH_COMPONENT),
            ),
        }
    }

    /// Apply to the counterpart side of `state`
    fn apply(self, state: &mut DuelState) {
        match self {
            RemoteMessage::Attack {
                attack_type,
                target,
            } => state.perform_attack(Side::Counterpart, attack_type, target.into()),
            RemoteMessage::Move { position, velocity } => {
                let counterpart = state.combatant_mut(Side::Counterpart);
                counterpart.pos = position.into();
                counterpart.vel = velocity.into();
                counterpart.record_trail();
            }
            RemoteMessage::Dash { move_vec } => {
                state.perform_dash(Side::Counterpart, move_vec.into())
            }
            RemoteMessage::Wall { target } => state.perform_wall(Side::Counterpart, target.into()),
        }
    }
}

/// Inbox and outbox for one remote peer
#[derive(Debug, Default)]
pub struct PeerLink {
    inbox: VecDeque<RemoteMessage>,
    outbox: Vec<RemoteMessage>,
    last_sync_ms: Option<f64>,
}

impl PeerLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, validate and queue an inbound JSON message
    pub fn receive_json(&mut self, text: &str) -> Result<(), RemoteError> {
        match RemoteMessage::from_json(text) {
            Ok(msg) => {
                self.inbox.push_back(msg);
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected remote message: {}", e);
                Err(e)
            }
        }
    }

    /// Validate and queue an already-decoded message
    pub fn receive(&mut self, msg: RemoteMessage) -> Result<(), RemoteError> {
        msg.validate()?;
        self.inbox.push_back(msg);
        Ok(())
    }

    /// Messages waiting for the next tick
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Mirror the local player's actions for the peer
    ///
    /// Call once per tick after `tick_with_remote`. Position snapshots are
    /// throttled to one per [`MOVE_SYNC_INTERVAL_MS`].
    pub fn record_local(&mut self, input: &TickInput, state: &DuelState) {
        if !state.authority.is_remote() || !state.round_active() {
            return;
        }

        if let Some(attack_type) = input.attack {
            self.outbox.push(RemoteMessage::Attack {
                attack_type,
                target: input.aim.into(),
            });
        }
        if input.dash {
            self.outbox.push(RemoteMessage::Dash {
                move_vec: input.movement.into(),
            });
        }
        if input.wall {
            self.outbox.push(RemoteMessage::Wall {
                target: input.aim.into(),
            });
        }

        let due = self
            .last_sync_ms
            .is_none_or(|last| state.clock_ms - last >= MOVE_SYNC_INTERVAL_MS);
        if due {
            let player = state.combatant(Side::Player);
            self.outbox.push(RemoteMessage::Move {
                position: player.pos.into(),
                velocity: player.vel.into(),
            });
            self.last_sync_ms = Some(state.clock_ms);
        }
    }

    /// Take every outgoing message, oldest first
    pub fn drain_outbox(&mut self) -> Vec<RemoteMessage> {
        std::mem::take(&mut self.outbox)
    }
}

impl RemoteFeed for PeerLink {
    fn apply_pending(&mut self, state: &mut DuelState) {
        if self.inbox.is_empty() {
            return;
        }
        if !state.authority.is_remote() {
            log::warn!(
                "Ignoring {} remote message(s): counterpart is AI-controlled",
                self.inbox.len()
            );
            self.inbox.clear();
            return;
        }
        while let Some(msg) = self.inbox.pop_front() {
            msg.apply(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{Authority, EventKind, Role, tick_with_remote};

    fn remote_duel() -> DuelState {
        let settings = Settings {
            authority: Authority::Remote { role: Role::Guest },
            ..Settings::default()
        };
        let mut state = DuelState::new(&settings);
        state.start_match();
        state.events.clear();
        state
    }

    #[test]
    fn test_parse_wire_format() {
        let msg = RemoteMessage::from_json(
            r#"{"type":"attack","payload":{"attackType":"thrust","target":{"x":300,"y":400}}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            RemoteMessage::Attack {
                attack_type: AttackKind::Thrust,
                target: WirePoint { x: 300.0, y: 400.0 },
            }
        );

        let dash =
            RemoteMessage::from_json(r#"{"type":"dash","payload":{"moveVec":{"x":0,"y":-1}}}"#)
                .unwrap();
        assert!(matches!(dash, RemoteMessage::Dash { .. }));
    }

    #[test]
    fn test_encode_uses_camel_case_fields() {
        let json = RemoteMessage::Dash {
            move_vec: WirePoint { x: 1.0, y: 0.0 },
        }
        .to_json()
        .unwrap();
        assert!(json.contains("\"type\":\"dash\""));
        assert!(json.contains("\"moveVec\""));
    }

    #[test]
    fn test_rejects_malformed_and_out_of_range() {
        assert!(matches!(
            RemoteMessage::from_json("not json"),
            Err(RemoteError::Malformed(_))
        ));
        assert!(matches!(
            RemoteMessage::from_json(r#"{"type":"teleport","payload":{}}"#),
            Err(RemoteError::Malformed(_))
        ));
        assert!(matches!(
            RemoteMessage::from_json(
                r#"{"type":"move","payload":{"position":{"x":5000,"y":10},"velocity":{"x":0,"y":0}}}"#
            ),
            Err(RemoteError::OutOfRange {
                field: "position",
                ..
            })
        ));

        let nan = RemoteMessage::Wall {
            target: WirePoint {
                x: f32::NAN,
                y: 0.0,
            },
        };
        assert!(matches!(
            nan.validate(),
            Err(RemoteError::NonFinite { field: "target" })
        ));
    }

    #[test]
    fn test_move_snapshot_must_keep_body_inside_arena() {
        let at = |x: f32, y: f32| RemoteMessage::Move {
            position: WirePoint { x, y },
            velocity: WirePoint { x: 0.0, y: 0.0 },
        };
        assert!(at(COMBATANT_RADIUS, COMBATANT_RADIUS).validate().is_ok());
        assert!(at(ARENA_WIDTH - COMBATANT_RADIUS, 400.0).validate().is_ok());
        for msg in [
            at(0.0, 400.0),
            at(600.0, ARENA_HEIGHT - 5.0),
            at(ARENA_WIDTH, 400.0),
        ] {
            assert!(matches!(
                msg.validate(),
                Err(RemoteError::OutOfRange {
                    field: "position",
                    ..
                })
            ));
        }

        let mut link = PeerLink::new();
        assert!(link.receive(at(0.0, 400.0)).is_err());
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn test_rejected_message_never_queued() {
        let mut link = PeerLink::new();
        assert!(link.receive_json("{}").is_err());
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn test_inbox_applies_in_arrival_order() {
        let mut state = remote_duel();
        let mut link = PeerLink::new();
        let player_pos = state.combatants.player.pos;

        link.receive(RemoteMessage::Move {
            position: WirePoint { x: 500.0, y: 420.0 },
            velocity: WirePoint { x: 1.0, y: 0.0 },
        })
        .unwrap();
        link.receive(RemoteMessage::Attack {
            attack_type: AttackKind::Slash,
            target: player_pos.into(),
        })
        .unwrap();

        tick_with_remote(&mut state, &TickInput::default(), &mut link);

        assert_eq!(link.pending(), 0);
        // The slash was spawned from the snapshot position, not the spawn
        let slash = state
            .blades
            .iter()
            .find(|b| b.owner == Side::Counterpart)
            .expect("remote slash");
        let center = (slash.p1 + slash.p2) * 0.5;
        assert!(center.distance(Vec2::new(500.0, 420.0)) < SLASH_OFFSET + 1.0);
        assert!(state.events.contains(EventKind::Slash));
    }

    #[test]
    fn test_messages_ignored_under_local_ai() {
        let mut state = DuelState::new(&Settings::default());
        state.start_match();
        let mut link = PeerLink::new();
        link.receive(RemoteMessage::Wall {
            target: WirePoint { x: 600.0, y: 400.0 },
        })
        .unwrap();
        link.apply_pending(&mut state);
        assert!(state.walls.is_empty());
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn test_outbox_mirrors_actions_and_throttles_moves() {
        let mut state = remote_duel();
        let mut link = PeerLink::new();
        let input = TickInput {
            attack: Some(AttackKind::Thrust),
            aim: Vec2::new(100.0, 400.0),
            ..Default::default()
        };
        link.record_local(&input, &state);
        let out = link.drain_outbox();
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0], RemoteMessage::Attack { .. }));
        assert!(matches!(out[1], RemoteMessage::Move { .. }));

        // Within 50 ms: no new snapshot
        state.clock_ms += 32.0;
        link.record_local(&TickInput::default(), &state);
        assert!(link.drain_outbox().is_empty());

        state.clock_ms += 32.0;
        link.record_local(&TickInput::default(), &state);
        assert_eq!(link.drain_outbox().len(), 1);
    }

    #[test]
    fn test_outbox_silent_for_local_ai() {
        let mut state = DuelState::new(&Settings::default());
        state.start_match();
        let mut link = PeerLink::new();
        link.record_local(&TickInput::default(), &state);
        assert!(link.drain_outbox().is_empty());
    }
}
