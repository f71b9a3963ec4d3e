//! Demo autopilot
//!
//! Flies toward the nearest pickup, backs off when an enemy gets close,
//! and fires whenever a live enemy is lined up ahead.

use glam::Vec2;

use super::state::GameState;
use super::tick::TickInput;
use crate::{dir_to_heading, heading_to_dir, normalize_angle};

/// Enemies farther than this aren't worth a shot
const FIRING_RANGE: f32 = 12.0;
/// Half-angle of the firing cone (radians)
const AIM_TOLERANCE: f32 = 0.15;
/// Heading error ignored when steering (radians)
const STEER_DEADBAND: f32 = 0.02;
/// Enemies closer than this make the ship back off
const DANGER_RADIUS: f32 = 2.5;
const CRUISE_ACCEL: f32 = 1.5;

fn nearest(from: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    points.min_by(|a, b| {
        a.distance_squared(from)
            .partial_cmp(&b.distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Build this frame's input from the current state
pub fn drive(state: &GameState) -> TickInput {
    let player = state.player_entity();
    let forward = heading_to_dir(player.heading);
    let mut input = TickInput::default();

    input.fire = state.live_enemies().any(|e| {
        let to_enemy = e.pos - player.pos;
        to_enemy.length() < FIRING_RANGE && forward.angle_to(to_enemy).abs() < AIM_TOLERANCE
    });

    let threat = nearest(player.pos, state.live_enemies().map(|e| e.pos))
        .is_some_and(|p| p.distance(player.pos) < DANGER_RADIUS);

    // Pickups first; with none left, line up on the nearest enemy
    let goal = nearest(player.pos, state.collectibles().map(|c| c.pos))
        .or_else(|| nearest(player.pos, state.live_enemies().map(|e| e.pos)));

    if let Some(goal) = goal {
        let to_goal = goal - player.pos;
        let error = normalize_angle(dir_to_heading(to_goal) - player.heading);
        if error > STEER_DEADBAND {
            input.turn_left = true;
        } else if error < -STEER_DEADBAND {
            input.turn_right = true;
        }

        if threat {
            input.backward = player.accel > 0.0;
        } else if error.abs() < 0.5 && player.accel < CRUISE_ACCEL {
            input.forward = true;
        }
    }

    input
}
