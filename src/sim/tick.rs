//! Per-frame update
//!
//! One synchronous pass per rendered frame: camera, clock, controls, timed
//! spawns, then every entity collection in a fixed order. Removals are
//! deferred to the end of each pass so iteration indices stay valid.

use glam::{Mat4, Vec2};

use super::autopilot;
use super::collision::{Ray, circles_overlap, entities_collide, ray_hits_circle};
use super::entity::{EffectKind, Entity, EntityId, EntityKind, blade_local};
use super::state::{GameEvent, GameState, PLAYER_INDEX};
use super::steering::{check_pursuit, steer};
use crate::consts::BLADE_SPIN_STEP;
use crate::renderer::{DrawCall, Renderer, Texture};
use crate::settings::SweptRay;
use crate::{heading_to_dir, normalize_angle};

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub fire: bool,
    pub quit: bool,
    /// Demo mode - the autopilot flies the ship
    pub autopilot: bool,
}

/// Advance the game by one frame and issue its draw calls
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, renderer: &mut dyn Renderer) {
    if state.player.game_over {
        return;
    }
    if state.world_objects.is_empty() {
        log::warn!("Frame {} skipped: no player in the scene", state.frame);
        return;
    }

    // Camera follows the ship, or holds where it died
    state.camera = if state.player.dead {
        state.player.death_pos
    } else {
        state.player_entity().pos
    };
    renderer.begin_frame(state.view_matrix());

    state.time += dt as f64;
    state.frame += 1;

    let mut input = input.clone();
    if input.autopilot {
        let quit = input.quit;
        input = autopilot::drive(state);
        input.quit |= quit;
    }
    if state.player.lives >= 0 {
        apply_controls(state, &input);
    }

    state.spawn_timed_enemy();

    let now = state.time;
    let player_pos = state.player_entity().pos;
    let mut consumed: Vec<EntityId> = Vec::new();

    let mut i = 0;
    while i < state.world_objects.len() {
        let parent_alive = match state.world_objects[i].kind {
            EntityKind::Blade { parent, .. } => state.world_object(parent).map(|p| !p.deceased),
            _ => None,
        };

        {
            let obj = &mut state.world_objects[i];
            obj.target = player_pos;
            if obj.cooldown_until.is_some_and(|t| t < now) {
                obj.cooldown_until = None;
            }
            obj.update(dt);
            if let EntityKind::Blade { ref mut spin, .. } = obj.kind {
                if parent_alive == Some(true) {
                    *spin = normalize_angle(*spin + BLADE_SPIN_STEP);
                }
            }
        }

        if i == PLAYER_INDEX {
            bullet_pass(state, dt);
            enemy_pass(state, dt, renderer);
            pickup_pass(state, &mut consumed);
            check_game_over(state);
            check_invulnerability(state);
        }

        let obj = &state.world_objects[i];
        if !consumed.contains(&obj.id) {
            render_world_object(state, obj, renderer);
        }
        i += 1;
    }

    if !consumed.is_empty() {
        state.world_objects.retain(|e| !consumed.contains(&e.id));
    }

    projectile_pass(state, dt, renderer);
    explosion_pass(state, dt, renderer);
}

/// Turn held keys into heading and velocity
fn apply_controls(state: &mut GameState, input: &TickInput) {
    let max_accel = state.tuning.player_max_accel;
    let step = state.tuning.player_accel_step;
    let turn = state.tuning.player_turn_step_deg.to_radians();

    let player = state.player_entity_mut();
    let forward = heading_to_dir(player.heading);

    if input.forward {
        player.vel = forward * player.accel;
        player.accel = (player.accel + step).min(max_accel);
    }
    if input.backward {
        player.vel = forward * player.accel;
        player.accel = (player.accel - step).max(0.0);
    }
    if input.turn_right {
        player.heading = normalize_angle(player.heading - turn);
        player.vel = forward * player.accel;
    }
    if input.turn_left {
        player.heading = normalize_angle(player.heading + turn);
        player.vel = forward * player.accel;
    }

    if input.quit && !state.quit_requested {
        log::info!("Quit requested");
        state.quit_requested = true;
        state.events.push(GameEvent::QuitRequested);
    }
    if input.fire {
        state.spawn_bullet();
    }
}

/// Expire bullets and test the survivors against live enemies
fn bullet_pass(state: &mut GameState, dt: f32) {
    let now = state.time;
    let mode = state.tuning.swept_ray;
    let despawn_delay = state.tuning.enemy_despawn_delay_secs;

    let mut spent: Vec<bool> = state
        .bullets
        .iter()
        .map(|b| matches!(b.kind, EntityKind::Bullet { expires_at, .. } if now > expires_at))
        .collect();
    let mut kills = Vec::new();

    for (k, bullet) in state.bullets.iter().enumerate() {
        if spent[k] {
            continue;
        }
        let ray = match mode {
            SweptRay::Unit => Ray::unit(bullet.pos, bullet.vel),
            SweptRay::Displacement => Ray::displacement(bullet.pos, bullet.vel, dt),
        };
        if let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| !e.deceased && ray_hits_circle(ray, e.pos))
        {
            spent[k] = true;
            enemy.kill();
            enemy.despawn_at = Some(now + despawn_delay);
            kills.push((enemy.id, enemy.pos));
        }
    }

    for (id, pos) in kills {
        state.spawn_explosion(pos);
        state.stats.enemies_destroyed += 1;
        log::debug!("Enemy {:?} shot down at {}", id, pos);
        state.events.push(GameEvent::EnemyDestroyed { id, pos });
    }

    if spent.iter().any(|&s| s) {
        state.remove_bullets(&spent);
    }
}

/// Steer, move, collide and draw every enemy, then drop the despawned ones
fn enemy_pass(state: &mut GameState, dt: f32, renderer: &mut dyn Renderer) {
    let angular_speed = state.tuning.patrol_angular_speed;
    let pursuit_speed = state.tuning.pursuit_speed;

    for k in 0..state.enemies.len() {
        let player = state.player_entity();
        let (player_pos, player_scale) = (player.pos, player.scale.x);
        let dead = state.player.dead;

        let enemy = &mut state.enemies[k];
        enemy.target = player_pos;
        steer(enemy, dead, angular_speed, pursuit_speed, dt);
        enemy.update(dt);

        if check_pursuit(enemy, player_pos, player_scale) {
            log::debug!("Enemy {:?} started pursuit", enemy.id);
        }

        let touching = !dead && circles_overlap(enemy.pos, player_pos, player_scale);
        if touching && !enemy.deceased && !state.player.invulnerable() {
            player_hit(state, k);
        }

        state.enemies[k].render(renderer);
    }

    let now = state.time;
    state.enemies.retain(|e| !e.despawn_due(now));
}

/// A live enemy rammed the player
fn player_hit(state: &mut GameState, k: usize) {
    let now = state.time;
    let despawn_delay = state.tuning.enemy_despawn_delay_secs;

    let enemy = &mut state.enemies[k];
    enemy.kill();
    let (id, pos) = (enemy.id, enemy.pos);
    state.spawn_explosion(pos);
    state.stats.enemies_destroyed += 1;
    state.events.push(GameEvent::EnemyDestroyed { id, pos });

    if state.player.lives <= 0 {
        kill_player(state);
    }

    state.player.lives -= 1;
    state.stats.lives_lost += 1;
    state.enemies[k].despawn_at = Some(now + despawn_delay);
    log::info!("Player hit by enemy {:?}, lives left: {}", id, state.player.lives);
    state.events.push(GameEvent::LifeLost {
        lives: state.player.lives,
    });
}

/// Out of lives: freeze the world and start the death delay
fn kill_player(state: &mut GameState) {
    let pos = state.player_entity().pos;
    state.spawn_explosion(pos);

    state.player.death_pos = pos;
    state.player_entity_mut().kill();
    for obj in &mut state.world_objects {
        obj.vel = Vec2::ZERO;
    }
    for enemy in &mut state.enemies {
        enemy.vel = Vec2::ZERO;
    }
    state.player.dead = true;
    state.player.end_time = Some(state.time + state.tuning.death_delay_secs);

    log::info!("Player destroyed at {}", pos);
    state.events.push(GameEvent::PlayerDied { pos });
}

/// Collect non-hostile pickups the player touches
fn pickup_pass(state: &mut GameState, consumed: &mut Vec<EntityId>) {
    if state.player.dead {
        return;
    }
    let player = state.player_entity();
    let touched: Vec<EntityId> = state
        .world_objects
        .iter()
        .skip(PLAYER_INDEX + 1)
        .filter(|o| !o.is_decorative() && !o.hostile && o.kind == EntityKind::Collectible)
        .filter(|o| !consumed.contains(&o.id) && entities_collide(player, o))
        .map(|o| o.id)
        .collect();

    for id in touched {
        consumed.push(id);
        collect_item(state);
    }
}

fn collect_item(state: &mut GameState) {
    state.player.items += 1;
    state.stats.pickups += 1;
    state.events.push(GameEvent::PickupCollected {
        items: state.player.items,
    });

    if state.player.items == state.tuning.pickups_for_invulnerability {
        let until = state.time + state.tuning.invulnerability_secs;
        state.player.items = 0;
        state.player.invulnerable_until = Some(until);
        state.player_entity_mut().texture = Texture::PlayerInvulnerable;
        log::info!("Invulnerable until t={:.2}", until);
        state.events.push(GameEvent::InvulnerabilityGained { until });
    }
}

/// Dead → GameOver once the death delay has run out. Fires once.
fn check_game_over(state: &mut GameState) {
    let due = state.player.end_time.is_some_and(|t| state.time >= t);
    if due && state.player.lives < 0 && !state.player.game_over {
        state.player.game_over = true;
        log::info!("Game Over");
        state.events.push(GameEvent::GameOver);
    }
}

fn check_invulnerability(state: &mut GameState) {
    if state.player.invulnerable_until.is_some_and(|t| state.time >= t) {
        state.player.invulnerable_until = None;
        state.player_entity_mut().texture = Texture::PlayerBody;
        log::info!("Invulnerability expired");
        state.events.push(GameEvent::InvulnerabilityLost);
    }
}

fn render_world_object(state: &GameState, obj: &Entity, renderer: &mut dyn Renderer) {
    match obj.kind {
        EntityKind::Blade { parent, spin } => {
            // Skipped for the frame if the parent is gone
            if let Some(parent) = state.world_object(parent) {
                renderer.draw(&DrawCall {
                    mesh: obj.mesh,
                    shader: obj.shader,
                    texture: obj.texture,
                    transform: parent.frame() * blade_local(obj, spin),
                    tiles: obj.tiles,
                });
            }
        }
        _ => obj.render(renderer),
    }
}

/// Move and draw bullets, with each trail drawn in its bullet's frame
fn projectile_pass(state: &mut GameState, dt: f32, renderer: &mut dyn Renderer) {
    for (bullet, trail) in state.bullets.iter_mut().zip(state.trails.iter_mut()) {
        bullet.update(dt);
        bullet.render(renderer);

        trail.update(dt);
        let parent = match trail.kind {
            EntityKind::Effect(EffectKind::Trail { bullet: id }) if id == bullet.id => {
                bullet.frame()
            }
            _ => {
                log::warn!("Trail {:?} out of step with bullet {:?}", trail.id, bullet.id);
                Mat4::IDENTITY
            }
        };
        trail.render_in(parent, renderer);
    }
}

/// Draw explosions and drop the expired ones
fn explosion_pass(state: &mut GameState, dt: f32, renderer: &mut dyn Renderer) {
    let now = state.time;
    for fx in &mut state.explosions {
        fx.update(dt);
        fx.render(renderer);
    }
    state.explosions.retain(|fx| !fx.despawn_due(now));
}
