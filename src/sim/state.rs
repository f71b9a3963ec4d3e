//! Game state and core simulation types
//!
//! The frame updater owns everything here. Other components only hold
//! [`EntityId`] handles, which are looked up (and may fail) every frame.

use glam::{Mat4, Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EnemyBrain, Entity, EntityId, EntityKind};
use super::spawner::SpawnTimer;
use crate::consts::CAMERA_ZOOM;
use crate::renderer::Texture;
use crate::settings::Tuning;

/// The player is always the first world object
pub const PLAYER_INDEX: usize = 0;

/// Where the player stands in the life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPhase {
    Alive,
    /// Alive and immune to body collisions until the window closes
    Invulnerable,
    /// Out of lives, waiting out the death delay
    Dead,
    GameOver,
}

/// Player bookkeeping that outlives any single frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatus {
    /// Game over once this goes below zero
    pub lives: i32,
    /// Pickups toward the next invulnerability window
    pub items: u32,
    pub invulnerable_until: Option<f64>,
    pub dead: bool,
    /// Camera anchor after death
    pub death_pos: Vec2,
    /// When the death delay runs out
    pub end_time: Option<f64>,
    pub game_over: bool,
}

impl PlayerStatus {
    pub fn new(lives: i32) -> Self {
        Self {
            lives,
            items: 0,
            invulnerable_until: None,
            dead: false,
            death_pos: Vec2::ZERO,
            end_time: None,
            game_over: false,
        }
    }

    #[inline]
    pub fn invulnerable(&self) -> bool {
        self.invulnerable_until.is_some()
    }

    pub fn phase(&self) -> PlayerPhase {
        if self.game_over {
            PlayerPhase::GameOver
        } else if self.dead {
            PlayerPhase::Dead
        } else if self.invulnerable() {
            PlayerPhase::Invulnerable
        } else {
            PlayerPhase::Alive
        }
    }
}

/// Things that happened during a frame, drained by the runner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemySpawned { id: EntityId, pos: Vec2 },
    BulletFired { id: EntityId },
    EnemyDestroyed { id: EntityId, pos: Vec2 },
    PickupCollected { items: u32 },
    InvulnerabilityGained { until: f64 },
    InvulnerabilityLost,
    LifeLost { lives: i32 },
    PlayerDied { pos: Vec2 },
    GameOver,
    QuitRequested,
}

/// Counters for the end-of-run summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub shots_fired: u32,
    pub enemies_spawned: u32,
    pub enemies_destroyed: u32,
    pub pickups: u32,
    pub lives_lost: u32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Simulation clock (seconds)
    pub time: f64,
    pub frame: u64,
    /// Point the camera centers on
    pub camera: Vec2,
    pub player: PlayerStatus,
    pub spawner: SpawnTimer,
    /// Player first, then collectibles, then decorative scenery last
    pub world_objects: Vec<Entity>,
    pub enemies: Vec<Entity>,
    pub bullets: Vec<Entity>,
    /// Index-aligned with `bullets`
    pub trails: Vec<Entity>,
    pub explosions: Vec<Entity>,
    pub events: Vec<GameEvent>,
    pub stats: RunStats,
    pub quit_requested: bool,
    next_id: u32,
}

impl GameState {
    /// Create a new game with the standard world layout
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::empty(seed, tuning);
        state.setup_world();
        state
    }

    /// A state with no entities at all, for building custom scenes
    pub fn empty(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: PlayerStatus::new(tuning.starting_lives),
            spawner: SpawnTimer::new(tuning.enemy_spawn_interval_secs),
            tuning,
            time: 0.0,
            frame: 0,
            camera: Vec2::ZERO,
            world_objects: Vec::new(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            trails: Vec::new(),
            explosions: Vec::new(),
            events: Vec::new(),
            stats: RunStats::default(),
            quit_requested: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn setup_world(&mut self) {
        let player_id = self.next_entity_id();
        self.world_objects.push(Entity::new(
            player_id,
            EntityKind::Player,
            Vec2::ZERO,
            Texture::PlayerBody,
        ));

        for pos in [Vec2::new(-2.2, 0.0), Vec2::new(2.8, 0.0)] {
            self.add_enemy(pos);
        }

        for pos in [
            Vec2::new(-3.5, 0.0),
            Vec2::new(3.5, 0.0),
            Vec2::new(0.0, 3.5),
            Vec2::new(-3.0, -3.5),
            Vec2::new(3.5, -3.5),
        ] {
            self.add_collectible(pos);
        }

        // Decorative tail: blade, black hole, background
        let id = self.next_entity_id();
        self.world_objects.push(
            Entity::new(
                id,
                EntityKind::Blade {
                    parent: player_id,
                    spin: 0.0,
                },
                Vec2::ZERO,
                Texture::Blade,
            )
            .with_depth(-1.0)
            .with_scale(Vec2::splat(3.0)),
        );

        let id = self.next_entity_id();
        self.world_objects.push(
            Entity::new(id, EntityKind::Decoration, Vec2::ZERO, Texture::BlackHole)
                .with_scale(Vec2::new(10.0, 3.0))
                .with_heading(45f32.to_radians()),
        );

        let id = self.next_entity_id();
        let mut background = Entity::new(id, EntityKind::Background, Vec2::ZERO, Texture::Stars)
            .with_scale(Vec2::splat(100.0));
        background.tiles = 10;
        self.world_objects.push(background);
    }

    /// Add a patrolling enemy orbiting just below-left of `pos`
    pub fn add_enemy(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let mut enemy = Entity::new(
            id,
            EntityKind::Enemy(EnemyBrain {
                pursuing: false,
                prev_turn: 0.0,
            }),
            pos,
            Texture::EnemyBody,
        );
        enemy.hostile = true;
        self.enemies.push(enemy);
        self.stats.enemies_spawned += 1;
        id
    }

    /// Insert a collectible ahead of the decorative tail
    pub fn add_collectible(&mut self, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let item = Entity::new(id, EntityKind::Collectible, pos, Texture::Item);
        let at = self
            .world_objects
            .iter()
            .position(Entity::is_decorative)
            .unwrap_or(self.world_objects.len());
        self.world_objects.insert(at, item);
        id
    }

    #[inline]
    pub fn player_entity(&self) -> &Entity {
        &self.world_objects[PLAYER_INDEX]
    }

    #[inline]
    pub fn player_entity_mut(&mut self) -> &mut Entity {
        &mut self.world_objects[PLAYER_INDEX]
    }

    /// Look up a world object by handle
    pub fn world_object(&self, id: EntityId) -> Option<&Entity> {
        self.world_objects.iter().find(|e| e.id == id)
    }

    /// Camera view: zoom, centered on the camera target
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(CAMERA_ZOOM))
            * Mat4::from_translation(-self.camera.extend(0.0))
    }

    /// Live enemies still in play
    pub fn live_enemies(&self) -> impl Iterator<Item = &Entity> {
        self.enemies.iter().filter(|e| !e.deceased)
    }

    pub fn collectibles(&self) -> impl Iterator<Item = &Entity> {
        self.world_objects
            .iter()
            .filter(|e| e.kind == EntityKind::Collectible)
    }

    /// Drop bullets flagged in `spent`, keeping `trails` in lockstep
    pub fn remove_bullets(&mut self, spent: &[bool]) {
        if spent.len() != self.bullets.len() || self.trails.len() != self.bullets.len() {
            log::warn!(
                "Bullet removal mask out of step: {} flags, {} bullets, {} trails",
                spent.len(),
                self.bullets.len(),
                self.trails.len()
            );
        }
        let mut flags = spent.iter();
        self.bullets.retain(|_| !flags.next().copied().unwrap_or(false));
        let mut flags = spent.iter();
        self.trails.retain(|_| !flags.next().copied().unwrap_or(false));
    }

    /// Should the frame loop stop?
    pub fn should_exit(&self) -> bool {
        self.quit_requested || self.player.game_over
    }

    /// Take this frame's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
