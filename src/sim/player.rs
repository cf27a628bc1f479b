//! Player locomotion, health and weapon input
//!
//! Players are height-field walkers: grounded movement follows the terrain
//! polyline, airborne movement is ballistic. Input arrives as per-tick
//! snapshots; weapon presses turn into bus events that the grenade system
//! consumes at the end of the tick.

use glam::Vec2;
use std::f32::consts::FRAC_PI_4;

use super::grenade::{BaseKind, GrenadeKind};
use super::terrain::Terrain;
use crate::events::{Event, EventBus, ExplosionData, FireData};
use crate::tuning::PlayerTuning;

/// One tick of input for one player
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    /// Stick axes, x right-positive and y down-positive
    pub axes: [f32; 2],
    pub jump: bool,
    pub fire: bool,
    pub secondary_fire: bool,
    pub cycle_weapon: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Body lean in radians, eased toward the terrain slope when grounded
    pub angle: f32,
    pub aim_direction: f32,
    pub health: f32,
    pub alive: bool,
    pub weapons: Vec<GrenadeKind>,
    pub current_weapon: usize,
    pub airborne: bool,
    pub jump_available: bool,
    /// Set by knockback; suppresses ground control until landing
    pub out_of_control: bool,
}

impl Player {
    pub const MAX_SPEED: f32 = 380.0;
    pub const ACCEL_X: f32 = 10_000.0;
    pub const ACCEL_X_AIRBORNE: f32 = 2_000.0;
    pub const ACCEL_X_NOCONTROL: f32 = 100.0;
    pub const ACCEL_Y: f32 = -4_000.0;
    /// Grounded players detach from slopes steeper than this
    pub const MAX_DOWNHILL_ANGLE: f32 = FRAC_PI_4;
    /// Body lean beyond which a jump gets a sideways kick
    pub const MIN_SIDEJUMP_ANGLE: f32 = 0.349;
    pub const JUMP_VELOCITY: f32 = 1_200.0;
    /// Collision radius; also the foot-to-center offset
    pub const SIZE: f32 = 10.0;
    pub const MAX_HEALTH: f32 = 200.0;

    pub fn new(id: u32, x: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, 0.0),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            angle: 0.0,
            aim_direction: 0.0,
            health: Self::MAX_HEALTH,
            alive: true,
            weapons: vec![
                GrenadeKind::Base(BaseKind::Standard),
                GrenadeKind::Base(BaseKind::Cluster),
                GrenadeKind::Base(BaseKind::Inertia),
                GrenadeKind::Base(BaseKind::Teleport),
            ],
            current_weapon: 0,
            airborne: true,
            jump_available: false,
            out_of_control: false,
        }
    }

    /// Body center; `position` tracks the feet
    pub fn center_position(&self) -> Vec2 {
        self.position + Vec2::new(0.0, Self::SIZE)
    }

    pub fn current_weapon_kind(&self) -> GrenadeKind {
        self.weapons[self.current_weapon]
    }
}

pub struct PlayerSystem {
    players: Vec<Player>,
    tuning: PlayerTuning,
}

impl PlayerSystem {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            players: Vec::new(),
            tuning,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Spawn a new player at `x`, dropped in from above
    pub fn add_player(&mut self, x: f32) -> u32 {
        let id = self.players.len() as u32;
        let mut p = Player::new(id, x);
        p.position.y = 600.0;
        log::info!("player {id} joined at x = {x:.0}");
        self.players.push(p);
        id
    }

    /// One locomotion step. `inputs` is aligned with the player list;
    /// missing entries mean no input this tick.
    pub fn update(
        &mut self,
        dt: f32,
        terrain: &Terrain,
        inputs: &[PlayerInput],
        bus: &mut EventBus,
    ) {
        for (i, p) in self.players.iter_mut().enumerate() {
            if !p.alive {
                continue;
            }
            let input = inputs.get(i).copied().unwrap_or_default();
            Self::step_locomotion(p, dt, terrain, &input, &self.tuning);
            Self::step_weapons(p, &input, bus);
        }
    }

    fn step_locomotion(
        p: &mut Player,
        dt: f32,
        terrain: &Terrain,
        input: &PlayerInput,
        tuning: &PlayerTuning,
    ) {
        let accel_x = if p.out_of_control {
            Player::ACCEL_X_NOCONTROL
        } else if p.airborne {
            Player::ACCEL_X_AIRBORNE
        } else {
            Player::ACCEL_X
        };

        // Drag term caps steady-state speed at MAX_SPEED for full input
        p.acceleration.x = input.axes[0] * accel_x - accel_x / Player::MAX_SPEED * p.velocity.x;
        p.acceleration.y = Player::ACCEL_Y;
        p.velocity += p.acceleration * dt;

        // Walking uphill is slower than walking on the flat
        let terrain_angle = terrain.angle_at(p.position.x);
        if !p.airborne && terrain_angle.signum() == p.velocity.x.signum() {
            p.velocity.x *= terrain_angle.cos();
        }

        let mut new_position = p.position + p.velocity * dt;
        let ground = terrain.height_at(new_position.x);

        if new_position.y <= ground {
            if p.airborne {
                p.airborne = false;
                p.jump_available = true;
                p.out_of_control = false;
            }
            p.velocity.y = p.velocity.y.max(0.0);
            new_position.y = ground;
        } else if !p.airborne {
            // Moving away from the ground: stick to shallow slopes,
            // detach on steep downhill
            if terrain_angle.abs() < Player::MAX_DOWNHILL_ANGLE {
                new_position.y = ground;
            } else {
                p.airborne = true;
            }
        }

        if tuning.clamp_to_world_bounds {
            new_position.x = new_position.x.clamp(0.0, terrain.max_width());
        }
        p.position = new_position;

        // Lean: follow the slope on the ground, lean into the run in the air
        let airborne_frac = ((p.position.y - ground) / 170.0).clamp(0.0, 1.0);
        let lean = -(15.0_f32).to_radians() * p.velocity.x / Player::MAX_SPEED;
        let goal = terrain_angle + airborne_frac * (lean - terrain_angle);
        p.angle += 12.0 * dt * (goal - p.angle);

        if input.axes[0] != 0.0 || input.axes[1] != 0.0 {
            p.aim_direction = input.axes[1].atan2(input.axes[0]);
        }

        if input.jump
            && p.jump_available
            && !p.airborne
            && (!p.out_of_control || tuning.allow_jump_out_of_control)
        {
            p.velocity.y = Player::JUMP_VELOCITY;
            if p.angle.abs() > Player::MIN_SIDEJUMP_ANGLE {
                p.velocity.x += 0.4 * Player::JUMP_VELOCITY * -p.angle.sin();
            }
            p.airborne = true;
            p.jump_available = false;
        }
    }

    fn step_weapons(p: &mut Player, input: &PlayerInput, bus: &mut EventBus) {
        if input.cycle_weapon {
            p.current_weapon = (p.current_weapon + 1) % p.weapons.len();
        }
        if input.fire {
            bus.send(Event::FireWeapon(FireData {
                player_id: p.id,
                position: p.center_position(),
                velocity: p.velocity,
                aim_direction: p.aim_direction,
                weapon: p.current_weapon_kind(),
            }));
        }
        if input.secondary_fire {
            bus.send(Event::SecondaryFire { player_id: p.id });
        }
    }

    /// Bus delivery from the simulation root
    pub fn on_event(&mut self, event: &Event, bus: &mut EventBus) {
        match event {
            Event::Explosion(data) => self.on_explosion(data, bus),
            Event::PlayerTeleport {
                player_id,
                position,
            } => self.on_teleport(*player_id, *position),
            _ => {}
        }
    }

    fn on_explosion(&mut self, e: &ExplosionData, bus: &mut EventBus) {
        for p in &mut self.players {
            if !p.alive {
                continue;
            }
            let diff = p.center_position() - e.position;
            let dist = diff.length();
            if dist >= e.radius {
                continue;
            }

            let launch = e.knockback * ((e.radius - dist) / e.radius).sqrt();
            if diff.x.abs() < 1.5 * Player::SIZE {
                // Standing on top of the blast: mostly straight up
                p.velocity.x += diff.x.signum() * launch * 0.2;
                p.velocity.y += launch * 1.5;
            } else {
                p.velocity.x += diff.x.signum() * launch;
                p.velocity.y += launch;
            }
            p.airborne = true;
            p.out_of_control = true;

            let damage = e.damage * (1.0 - dist / e.radius);
            p.health -= damage;
            log::debug!(
                "player {} took {:.0} damage, {:.0} health left",
                p.id,
                damage,
                p.health
            );
            if p.health <= 0.0 {
                p.alive = false;
                log::info!("player {} died", p.id);
                bus.send(Event::PlayerDied { player_id: p.id });
            }
        }
    }

    fn on_teleport(&mut self, player_id: u32, position: Vec2) {
        if let Some(p) = self.players.iter_mut().find(|p| p.id == player_id) {
            p.position = position;
            p.velocity = Vec2::ZERO;
            p.airborne = true;
            p.out_of_control = false;
        }
    }
}
