//! Grenade store and physics
//!
//! Live grenades sit in a dense array. Spawns go to a pending buffer merged
//! at the start of the next update; removals are flagged and swept then.
//! The live set is never mutated while it is being iterated - that is a
//! structural invariant of the whole simulation, not an optimization.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::grenade::{BaseKind, Grenade, GrenadeCatalog, GrenadeKind};
use super::player::Player;
use super::terrain::Terrain;
use crate::consts::*;
use crate::events::{Event, EventBus, ExplosionData, FireData};
use crate::tuning::PhysicsTuning;

/// A timed zone that dilates the local timescale of grenades inside it
#[derive(Debug, Clone, Copy)]
pub struct InertiaZone {
    pub position: Vec2,
    pub radius: f32,
    pub timescale: f32,
    pub ttl: f32,
}

pub struct GrenadeSystem {
    catalog: GrenadeCatalog,
    physics: PhysicsTuning,
    grenades: Vec<Grenade>,
    pending: Vec<Grenade>,
    zones: Vec<InertiaZone>,
}

impl GrenadeSystem {
    pub fn new(catalog: GrenadeCatalog, physics: PhysicsTuning) -> Self {
        Self {
            catalog,
            physics,
            grenades: Vec::new(),
            pending: Vec::new(),
            zones: Vec::new(),
        }
    }

    /// Live grenades, read-only (for rendering and tests)
    pub fn grenades(&self) -> &[Grenade] {
        &self.grenades
    }

    /// Active inertia zones, read-only
    pub fn zones(&self) -> &[InertiaZone] {
        &self.zones
    }

    pub fn catalog(&self) -> &GrenadeCatalog {
        &self.catalog
    }

    /// Queue a grenade for the next tick's merge
    pub fn spawn(&mut self, grenade: Grenade) {
        self.pending.push(grenade);
    }

    /// One physics step: merge pending spawns, sweep last step's removals,
    /// then integrate, collide and detonate each live grenade.
    pub fn update(
        &mut self,
        dt: f32,
        terrain: &Terrain,
        players: &[Player],
        bus: &mut EventBus,
        rng: &mut Pcg32,
    ) {
        self.grenades.append(&mut self.pending);
        self.grenades.retain(|g| !g.awaiting_removal);

        for z in &mut self.zones {
            z.ttl -= dt;
        }
        self.zones.retain(|z| z.ttl > 0.0);

        let mut to_explode: Vec<usize> = Vec::new();
        let physics = self.physics;

        for i in 0..self.grenades.len() {
            let g = &mut self.grenades[i];
            g.just_collided_with_player = None;

            // Local timescale: pre-detonation slowdown, then inertia zones
            let mut timescale = 1.0_f32;
            if g.properties.slow_before_detonate && g.properties.lifetime > 0.0 {
                let remaining = g.properties.lifetime - g.age;
                if remaining < SLOW_DETONATE_WINDOW {
                    let t = (remaining / SLOW_DETONATE_WINDOW).clamp(0.0, 1.0);
                    timescale = SLOW_DETONATE_TIMESCALE + (1.0 - SLOW_DETONATE_TIMESCALE) * t;
                }
            }
            for z in &self.zones {
                if g.position.distance(z.position) < z.radius {
                    timescale = timescale.min(z.timescale);
                }
            }
            g.local_timescale = timescale;
            let dt_local = dt * g.local_timescale;

            // Integrate
            g.velocity += g.acceleration * dt_local;
            let mut new_position = g.position + g.velocity * dt_local;

            // Collision test, skipped on the step right after a bounce so
            // the reflected path is never re-tested against the same spot
            let mut hit_ground = false;
            if g.just_bounced {
                g.just_bounced = false;
            } else if let Some(hit) = terrain.intersect(g.position, new_position) {
                g.just_bounced = true;
                new_position = hit;
                hit_ground = true;
            } else if new_position.y < terrain.height_at(new_position.x) {
                // Failsafe for fast or degenerate paths
                new_position.y = terrain.height_at(new_position.x);
                hit_ground = true;
            }

            if hit_ground && Self::grenade_hit_ground(g, terrain, new_position, &physics) {
                to_explode.push(i);
            }

            // Commit
            g.position = new_position;
            g.age += dt_local;

            // Player contact
            for p in players {
                if !p.alive || Some(p.id) == g.owner {
                    continue;
                }
                if g.position.distance(p.center_position()) < Player::SIZE {
                    g.just_collided_with_player = Some(p.id);
                    if g.properties.detonate_on_player_hit {
                        to_explode.push(i);
                    } else if g.properties.bounce_on_player_hit && !g.just_bounced {
                        let normal = (g.position - p.center_position()).normalize_or_zero();
                        g.velocity = physics.bounce_damping
                            * super::collision::reflect(g.velocity, normal);
                        g.just_bounced = true;
                    }
                    break;
                }
            }

            // Timer
            if g.properties.lifetime > 0.0 && g.age >= g.properties.lifetime {
                to_explode.push(i);
            }
        }

        // A grenade can be requested twice in one step (landing and timer
        // racing); explode_at is idempotent per lifecycle.
        for i in to_explode {
            self.explode_at(i, bus, rng);
        }
    }

    /// Ground contact. Returns true when the grenade should detonate;
    /// otherwise reflects the velocity about the terrain slope at half
    /// magnitude.
    fn grenade_hit_ground(
        g: &mut Grenade,
        terrain: &Terrain,
        pos: Vec2,
        physics: &PhysicsTuning,
    ) -> bool {
        if g.properties.detonate_on_land {
            return true;
        }

        let terrain_angle = terrain.angle_at(pos.x);
        let grenade_angle = g.velocity.y.atan2(g.velocity.x);
        let rotate_angle = 2.0 * (terrain_angle - grenade_angle);
        g.velocity = physics.bounce_damping * super::collision::rotate(g.velocity, rotate_angle);
        false
    }

    /// Detonate the grenade at `index`: flag it for removal, emit exactly
    /// one explosion event, and run its side effects (inertia zone,
    /// teleport, cluster fragments). Safe to call more than once per step;
    /// only the first call does anything.
    fn explode_at(&mut self, index: usize, bus: &mut EventBus, rng: &mut Pcg32) {
        let (position, velocity, owner, props) = {
            let g = &mut self.grenades[index];
            if g.awaiting_removal {
                return;
            }
            g.awaiting_removal = true;
            (g.position, g.velocity, g.owner, g.properties)
        };

        log::debug!(
            "grenade detonated at ({:.1}, {:.1}), radius {:.0}",
            position.x,
            position.y,
            props.radius
        );

        bus.send(Event::Explosion(ExplosionData {
            position,
            damage: props.damage,
            radius: props.radius,
            knockback: props.knockback,
            terrain_damage_modifier: props.terrain_damage_modifier,
            terrain_wobble_modifier: props.terrain_wobble_modifier,
        }));

        if props.spawn_inertia_zone {
            self.zones.push(InertiaZone {
                position,
                radius: INERTIA_ZONE_RADIUS,
                timescale: INERTIA_ZONE_TIMESCALE,
                ttl: INERTIA_ZONE_LIFETIME,
            });
        }

        if props.teleport_player_on_detonate
            && let Some(owner_id) = owner
        {
            bus.send(Event::PlayerTeleport {
                player_id: owner_id,
                position,
            });
        }

        for _ in 0..props.num_cluster_fragments {
            let mut f = Grenade::new(GrenadeKind::Base(BaseKind::ClusterFragment), &self.catalog);
            f.owner = owner;
            f.position = position;
            f.acceleration = Vec2::new(0.0, self.physics.gravity);
            f.velocity.x = FRAGMENT_INHERIT_VELOCITY * velocity.x
                + FRAGMENT_SPREAD_X * rng.random_range(-1.0..1.0);
            f.velocity.y = FRAGMENT_KICK_Y * rng.random_range(0.5..1.0);
            bus.send(Event::ProjectileSpawned {
                kind: f.kind,
                owner: f.owner,
                position: f.position,
            });
            self.pending.push(f);
        }
    }

    /// Bus delivery from the simulation root
    pub fn on_event(&mut self, event: &Event, bus: &mut EventBus, rng: &mut Pcg32) {
        match event {
            Event::FireWeapon(data) => self.on_fire_weapon(data, bus),
            Event::SecondaryFire { player_id } => self.on_secondary_fire(*player_id, bus, rng),
            Event::PlayerDied { player_id } => self.on_player_died(*player_id, bus, rng),
            _ => {}
        }
    }

    fn on_fire_weapon(&mut self, data: &FireData, bus: &mut EventBus) {
        let mut g = Grenade::new(data.weapon, &self.catalog);
        g.owner = Some(data.player_id);
        g.position = data.position;
        g.acceleration = Vec2::new(0.0, self.physics.gravity);
        g.velocity = self.physics.fire_inherit_velocity * data.velocity;
        g.velocity.x += self.physics.fire_strength * data.aim_direction.cos();
        g.velocity.y += self.physics.fire_strength * -data.aim_direction.sin();

        log::info!("player {} fired {:?}", data.player_id, data.weapon);

        bus.send(Event::ProjectileSpawned {
            kind: g.kind,
            owner: g.owner,
            position: g.position,
        });
        self.pending.push(g);
    }

    /// Secondary fire detonates the shooter's own manual-detonate grenades
    fn on_secondary_fire(&mut self, player_id: u32, bus: &mut EventBus, rng: &mut Pcg32) {
        let owned: Vec<usize> = self
            .grenades
            .iter()
            .enumerate()
            .filter(|(_, g)| g.owner == Some(player_id) && g.properties.manual_detonate)
            .map(|(i, _)| i)
            .collect();

        for i in owned {
            self.explode_at(i, bus, rng);
        }
    }

    /// A dead player's detonate-on-death grenades go off immediately
    fn on_player_died(&mut self, player_id: u32, bus: &mut EventBus, rng: &mut Pcg32) {
        let owned: Vec<usize> = self
            .grenades
            .iter()
            .enumerate()
            .filter(|(_, g)| g.owner == Some(player_id) && g.properties.detonate_on_death)
            .map(|(i, _)| i)
            .collect();

        for i in owned {
            self.explode_at(i, bus, rng);
        }
    }
}
