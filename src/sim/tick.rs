//! Fixed-timestep simulation tick
//!
//! One tick advances every system by exactly `consts::SIM_DT` seconds, then
//! drains the event bus until it is quiescent. Events emitted while routing
//! (chained detonations, deaths, teleports) are routed in the same drain, so
//! a tick never ends with pending events.
//!
//! Deformations land in the terrain's base samples and become visible when
//! the next tick resamples the surface, one frame later. Callers that need
//! instant feedback read the explosion events themselves from the outbox.

use super::player::PlayerInput;
use super::state::SimState;
use crate::consts::SIM_DT;
use crate::events::{Event, SystemId};

/// Advance the simulation by one fixed step
pub fn tick(state: &mut SimState, inputs: &[PlayerInput]) {
    state.bus.begin_tick();
    state.time += SIM_DT as f64;
    state.time_ticks += 1;

    state.terrain.update(state.time, SIM_DT);
    state
        .players
        .update(SIM_DT, &state.terrain, inputs, &mut state.bus);
    state.grenades.update(
        SIM_DT,
        &state.terrain,
        state.players.players(),
        &mut state.bus,
        &mut state.rng,
    );

    route_events(state);
}

/// Drain the bus until quiescent, delivering each event to its subscribers
/// in registration order
fn route_events(state: &mut SimState) {
    while let Some(event) = state.bus.pop() {
        let targets = state.bus.subscribers(event.kind()).to_vec();
        for target in targets {
            match target {
                SystemId::Terrain => {
                    if let Event::Explosion(e) = &event {
                        state.terrain.on_explosion(e);
                    }
                }
                SystemId::Grenades => {
                    state
                        .grenades
                        .on_event(&event, &mut state.bus, &mut state.rng);
                }
                SystemId::Players => {
                    state.players.on_event(&event, &mut state.bus);
                }
            }
        }
        state.bus.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, ExplosionData};
    use crate::sim::terrain::Terrain;
    use crate::tuning::Tuning;
    use glam::Vec2;

    fn flat_terrain() -> Terrain {
        let samples = (0..=40).map(|i| Vec2::new(i as f32 * 50.0, 0.0)).collect();
        Terrain::from_points(samples)
    }

    fn scripted_input(tick_index: u64) -> PlayerInput {
        PlayerInput {
            axes: [1.0, -0.6],
            jump: tick_index % 300 == 0,
            fire: tick_index % 240 == 120,
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_seeds_and_inputs_stay_in_lockstep() {
        let tuning = Tuning::default();
        let mut a = SimState::new(7, &tuning);
        let mut b = SimState::new(7, &tuning);
        a.players.add_player(1_000.0);
        b.players.add_player(1_000.0);

        for i in 0..1_200 {
            let input = scripted_input(i);
            tick(&mut a, &[input]);
            tick(&mut b, &[input]);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.terrain.points(), b.terrain.points());
        assert_eq!(
            a.players.players()[0].position,
            b.players.players()[0].position
        );
        assert_eq!(a.grenades.grenades().len(), b.grenades.grenades().len());
        for (ga, gb) in a.grenades.grenades().iter().zip(b.grenades.grenades()) {
            assert_eq!(ga.position, gb.position);
            assert_eq!(ga.velocity, gb.velocity);
        }
    }

    #[test]
    fn test_fire_input_reaches_grenade_system_same_tick() {
        let tuning = Tuning::default();
        let mut state = SimState::with_terrain(0, &tuning, flat_terrain());
        state.players.add_player(1_000.0);

        // Land the player first
        for _ in 0..240 {
            tick(&mut state, &[PlayerInput::default()]);
        }

        let fire = PlayerInput {
            axes: [1.0, -0.5],
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &[fire]);

        let kinds: Vec<EventKind> = state.bus.outbox().iter().map(Event::kind).collect();
        assert!(kinds.contains(&EventKind::FireWeapon));
        assert!(kinds.contains(&EventKind::ProjectileSpawned));

        // Spawn buffer merges on the next tick
        assert!(state.grenades.grenades().is_empty());
        tick(&mut state, &[PlayerInput::default()]);
        assert_eq!(state.grenades.grenades().len(), 1);
        assert_eq!(state.grenades.grenades()[0].owner, Some(0));
    }

    #[test]
    fn test_deformation_becomes_visible_one_tick_later() {
        let tuning = Tuning::default();
        let mut state = SimState::with_terrain(0, &tuning, flat_terrain());

        let x = 1_000.0;
        let before = state.terrain.height_at(x);
        state.bus.send(Event::Explosion(ExplosionData {
            position: Vec2::new(x, 0.0),
            damage: 140.0,
            radius: 140.0,
            knockback: 800.0,
            terrain_damage_modifier: 1.0,
            terrain_wobble_modifier: 1.0,
        }));

        // This tick routes the explosion after the surface was resampled
        tick(&mut state, &[]);
        assert_eq!(state.terrain.height_at(x), before);

        tick(&mut state, &[]);
        assert!(state.terrain.height_at(x) < before);
    }

    #[test]
    fn test_explosion_routes_to_terrain_and_players_in_one_drain() {
        let tuning = Tuning::default();
        let mut state = SimState::with_terrain(0, &tuning, flat_terrain());
        state.players.add_player(1_000.0);
        for _ in 0..240 {
            tick(&mut state, &[PlayerInput::default()]);
        }

        let target = state.players.players()[0].center_position();
        state.bus.send(Event::Explosion(ExplosionData {
            position: target + Vec2::new(30.0, 0.0),
            damage: 50.0,
            radius: 140.0,
            knockback: 800.0,
            terrain_damage_modifier: 1.0,
            terrain_wobble_modifier: 1.0,
        }));
        tick(&mut state, &[]);
        tick(&mut state, &[]);

        let p = &state.players.players()[0];
        assert!(p.health < 200.0);
        assert!(state.terrain.height_at(target.x) < 0.0);
    }

    /// Death while holding a detonate-on-death grenade chains inside a
    /// single drain: Explosion -> PlayerDied -> Explosion.
    #[test]
    fn test_death_chains_detonate_on_death_in_same_tick() {
        use crate::sim::grenade::{BaseKind, Grenade, GrenadeKind};

        let tuning = Tuning::default();
        let mut state = SimState::with_terrain(0, &tuning, flat_terrain());
        state.players.add_player(1_000.0);
        for _ in 0..240 {
            tick(&mut state, &[PlayerInput::default()]);
        }

        // Park a teleport grenade owned by the player far away, mid-air
        let mut g = Grenade::new(
            GrenadeKind::Base(BaseKind::Teleport),
            state.grenades.catalog(),
        );
        g.owner = Some(0);
        g.position = Vec2::new(200.0, 900.0);
        g.acceleration = Vec2::ZERO;
        g.properties.lifetime = 0.0;
        g.properties.detonate_on_land = false;
        state.grenades.spawn(g);
        tick(&mut state, &[]);
        assert_eq!(state.grenades.grenades().len(), 1);

        // Kill the player with a direct hit
        let target = state.players.players()[0].center_position();
        state.bus.send(Event::Explosion(ExplosionData {
            position: target,
            damage: 10_000.0,
            radius: 140.0,
            knockback: 0.0,
            terrain_damage_modifier: 0.0,
            terrain_wobble_modifier: 0.0,
        }));
        tick(&mut state, &[]);

        assert!(!state.players.players()[0].alive);
        let explosions = state
            .bus
            .outbox()
            .iter()
            .filter(|e| e.kind() == EventKind::Explosion)
            .count();
        assert_eq!(explosions, 2);
        assert!(
            state
                .bus
                .outbox()
                .iter()
                .any(|e| e.kind() == EventKind::PlayerDied)
        );
    }
}
