//! Craterfall - destructible 2D terrain and grenade simulation
//!
//! Core modules:
//! - `sim`: deterministic simulation (terrain, grenades, players)
//! - `events`: typed notification bus between simulation systems
//! - `tuning`: data-driven game balance
//!
//! The crate is headless: rendering, input devices and audio live in the
//! host, which reads the terrain polyline, the live grenade list and the
//! per-tick event outbox between frames and never mutates them.

pub mod events;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Terrain sample spacing along x
    pub const TERRAIN_PRECISION: f32 = 45.0;
    /// Sampled domain width
    pub const TERRAIN_MAX_WIDTH: f32 = 10_000.0;
    /// Craters never dig below this y
    pub const TERRAIN_MAX_DEPTH: f32 = -400.0;
    /// Amplitude of the initial random roughness
    pub const TERRAIN_ROUGHNESS: f32 = 10.0;
    /// Height reported outside the sampled domain ("far below ground")
    pub const HEIGHT_OUT_OF_DOMAIN: f32 = -1_000.0;
    /// FIFO cap on live terrain modifiers
    pub const MAX_TERRAIN_MODIFIERS: usize = 40;

    /// Gravity applied to grenades
    pub const GRENADE_GRAVITY: f32 = -2_200.0;
    /// Muzzle speed of a fired grenade
    pub const GRENADE_FIRE_STRENGTH: f32 = 600.0;
    /// Fraction of the firing player's velocity a grenade inherits
    pub const GRENADE_INHERIT_VELOCITY: f32 = 0.33;
    /// Velocity magnitude retained after a bounce
    pub const GRENADE_BOUNCE_DAMPING: f32 = 0.5;

    /// Fraction of the parent's horizontal velocity a fragment inherits
    pub const FRAGMENT_INHERIT_VELOCITY: f32 = 0.3;
    /// Uniform horizontal jitter of a fragment's spawn velocity
    pub const FRAGMENT_SPREAD_X: f32 = 230.0;
    /// Upward kick of a fragment, scaled by uniform(0.5, 1.0)
    pub const FRAGMENT_KICK_Y: f32 = 400.0;

    /// Terrain wobble oscillation frequency (rad/s)
    pub const WOBBLE_FREQUENCY: f32 = 15.0;
    /// Exponential time decay rate of a wobble (~0.3 s time constant)
    pub const WOBBLE_TIME_DECAY: f32 = 3.5;
    /// Exponential spatial falloff constant of a wobble
    pub const WOBBLE_DISTANCE_DECAY: f32 = 200.0;
    /// Lifetime of a wobble modifier
    pub const WOBBLE_LIFETIME: f32 = 4.0;
    /// Wobble amplitude for a unit terrain-wobble modifier
    pub const WOBBLE_BASE_AMPLITUDE: f32 = 15.0;

    /// Slow-motion zone left behind by inertia grenades
    pub const INERTIA_ZONE_RADIUS: f32 = 160.0;
    pub const INERTIA_ZONE_TIMESCALE: f32 = 0.3;
    pub const INERTIA_ZONE_LIFETIME: f32 = 4.0;

    /// Window before a timed detonation in which `slow_before_detonate`
    /// grenades ease their local timescale down, and the floor they reach
    pub const SLOW_DETONATE_WINDOW: f32 = 0.6;
    pub const SLOW_DETONATE_TIMESCALE: f32 = 0.25;
}
