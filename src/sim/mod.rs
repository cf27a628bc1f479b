//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Single-threaded, synchronous updates
//! - No rendering or platform dependencies

pub mod collision;
pub mod grenade;
pub mod grenades;
pub mod player;
pub mod state;
pub mod terrain;
pub mod tick;

pub use collision::{LineSegment, reflect, rotate, segment_intersection};
pub use grenade::{BaseKind, Grenade, GrenadeCatalog, GrenadeKind, GrenadeProperties};
pub use grenades::{GrenadeSystem, InertiaZone};
pub use player::{Player, PlayerInput, PlayerSystem};
pub use state::SimState;
pub use terrain::Terrain;
pub use tick::tick;
