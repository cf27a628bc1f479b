//! Gameplay tuning loaded from JSON
//!
//! Everything here has a sensible default so an empty `{}` file (or no file
//! at all) yields the stock balance. Grenade overrides are keyed by base
//! kind and replace that kind's whole property set.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::sim::grenade::{BaseKind, GrenadeCatalog, GrenadeProperties};

/// Projectile physics knobs; defaults match the stock constants
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
    pub fire_strength: f32,
    /// Fraction of the firing player's velocity a grenade inherits
    pub fire_inherit_velocity: f32,
    pub bounce_damping: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: consts::GRENADE_GRAVITY,
            fire_strength: consts::GRENADE_FIRE_STRENGTH,
            fire_inherit_velocity: consts::GRENADE_INHERIT_VELOCITY,
            bounce_damping: consts::GRENADE_BOUNCE_DAMPING,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub allow_jump_out_of_control: bool,
    pub clamp_to_world_bounds: bool,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            allow_jump_out_of_control: false,
            clamp_to_world_bounds: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub grenades: BTreeMap<BaseKind, GrenadeProperties>,
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, TuningError> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }

    /// Stock catalog with this tuning's overrides applied on top
    pub fn catalog(&self) -> GrenadeCatalog {
        let mut catalog = GrenadeCatalog::standard();
        for (&kind, &props) in &self.grenades {
            catalog.register(kind, props);
        }
        catalog
    }
}

#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for TuningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "failed to read tuning file: {e}"),
            TuningError::Parse(e) => write!(f, "failed to parse tuning file: {e}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grenade::GrenadeKind;

    #[test]
    fn test_empty_json_is_stock_balance() {
        let tuning = Tuning::from_json("{}").unwrap();
        assert!(!tuning.player.allow_jump_out_of_control);
        assert!(tuning.player.clamp_to_world_bounds);
        assert!(tuning.grenades.is_empty());

        let stock = GrenadeCatalog::standard();
        let kind = GrenadeKind::Base(BaseKind::Standard);
        assert_eq!(tuning.catalog().properties(kind), stock.properties(kind));
    }

    #[test]
    fn test_partial_grenade_override_fills_defaults() {
        let tuning = Tuning::from_json(
            r#"{
                "grenades": {
                    "Cluster": { "num_cluster_fragments": 12, "manual_detonate": true }
                }
            }"#,
        )
        .unwrap();

        let props = tuning
            .catalog()
            .properties(GrenadeKind::Base(BaseKind::Cluster));
        assert_eq!(props.num_cluster_fragments, 12);
        assert!(props.manual_detonate);
        // Unlisted fields come from the serde defaults, not the stock cluster
        assert_eq!(props.damage, GrenadeProperties::default().damage);
    }

    #[test]
    fn test_player_tuning_round_trip() {
        let tuning = Tuning {
            physics: PhysicsTuning::default(),
            player: PlayerTuning {
                allow_jump_out_of_control: true,
                clamp_to_world_bounds: false,
            },
            grenades: BTreeMap::new(),
        };
        let json = serde_json::to_string(&tuning).unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert!(back.player.allow_jump_out_of_control);
        assert!(!back.player.clamp_to_world_bounds);
    }

    #[test]
    fn test_partial_physics_override_keeps_other_defaults() {
        let tuning = Tuning::from_json(r#"{ "physics": { "gravity": -500.0 } }"#).unwrap();
        assert_eq!(tuning.physics.gravity, -500.0);
        assert_eq!(
            tuning.physics.bounce_damping,
            crate::consts::GRENADE_BOUNCE_DAMPING
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ nope").is_err());
    }
}
