//! Grenade kinds and their immutable property sets

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRENADE_GRAVITY;

/// Base grenade flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseKind {
    Standard,
    Cluster,
    ClusterFragment,
    Inertia,
    Teleport,
}

impl BaseKind {
    pub const ALL: [BaseKind; 5] = [
        BaseKind::Standard,
        BaseKind::Cluster,
        BaseKind::ClusterFragment,
        BaseKind::Inertia,
        BaseKind::Teleport,
    ];
}

/// A grenade kind: a base flavor, or an ordered pair of them.
///
/// Composites take their ballistic numbers from the primary flavor and fold
/// in the secondary's behavior flags and fragment count, so `Combo(Cluster,
/// Teleport)` flies like a cluster grenade but also teleports its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrenadeKind {
    Base(BaseKind),
    Combo(BaseKind, BaseKind),
}

/// Per-kind immutable behavior block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrenadeProperties {
    /// Seconds until a timed detonation; 0 disables the timer
    pub lifetime: f32,
    pub knockback: f32,
    pub damage: f32,
    /// Blast radius; 0 marks a cosmetic detonation with no terrain or
    /// camera feedback
    pub radius: f32,
    pub terrain_damage_modifier: f32,
    pub terrain_wobble_modifier: f32,

    pub manual_detonate: bool,
    pub detonate_on_land: bool,
    pub detonate_on_player_hit: bool,
    pub bounce_on_player_hit: bool,
    pub slow_before_detonate: bool,
    pub num_cluster_fragments: u32,
    pub spawn_inertia_zone: bool,
    pub teleport_player_on_detonate: bool,
    pub detonate_on_death: bool,
}

impl Default for GrenadeProperties {
    fn default() -> Self {
        Self {
            lifetime: 3.0,
            knockback: 800.0,
            damage: 140.0,
            radius: 140.0,
            terrain_damage_modifier: 1.0,
            terrain_wobble_modifier: 1.0,
            manual_detonate: false,
            detonate_on_land: false,
            detonate_on_player_hit: false,
            bounce_on_player_hit: false,
            slow_before_detonate: false,
            num_cluster_fragments: 0,
            spawn_inertia_zone: false,
            teleport_player_on_detonate: false,
            detonate_on_death: false,
        }
    }
}

impl GrenadeProperties {
    /// Composite semantics: ballistics from self (the primary), behavior
    /// flags OR-ed in from the secondary, fragment counts summed.
    fn merged_with(&self, secondary: &GrenadeProperties) -> GrenadeProperties {
        GrenadeProperties {
            manual_detonate: self.manual_detonate || secondary.manual_detonate,
            detonate_on_land: self.detonate_on_land || secondary.detonate_on_land,
            detonate_on_player_hit: self.detonate_on_player_hit
                || secondary.detonate_on_player_hit,
            bounce_on_player_hit: self.bounce_on_player_hit || secondary.bounce_on_player_hit,
            slow_before_detonate: self.slow_before_detonate || secondary.slow_before_detonate,
            num_cluster_fragments: self.num_cluster_fragments + secondary.num_cluster_fragments,
            spawn_inertia_zone: self.spawn_inertia_zone || secondary.spawn_inertia_zone,
            teleport_player_on_detonate: self.teleport_player_on_detonate
                || secondary.teleport_player_on_detonate,
            detonate_on_death: self.detonate_on_death || secondary.detonate_on_death,
            ..*self
        }
    }
}

/// Registry of per-kind property sets, validated at registration time.
///
/// A kind with no registered properties is a programming error: lookups
/// fail loudly instead of silently defaulting.
#[derive(Debug, Clone, Default)]
pub struct GrenadeCatalog {
    base: BTreeMap<BaseKind, GrenadeProperties>,
}

impl GrenadeCatalog {
    /// Empty catalog; callers register every kind themselves
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the stock balance for every base kind
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        catalog.register(
            BaseKind::Standard,
            GrenadeProperties {
                manual_detonate: true,
                bounce_on_player_hit: true,
                ..Default::default()
            },
        );
        catalog.register(
            BaseKind::Cluster,
            GrenadeProperties {
                damage: 90.0,
                radius: 100.0,
                manual_detonate: true,
                num_cluster_fragments: 6,
                ..Default::default()
            },
        );
        catalog.register(
            BaseKind::ClusterFragment,
            GrenadeProperties {
                lifetime: 1.2,
                knockback: 300.0,
                damage: 40.0,
                radius: 50.0,
                terrain_wobble_modifier: 0.5,
                detonate_on_land: true,
                ..Default::default()
            },
        );
        catalog.register(
            BaseKind::Inertia,
            GrenadeProperties {
                lifetime: 2.5,
                knockback: 0.0,
                damage: 0.0,
                radius: 0.0,
                detonate_on_land: true,
                slow_before_detonate: true,
                spawn_inertia_zone: true,
                ..Default::default()
            },
        );
        catalog.register(
            BaseKind::Teleport,
            GrenadeProperties {
                lifetime: 5.0,
                knockback: 0.0,
                damage: 0.0,
                radius: 0.0,
                manual_detonate: true,
                detonate_on_land: true,
                teleport_player_on_detonate: true,
                detonate_on_death: true,
                ..Default::default()
            },
        );

        catalog
    }

    /// Register (or override) the property set for a base kind.
    ///
    /// Panics on malformed configuration; this runs at construction time,
    /// never during a tick.
    pub fn register(&mut self, kind: BaseKind, props: GrenadeProperties) {
        // Fragments terminate the spawn cascade by construction
        assert!(
            !(kind == BaseKind::ClusterFragment && props.num_cluster_fragments > 0),
            "cluster fragments must not spawn further fragments"
        );
        assert!(
            props.lifetime >= 0.0 && props.radius >= 0.0,
            "grenade kind {kind:?} has negative lifetime or radius"
        );

        self.base.insert(kind, props);
    }

    /// Resolved properties for a kind. Panics if a base flavor involved was
    /// never registered.
    pub fn properties(&self, kind: GrenadeKind) -> GrenadeProperties {
        match kind {
            GrenadeKind::Base(b) => self.base_properties(b),
            GrenadeKind::Combo(primary, secondary) => self
                .base_properties(primary)
                .merged_with(&self.base_properties(secondary)),
        }
    }

    fn base_properties(&self, kind: BaseKind) -> GrenadeProperties {
        match self.base.get(&kind) {
            Some(props) => *props,
            None => panic!("no property set registered for grenade kind {kind:?}"),
        }
    }
}

/// A live or pending grenade
#[derive(Debug, Clone)]
pub struct Grenade {
    pub kind: GrenadeKind,
    /// Owning player; unset while the grenade sits in the spawn queue
    /// without an assigned shooter
    pub owner: Option<u32>,
    pub age: f32,
    /// Time dilation from inertia zones and pre-detonation slowdown
    pub local_timescale: f32,

    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,

    pub properties: GrenadeProperties,

    // Per-step dirty flags
    pub just_bounced: bool,
    pub awaiting_removal: bool,
    pub just_collided_with_player: Option<u32>,
}

impl Grenade {
    pub fn new(kind: GrenadeKind, catalog: &GrenadeCatalog) -> Self {
        Self {
            kind,
            owner: None,
            age: 0.0,
            local_timescale: 1.0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::new(0.0, GRENADE_GRAVITY),
            properties: catalog.properties(kind),
            just_bounced: false,
            awaiting_removal: false,
            just_collided_with_player: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_covers_all_base_kinds() {
        let catalog = GrenadeCatalog::standard();
        for kind in BaseKind::ALL {
            // Must not panic
            let _ = catalog.properties(GrenadeKind::Base(kind));
        }
    }

    #[test]
    fn test_combo_takes_primary_ballistics_and_merges_behavior() {
        let catalog = GrenadeCatalog::standard();
        let cluster = catalog.properties(GrenadeKind::Base(BaseKind::Cluster));
        let combo = catalog.properties(GrenadeKind::Combo(BaseKind::Cluster, BaseKind::Teleport));

        assert_eq!(combo.damage, cluster.damage);
        assert_eq!(combo.radius, cluster.radius);
        assert_eq!(combo.lifetime, cluster.lifetime);
        assert_eq!(combo.num_cluster_fragments, cluster.num_cluster_fragments);
        assert!(combo.teleport_player_on_detonate);
        assert!(combo.detonate_on_land);
    }

    #[test]
    fn test_combo_sums_fragment_counts() {
        let mut catalog = GrenadeCatalog::standard();
        catalog.register(
            BaseKind::Standard,
            GrenadeProperties {
                num_cluster_fragments: 2,
                ..Default::default()
            },
        );
        let combo = catalog.properties(GrenadeKind::Combo(BaseKind::Cluster, BaseKind::Standard));
        assert_eq!(combo.num_cluster_fragments, 8);
    }

    #[test]
    #[should_panic(expected = "must not spawn further fragments")]
    fn test_recursive_fragment_rejected_at_registration() {
        let mut catalog = GrenadeCatalog::standard();
        catalog.register(
            BaseKind::ClusterFragment,
            GrenadeProperties {
                num_cluster_fragments: 3,
                ..Default::default()
            },
        );
    }

    #[test]
    #[should_panic(expected = "no property set registered")]
    fn test_unregistered_kind_fails_loudly() {
        let catalog = GrenadeCatalog::new();
        let _ = catalog.properties(GrenadeKind::Base(BaseKind::Standard));
    }

    #[test]
    fn test_new_grenade_starts_pending_defaults() {
        let catalog = GrenadeCatalog::standard();
        let g = Grenade::new(GrenadeKind::Base(BaseKind::Standard), &catalog);
        assert!(g.owner.is_none());
        assert_eq!(g.age, 0.0);
        assert_eq!(g.local_timescale, 1.0);
        assert!(!g.awaiting_removal);
        assert_eq!(g.acceleration.y, GRENADE_GRAVITY);
    }
}
