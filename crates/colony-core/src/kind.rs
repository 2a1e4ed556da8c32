//! The closed set of building kinds.
//!
//! Every concrete building is one variant of [`BuildingKind`]. All kinds share
//! the `(colony, location)` constructor shape, so there is no load-time
//! constructor lookup that can fail for a registered kind.

use crate::building::BuildingRecord;
use crate::id::{BlockPos, ColonyId, SerializedTypeId, TriggerKey};
use crate::view::BuildingView;
use serde::{Deserialize, Serialize};

/// A concrete colony building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    Baker,
    Blacksmith,
    Builder,
    Home,
    Farmer,
    Lumberjack,
    Miner,
    Stonemason,
    TownHall,
    Deliveryman,
    Fisherman,
    GuardTower,
    Warehouse,
}

impl BuildingKind {
    /// All kinds, in stock registration order.
    pub const ALL: [BuildingKind; 13] = [
        BuildingKind::Baker,
        BuildingKind::Blacksmith,
        BuildingKind::Builder,
        BuildingKind::Home,
        BuildingKind::Farmer,
        BuildingKind::Lumberjack,
        BuildingKind::Miner,
        BuildingKind::Stonemason,
        BuildingKind::TownHall,
        BuildingKind::Deliveryman,
        BuildingKind::Fisherman,
        BuildingKind::GuardTower,
        BuildingKind::Warehouse,
    ];

    /// Highest level this kind can be upgraded to.
    pub fn max_level(self) -> u32 {
        match self {
            BuildingKind::Home => 4,
            _ => 5,
        }
    }

    /// Name of the structure blueprint used to build this kind.
    pub fn schematic_name(self) -> &'static str {
        match self {
            BuildingKind::Baker => "Baker",
            BuildingKind::Blacksmith => "Blacksmith",
            BuildingKind::Builder => "Builder",
            BuildingKind::Home => "Citizen",
            BuildingKind::Farmer => "Farmer",
            BuildingKind::Lumberjack => "Lumberjack",
            BuildingKind::Miner => "Miner",
            BuildingKind::Stonemason => "Stonemason",
            BuildingKind::TownHall => "TownHall",
            BuildingKind::Deliveryman => "Deliveryman",
            BuildingKind::Fisherman => "Fisherman",
            BuildingKind::GuardTower => "GuardTower",
            BuildingKind::Warehouse => "WareHouse",
        }
    }

    /// Stock registry name. Persisted records refer to kinds by this name.
    pub fn default_name(self) -> &'static str {
        match self {
            BuildingKind::Home => "Home",
            other => other.schematic_name(),
        }
    }

    /// Default wire tag. Explicit and stable across renames of the variant.
    /// Never reuse a retired value.
    pub fn stable_id(self) -> SerializedTypeId {
        SerializedTypeId(match self {
            BuildingKind::Baker => 0x0100,
            BuildingKind::Blacksmith => 0x0101,
            BuildingKind::Builder => 0x0102,
            BuildingKind::Home => 0x0103,
            BuildingKind::Farmer => 0x0104,
            BuildingKind::Lumberjack => 0x0105,
            BuildingKind::Miner => 0x0106,
            BuildingKind::Stonemason => 0x0107,
            BuildingKind::TownHall => 0x0108,
            BuildingKind::Deliveryman => 0x0109,
            BuildingKind::Fisherman => 0x010A,
            BuildingKind::GuardTower => 0x010B,
            BuildingKind::Warehouse => 0x010C,
        })
    }

    /// Default trigger block for this kind.
    pub fn default_trigger(self) -> TriggerKey {
        TriggerKey::new(format!("blockHut{}", self.schematic_name()))
    }

    /// Look up a kind by its variant name (as written in data files).
    pub fn from_variant_name(name: &str) -> Option<BuildingKind> {
        BuildingKind::ALL
            .into_iter()
            .find(|kind| format!("{kind:?}") == name)
    }

    /// Build a fresh server-side record of this kind.
    pub fn construct(self, colony: ColonyId, location: BlockPos) -> BuildingRecord {
        BuildingRecord::new(self, colony, location)
    }

    /// Build an empty client-side view of this kind.
    pub fn construct_view(self, colony: ColonyId, location: BlockPos) -> BuildingView {
        BuildingView::new(self, colony, location)
    }
}

impl std::fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn stable_ids_are_unique() {
        let ids: HashSet<_> = BuildingKind::ALL.iter().map(|k| k.stable_id()).collect();
        assert_eq!(ids.len(), BuildingKind::ALL.len());
    }

    #[test]
    fn default_triggers_are_unique() {
        let triggers: HashSet<_> = BuildingKind::ALL
            .iter()
            .map(|k| k.default_trigger())
            .collect();
        assert_eq!(triggers.len(), BuildingKind::ALL.len());
    }

    #[test]
    fn home_uses_citizen_schematic() {
        assert_eq!(BuildingKind::Home.schematic_name(), "Citizen");
        assert_eq!(BuildingKind::Home.default_name(), "Home");
        assert_eq!(
            BuildingKind::Home.default_trigger(),
            TriggerKey::new("blockHutCitizen")
        );
    }

    #[test]
    fn variant_name_lookup() {
        assert_eq!(
            BuildingKind::from_variant_name("Warehouse"),
            Some(BuildingKind::Warehouse)
        );
        assert_eq!(BuildingKind::from_variant_name("WareHouse"), None);
        assert_eq!(BuildingKind::from_variant_name(""), None);
    }

    #[test]
    fn construct_starts_fresh() {
        let pos = BlockPos::new(1, 2, 3);
        let record = BuildingKind::Miner.construct(ColonyId(7), pos);
        assert_eq!(record.kind(), BuildingKind::Miner);
        assert_eq!(record.location(), pos);
        assert_eq!(record.level(), 0);
        assert_eq!(record.max_level(), 5);
        assert_eq!(record.colony(), ColonyId(7));
    }

    #[test]
    fn construct_view_carries_kind() {
        let view = BuildingKind::Home.construct_view(ColonyId(1), BlockPos::default());
        assert_eq!(view.kind(), BuildingKind::Home);
        assert_eq!(view.level(), 0);
    }
}
