use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Opaque handle returned by the request manager when a need is submitted.
    pub struct RequestToken;

    /// Identifies an open work order in a colony's work manager.
    pub struct WorkOrderId;
}

/// Integer block coordinate. A building's location doubles as its identity
/// within a colony.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Identifies a colony. Buildings keep this instead of a pointer to their owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColonyId(pub u32);

/// Identifies a citizen (worker) of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CitizenId(pub u32);

/// Identifies an item type. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemTypeId(pub u32);

/// Type tag written at the front of every view frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SerializedTypeId(pub i32);

/// Identifies the block type whose placement creates a building.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerKey(pub String);

impl TriggerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_pos_orders_lexicographically() {
        let a = BlockPos::new(0, 64, 0);
        let b = BlockPos::new(0, 64, 1);
        let c = BlockPos::new(1, 0, 0);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn block_pos_offset() {
        let p = BlockPos::new(10, 64, -3);
        assert_eq!(p.offset(1, -1, 3), BlockPos::new(11, 63, 0));
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(CitizenId(1), "farmer");
        map.insert(CitizenId(2), "miner");
        assert_eq!(map[&CitizenId(1)], "farmer");
    }

    #[test]
    fn trigger_key_display() {
        let key = TriggerKey::new("blockHutBaker");
        assert_eq!(key.to_string(), "blockHutBaker");
        assert_eq!(key.as_str(), "blockHutBaker");
    }
}
