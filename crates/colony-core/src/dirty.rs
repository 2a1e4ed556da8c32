use crate::id::BlockPos;
use std::collections::BTreeSet;

/// Tracks which buildings have changed since the colony last persisted.
///
/// Buildings keep their own dirty flag; this is the colony-side aggregate
/// that lets a save skip untouched colonies. Call
/// [`mark_clean`](DirtyTracker::mark_clean) after the save.
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_buildings: BTreeSet<BlockPos>,
    /// Set when a building is added or removed.
    roster_dirty: bool,
    any_dirty: bool,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_building(&mut self, building: BlockPos) {
        self.dirty_buildings.insert(building);
        self.any_dirty = true;
    }

    /// Mark the colony's building set as changed (placement or removal).
    pub fn mark_roster(&mut self) {
        self.roster_dirty = true;
        self.any_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.any_dirty
    }

    pub fn is_building_dirty(&self, building: BlockPos) -> bool {
        self.dirty_buildings.contains(&building)
    }

    pub fn is_roster_dirty(&self) -> bool {
        self.roster_dirty
    }

    /// Dirty buildings in location order.
    pub fn dirty_buildings(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.dirty_buildings.iter().copied()
    }

    /// Forget a building, e.g. after it was destroyed.
    pub fn forget(&mut self, building: BlockPos) {
        self.dirty_buildings.remove(&building);
    }

    pub fn mark_clean(&mut self) {
        self.dirty_buildings.clear();
        self.roster_dirty = false;
        self.any_dirty = false;
    }
}
