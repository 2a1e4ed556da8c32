//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so the in-memory
//! world and fixtures are available to other crates' tests through the
//! `test-utils` feature.

use crate::building::BuildingContext;
use crate::dirty::DirtyTracker;
use crate::event::EventBus;
use crate::id::{BlockPos, ItemTypeId};
use crate::inventory::{Container, World};
use crate::item::{ItemStack, SlotInventory};
use crate::registry::TypeRegistry;
use crate::request::RequestManager;
use crate::serialize::PersistedBuilding;
use crate::work_order::WorkManager;
use std::collections::{BTreeMap, HashMap};

// ===========================================================================
// Items
// ===========================================================================

pub const MAX_STACK: u32 = 64;

pub fn iron() -> ItemTypeId {
    ItemTypeId(0)
}
pub fn wheat() -> ItemTypeId {
    ItemTypeId(1)
}
pub fn bread() -> ItemTypeId {
    ItemTypeId(4)
}

/// Item used to pad containers in tests. Never used as a real payload.
pub fn rubble() -> ItemTypeId {
    ItemTypeId(u32::MAX)
}

// ===========================================================================
// Registry
// ===========================================================================

pub fn standard_registry() -> TypeRegistry {
    TypeRegistry::standard().expect("stock kinds register cleanly")
}

/// A persisted record with default rotation and no containers.
pub fn persisted(type_name: &str, location: BlockPos, level: i32) -> PersistedBuilding {
    PersistedBuilding {
        type_name: type_name.to_string(),
        location,
        level,
        rotation: 0,
        style: "wooden".to_string(),
        containers: Vec::new(),
    }
}

// ===========================================================================
// In-memory world
// ===========================================================================

/// A world with hut and chest inventories at fixed positions.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    huts: HashMap<BlockPos, SlotInventory>,
    chests: HashMap<BlockPos, SlotInventory>,
    dropped: BTreeMap<BlockPos, Vec<ItemStack>>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place_hut(&mut self, pos: BlockPos, slots: usize) {
        self.huts.insert(pos, SlotInventory::new(slots, MAX_STACK));
    }

    pub fn place_chest(&mut self, pos: BlockPos, slots: usize) {
        self.chests.insert(pos, SlotInventory::new(slots, MAX_STACK));
    }

    /// Pad every slot of the hut at `pos` with rubble.
    pub fn fill_hut(&mut self, pos: BlockPos) {
        if let Some(inv) = self.huts.get_mut(&pos) {
            fill(inv);
        }
    }

    pub fn fill_chest(&mut self, pos: BlockPos) {
        if let Some(inv) = self.chests.get_mut(&pos) {
            fill(inv);
        }
    }

    pub fn hut(&self, pos: BlockPos) -> Option<&SlotInventory> {
        self.huts.get(&pos)
    }

    pub fn chest_inventory(&self, pos: BlockPos) -> Option<&SlotInventory> {
        self.chests.get(&pos)
    }

    /// Stacks dropped at `pos`, in drop order.
    pub fn dropped_at(&self, pos: BlockPos) -> Vec<ItemStack> {
        self.dropped.get(&pos).cloned().unwrap_or_default()
    }
}

fn fill(inv: &mut SlotInventory) {
    let capacity = u32::try_from(inv.slot_count())
        .unwrap_or(u32::MAX)
        .saturating_mul(MAX_STACK);
    let mut padding = ItemStack::new(rubble(), capacity);
    let _ = inv.insert(&mut padding);
}

impl World for MemoryWorld {
    fn hut_inventory(&mut self, pos: BlockPos) -> Option<&mut dyn Container> {
        self.huts.get_mut(&pos).map(|inv| inv as &mut dyn Container)
    }

    fn chest(&mut self, pos: BlockPos) -> Option<&mut dyn Container> {
        self.chests.get_mut(&pos).map(|inv| inv as &mut dyn Container)
    }

    fn drop_items(&mut self, pos: BlockPos, stacks: Vec<ItemStack>) {
        self.dropped.entry(pos).or_default().extend(stacks);
    }
}

// ===========================================================================
// Building context harness
// ===========================================================================

/// Owns every colony collaborator so a lone building can be exercised
/// without a colony.
#[derive(Debug, Default)]
pub struct Harness {
    pub work_manager: WorkManager,
    pub requests: RequestManager,
    pub dirty: DirtyTracker,
    pub events: EventBus,
    pub world: MemoryWorld,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctx(&mut self) -> BuildingContext<'_> {
        BuildingContext {
            work_manager: &mut self.work_manager,
            requests: &mut self.requests,
            dirty: &mut self.dirty,
            events: &mut self.events,
            world: &mut self.world,
        }
    }
}
