//! Item transfer into a building's storage.
//!
//! A building stores items in its own hut block (the primary container) and
//! in any number of chests registered as secondary containers. The host world
//! owns the actual storage; this module only decides which container receives
//! a stack and hands the mutation to the [`Container`] implementation.

use crate::id::BlockPos;
use crate::item::ItemStack;

/// Storage behind a block. Implemented by the host (or [`crate::item::SlotInventory`]).
pub trait Container {
    /// True when no empty slot is left.
    fn is_full(&self) -> bool;

    /// Insert as much of `stack` as fits; the remainder stays in `stack`.
    /// Returns true if the whole stack was stored.
    fn insert(&mut self, stack: &mut ItemStack) -> bool;

    /// Store `stack`, displacing existing contents if needed. Returns the
    /// displaced stack, if any, or hands `stack` back as `Err` when the
    /// container cannot hold anything at all.
    fn force_insert(&mut self, stack: ItemStack) -> Result<Option<ItemStack>, ItemStack>;

    /// Remove and return every stored stack.
    fn take_all(&mut self) -> Vec<ItemStack>;
}

/// The part of the host world the building core talks to.
pub trait World {
    /// Storage of the hut block at `pos`, if its block entity is present.
    fn hut_inventory(&mut self, pos: BlockPos) -> Option<&mut dyn Container>;

    /// Chest at `pos`. `None` if the block there is not a chest.
    fn chest(&mut self, pos: BlockPos) -> Option<&mut dyn Container>;

    /// Spill stacks into the world at `pos`.
    fn drop_items(&mut self, pos: BlockPos, stacks: Vec<ItemStack>);
}

/// Where a transfer ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTarget {
    Primary,
    Secondary(BlockPos),
}

/// Result of [`InventoryBridge::force_transfer_stack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForcedTransfer {
    /// Stored without displacing anything.
    Stored,
    /// Stored; this stack was pushed out to make room.
    Evicted(ItemStack),
    /// No container was available; the stack is handed back.
    NoTarget(ItemStack),
}

impl ForcedTransfer {
    /// The displaced stack, if the transfer evicted one.
    pub fn evicted(self) -> Option<ItemStack> {
        match self {
            ForcedTransfer::Evicted(stack) => Some(stack),
            _ => None,
        }
    }
}

/// Routes stacks into a building's primary and secondary containers.
#[derive(Debug, Clone, Copy)]
pub struct InventoryBridge<'a> {
    location: BlockPos,
    containers: &'a [BlockPos],
}

impl<'a> InventoryBridge<'a> {
    pub fn new(location: BlockPos, containers: &'a [BlockPos]) -> Self {
        Self {
            location,
            containers,
        }
    }

    /// Pick the container a stack should go to: the primary unless it is
    /// absent or full, then the first non-full chest in list order.
    pub fn select_target(&self, world: &mut dyn World) -> Option<TransferTarget> {
        let primary_open = world
            .hut_inventory(self.location)
            .is_some_and(|c| !c.is_full());
        if primary_open {
            return Some(TransferTarget::Primary);
        }
        self.containers
            .iter()
            .copied()
            .find(|&pos| world.chest(pos).is_some_and(|c| !c.is_full()))
            .map(TransferTarget::Secondary)
    }

    /// Try to store `stack`. Returns false if no container accepts it; in
    /// that case `stack` is untouched.
    pub fn transfer_stack(&self, stack: &mut ItemStack, world: &mut dyn World) -> bool {
        let Some(target) = self.select_target(world) else {
            return false;
        };
        self.container(target, world)
            .is_some_and(|container| container.insert(stack))
    }

    /// Store `stack`, displacing existing contents if necessary. When every
    /// candidate is full the primary container takes the stack by force.
    pub fn force_transfer_stack(&self, stack: ItemStack, world: &mut dyn World) -> ForcedTransfer {
        let target = match self.select_target(world) {
            Some(target) => target,
            None if world.hut_inventory(self.location).is_some() => TransferTarget::Primary,
            None => return ForcedTransfer::NoTarget(stack),
        };
        match self.container(target, world) {
            Some(container) => match container.force_insert(stack) {
                Ok(Some(evicted)) => ForcedTransfer::Evicted(evicted),
                Ok(None) => ForcedTransfer::Stored,
                Err(refused) => ForcedTransfer::NoTarget(refused),
            },
            None => ForcedTransfer::NoTarget(stack),
        }
    }

    /// Empty the primary container into the world at the building location.
    /// Returns the number of stacks dropped.
    pub fn drop_primary_contents(&self, world: &mut dyn World) -> usize {
        let stacks = world
            .hut_inventory(self.location)
            .map(|c| c.take_all())
            .unwrap_or_default();
        let count = stacks.len();
        if count > 0 {
            world.drop_items(self.location, stacks);
        }
        count
    }

    fn container<'w>(
        &self,
        target: TransferTarget,
        world: &'w mut dyn World,
    ) -> Option<&'w mut dyn Container> {
        match target {
            TransferTarget::Primary => world.hut_inventory(self.location),
            TransferTarget::Secondary(pos) => world.chest(pos),
        }
    }
}
