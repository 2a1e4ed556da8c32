use crate::id::ItemTypeId;
use crate::inventory::Container;
use serde::{Deserialize, Serialize};

/// A stack of fungible items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_type: ItemTypeId,
    pub quantity: u32,
}

impl ItemStack {
    pub fn new(item_type: ItemTypeId, quantity: u32) -> Self {
        Self {
            item_type,
            quantity,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

/// Fixed-size slot inventory, the storage behind hut blocks and chests.
///
/// Each slot holds at most one stack of at most `max_stack` items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInventory {
    slots: Vec<Option<ItemStack>>,
    max_stack: u32,
}

impl SlotInventory {
    pub fn new(slot_count: usize, max_stack: u32) -> Self {
        Self {
            slots: vec![None; slot_count],
            max_stack: max_stack.max(1),
        }
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Quantity of a specific item type across all slots.
    pub fn quantity(&self, item_type: ItemTypeId) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item_type == item_type)
            .map(|s| s.quantity)
            .sum()
    }

    /// Total items across all slots.
    pub fn total(&self) -> u32 {
        self.slots.iter().flatten().map(|s| s.quantity).sum()
    }

    /// Move as much of `stack` as fits into existing stacks of the same type,
    /// then into empty slots. Whatever does not fit stays in `stack`.
    fn merge(&mut self, stack: &mut ItemStack) {
        for slot in self.slots.iter_mut().flatten() {
            if stack.quantity == 0 {
                return;
            }
            if slot.item_type == stack.item_type && slot.quantity < self.max_stack {
                let moved = stack.quantity.min(self.max_stack - slot.quantity);
                slot.quantity += moved;
                stack.quantity -= moved;
            }
        }
        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            if stack.quantity == 0 {
                return;
            }
            let moved = stack.quantity.min(self.max_stack);
            *slot = Some(ItemStack::new(stack.item_type, moved));
            stack.quantity -= moved;
        }
    }
}

impl Container for SlotInventory {
    fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    fn insert(&mut self, stack: &mut ItemStack) -> bool {
        self.merge(stack);
        stack.is_empty()
    }

    fn force_insert(&mut self, mut stack: ItemStack) -> Result<Option<ItemStack>, ItemStack> {
        if self.slots.is_empty() {
            return Err(stack);
        }
        self.merge(&mut stack);
        if stack.is_empty() {
            return Ok(None);
        }
        // Evict the first stack of a different type; fall back to the first slot.
        // The remainder is stored whole, even past `max_stack`.
        let victim = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.item_type != stack.item_type))
            .unwrap_or(0);
        Ok(self.slots[victim].replace(stack))
    }

    fn take_all(&mut self) -> Vec<ItemStack> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}
