use crate::id::{BlockPos, WorkOrderId};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Work-order level reported when a building has no open order.
pub const NO_WORK_ORDER: u32 = 0;

/// An upgrade or repair job for one building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub building: BlockPos,
    /// Level the building will have once the job completes.
    pub target_level: u32,
}

/// Per-building work-order state, derived from the colony's open orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrderState {
    None,
    Upgrading(u32),
    Repairing,
}

impl WorkOrderState {
    /// Classify an order level against the building's current level.
    pub fn from_levels(current_level: u32, order_level: u32) -> Self {
        if order_level == NO_WORK_ORDER {
            WorkOrderState::None
        } else if order_level > current_level {
            WorkOrderState::Upgrading(order_level)
        } else {
            WorkOrderState::Repairing
        }
    }
}

/// The colony's set of open work orders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkManager {
    orders: SlotMap<WorkOrderId, WorkOrder>,
}

impl WorkManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new order. Callers enforce the one-order-per-building rule.
    pub fn add(&mut self, building: BlockPos, target_level: u32) -> WorkOrderId {
        self.orders.insert(WorkOrder {
            building,
            target_level,
        })
    }

    pub fn remove(&mut self, id: WorkOrderId) -> Option<WorkOrder> {
        self.orders.remove(id)
    }

    pub fn get(&self, id: WorkOrderId) -> Option<&WorkOrder> {
        self.orders.get(id)
    }

    /// The open order for the building at `building`, if any.
    pub fn order_for(&self, building: BlockPos) -> Option<(WorkOrderId, &WorkOrder)> {
        self.orders.iter().find(|(_, o)| o.building == building)
    }

    /// Target level of the building's open order, or [`NO_WORK_ORDER`].
    pub fn level_for(&self, building: BlockPos) -> u32 {
        self.order_for(building)
            .map(|(_, o)| o.target_level)
            .unwrap_or(NO_WORK_ORDER)
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkOrderId, &WorkOrder)> {
        self.orders.iter()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
