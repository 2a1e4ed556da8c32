//! The colony host.
//!
//! A [`Colony`] owns its buildings (keyed by location) together with the
//! collaborators they talk to: work orders, requests, dirty tracking, events
//! and the world. Building operations that touch those collaborators go
//! through [`Colony::with_building`], which lends the building and a
//! [`BuildingContext`] side by side.

use crate::building::{BuildingContext, BuildingRecord};
use crate::dirty::DirtyTracker;
use crate::event::{Event, EventBus};
use crate::factory::{BuildingFactory, TriggerPlacement};
use crate::id::{BlockPos, ColonyId, RequestToken, TriggerKey, WorkOrderId};
use crate::inventory::World;
use crate::registry::TypeRegistry;
use crate::request::{RequestManager, RequestState};
use crate::serialize::{
    ColonySaveHeader, DeserializeError, PersistedColony, SerializeError,
};
use crate::view::ViewFrame;
use crate::work_order::{NO_WORK_ORDER, WorkManager};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColonyError {
    #[error("a building already stands at {0}")]
    Occupied(BlockPos),
    #[error("no building at {0}")]
    NoBuilding(BlockPos),
    #[error("no building type registered for trigger '{0}'")]
    UnknownTrigger(TriggerKey),
    #[error("unknown work order")]
    UnknownWorkOrder,
    #[error("work order for {building} targets level {target}, above max level {max}")]
    LevelAboveMax {
        building: BlockPos,
        target: u32,
        max: u32,
    },
}

pub struct Colony<W: World> {
    id: ColonyId,
    buildings: BTreeMap<BlockPos, BuildingRecord>,
    work_manager: WorkManager,
    requests: RequestManager,
    dirty: DirtyTracker,
    events: EventBus,
    world: W,
}

impl<W: World> Colony<W> {
    pub fn new(id: ColonyId, world: W) -> Self {
        Self {
            id,
            buildings: BTreeMap::new(),
            work_manager: WorkManager::new(),
            requests: RequestManager::new(),
            dirty: DirtyTracker::new(),
            events: EventBus::default(),
            world,
        }
    }

    /// Restore a colony from a save. Buildings that fail to restore are
    /// skipped (and logged by the factory); work orders for them are dropped.
    pub fn load(
        factory: &BuildingFactory<'_>,
        data: &[u8],
        world: W,
    ) -> Result<Self, DeserializeError> {
        let saved = PersistedColony::decode(data)?;
        let mut colony = Colony::new(saved.header.colony, world);
        for blob in &saved.buildings {
            if let Some(building) = factory.create_from_persisted(colony.id, blob) {
                colony.buildings.insert(building.location(), building);
            }
        }
        for order in saved.work_orders {
            colony.restore_work_order(order.building, order.target_level);
        }
        tracing::debug!(
            colony = colony.id.0,
            buildings = colony.buildings.len(),
            skipped = saved.buildings.len() - colony.buildings.len(),
            "colony loaded"
        );
        Ok(colony)
    }

    /// Re-open a saved order unless it has no building, duplicates another
    /// order, or targets a level the building cannot reach.
    fn restore_work_order(&mut self, building: BlockPos, target_level: u32) {
        let Some(record) = self.buildings.get(&building) else {
            tracing::warn!(building = %building, "dropping orphaned work order");
            return;
        };
        if self.work_manager.order_for(building).is_some() {
            tracing::warn!(building = %building, "dropping duplicate work order");
            return;
        }
        if target_level == NO_WORK_ORDER || target_level > record.max_level() {
            tracing::warn!(
                building = %building,
                target_level,
                max = record.max_level(),
                "dropping work order with unreachable target level"
            );
            return;
        }
        self.work_manager.add(building, target_level);
    }

    /// Encode every building and open work order. Any unregistered kind
    /// aborts the save.
    pub fn save(&self, registry: &TypeRegistry) -> Result<Vec<u8>, SerializeError> {
        let buildings = self
            .buildings
            .values()
            .map(|b| b.serialize_to_persisted(registry))
            .collect::<Result<Vec<_>, _>>()?;
        let work_orders = self.work_manager.iter().map(|(_, o)| o.clone()).collect();
        PersistedColony {
            header: ColonySaveHeader::new(self.id),
            buildings,
            work_orders,
        }
        .encode()
    }

    pub fn id(&self) -> ColonyId {
        self.id
    }

    // -----------------------------------------------------------------------
    // Buildings
    // -----------------------------------------------------------------------

    /// Create a building for a placed trigger block.
    pub fn place(
        &mut self,
        factory: &BuildingFactory<'_>,
        placement: &TriggerPlacement,
    ) -> Result<BlockPos, ColonyError> {
        if self.buildings.contains_key(&placement.location) {
            return Err(ColonyError::Occupied(placement.location));
        }
        let building = factory
            .create_from_trigger(self.id, placement)
            .ok_or_else(|| ColonyError::UnknownTrigger(placement.trigger.clone()))?;
        let pos = building.location();
        self.events.emit(Event::BuildingPlaced {
            building: pos,
            kind: building.kind(),
        });
        self.buildings.insert(pos, building);
        self.dirty.mark_roster();
        self.dirty.mark_building(pos);
        Ok(pos)
    }

    /// Tear down the building at `pos`. Returns the number of stacks dropped.
    pub fn destroy_building(&mut self, pos: BlockPos) -> Result<usize, ColonyError> {
        let building = self
            .buildings
            .remove(&pos)
            .ok_or(ColonyError::NoBuilding(pos))?;
        let mut ctx = BuildingContext {
            work_manager: &mut self.work_manager,
            requests: &mut self.requests,
            dirty: &mut self.dirty,
            events: &mut self.events,
            world: &mut self.world,
        };
        Ok(building.destroy(&mut ctx))
    }

    /// Run `f` on the building at `pos` with access to the colony's services.
    pub fn with_building<R>(
        &mut self,
        pos: BlockPos,
        f: impl FnOnce(&mut BuildingRecord, &mut BuildingContext<'_>) -> R,
    ) -> Option<R> {
        let (building, mut ctx) = self.split(pos)?;
        Some(f(building, &mut ctx))
    }

    fn split(&mut self, pos: BlockPos) -> Option<(&mut BuildingRecord, BuildingContext<'_>)> {
        let building = self.buildings.get_mut(&pos)?;
        let ctx = BuildingContext {
            work_manager: &mut self.work_manager,
            requests: &mut self.requests,
            dirty: &mut self.dirty,
            events: &mut self.events,
            world: &mut self.world,
        };
        Some((building, ctx))
    }

    pub fn building(&self, pos: BlockPos) -> Option<&BuildingRecord> {
        self.buildings.get(&pos)
    }

    /// Buildings in location order.
    pub fn buildings(&self) -> impl Iterator<Item = &BuildingRecord> {
        self.buildings.values()
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    /// View frames for every building, for replication to clients.
    pub fn view_frames(
        &self,
        registry: &TypeRegistry,
    ) -> Result<Vec<(BlockPos, ViewFrame)>, SerializeError> {
        self.buildings
            .values()
            .map(|b| Ok((b.location(), b.serialize_to_view(registry, &self.work_manager)?)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Work orders and requests
    // -----------------------------------------------------------------------

    /// Finish a work order: remove it, set the building's level and run the
    /// building's upgrade hook. Returns the new level.
    ///
    /// An order whose target exceeds the building's max level is removed
    /// without touching the building or running the hook.
    pub fn complete_work_order(&mut self, id: WorkOrderId) -> Result<u32, ColonyError> {
        let order = self
            .work_manager
            .remove(id)
            .ok_or(ColonyError::UnknownWorkOrder)?;
        let (building, mut ctx) = self
            .split(order.building)
            .ok_or(ColonyError::NoBuilding(order.building))?;
        if !building.set_level(order.target_level, &mut ctx) {
            return Err(ColonyError::LevelAboveMax {
                building: order.building,
                target: order.target_level,
                max: building.max_level(),
            });
        }
        building.on_upgrade_complete(order.target_level, &mut ctx);
        Ok(building.level())
    }

    /// Move a request to `state`. Received or cancelled requests are dropped
    /// from the owning building's index and from the manager.
    pub fn resolve_request(&mut self, token: RequestToken, state: RequestState) -> bool {
        if !self.requests.set_state(token, state) {
            return false;
        }
        if !state.is_resolved() {
            return true;
        }
        let owner = self.requests.remove(token).map(|r| r.building);
        if let Some(building) = owner.and_then(|pos| self.buildings.get_mut(&pos)) {
            building.on_request_resolved(token);
        }
        true
    }

    pub fn work_manager(&self) -> &WorkManager {
        &self.work_manager
    }

    pub fn requests(&self) -> &RequestManager {
        &self.requests
    }

    // -----------------------------------------------------------------------
    // Dirty tracking, events, world
    // -----------------------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn dirty(&self) -> &DirtyTracker {
        &self.dirty
    }

    /// Reset the colony aggregate and every building's flag, e.g. after a save.
    pub fn clear_dirty(&mut self) {
        self.dirty.mark_clean();
        for building in self.buildings.values_mut() {
            building.clear_dirty();
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }
}
