//! Server-side building records.
//!
//! A [`BuildingRecord`] is one placed building: its kind, location, level,
//! rotation, style and secondary containers, plus the index of its workers'
//! open requests. The colony owns the records; anything a record needs from
//! the colony while it mutates is passed in as a [`BuildingContext`].

use crate::dirty::DirtyTracker;
use crate::event::{Event, EventBus};
use crate::id::{BlockPos, CitizenId, ColonyId, RequestToken, TriggerKey, WorkOrderId};
use crate::inventory::{ForcedTransfer, InventoryBridge, World};
use crate::item::ItemStack;
use crate::kind::BuildingKind;
use crate::registry::TypeRegistry;
use crate::request::{RequestKind, RequestManager, RequestState, Requestable, ToolClass, ToolRequest};
use crate::request_index::RequestIndex;
use crate::serialize::{DeserializeError, PersistedBuilding, SerializeError};
use crate::view::ViewFrame;
use crate::work_order::{WorkManager, WorkOrderState};

/// Style used when none (or an empty one) is given.
pub const DEFAULT_STYLE: &str = "wooden";

/// Highest valid rotation (quarter turns).
pub const MAX_ROTATION: u8 = 3;

/// Errors raised while hydrating a record from persisted data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HydrateError {
    #[error(transparent)]
    Decode(#[from] DeserializeError),
}

/// Colony services a building needs while it mutates.
///
/// Built by the colony from its own disjoint fields, so a building can be
/// borrowed mutably alongside them.
pub struct BuildingContext<'a> {
    pub work_manager: &'a mut WorkManager,
    pub requests: &'a mut RequestManager,
    pub dirty: &'a mut DirtyTracker,
    pub events: &'a mut EventBus,
    pub world: &'a mut dyn World,
}

/// One placed colony building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingRecord {
    kind: BuildingKind,
    colony: ColonyId,
    location: BlockPos,
    level: u32,
    max_level: u32,
    rotation: u8,
    style: String,
    containers: Vec<BlockPos>,
    dirty: bool,
    requests: RequestIndex,
}

impl BuildingRecord {
    /// A fresh level-0 building. Prefer [`BuildingKind::construct`].
    pub fn new(kind: BuildingKind, colony: ColonyId, location: BlockPos) -> Self {
        Self {
            kind,
            colony,
            location,
            level: 0,
            max_level: kind.max_level(),
            rotation: 0,
            style: DEFAULT_STYLE.to_string(),
            containers: Vec::new(),
            dirty: false,
            requests: RequestIndex::new(),
        }
    }

    /// Lower the level cap below the kind's maximum (never above it). The
    /// cap is not persisted, so this only exists for fixtures.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level.min(self.kind.max_level());
        self.level = self.level.min(self.max_level);
        self
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn colony(&self) -> ColonyId {
        self.colony
    }

    /// The building's identity within its colony.
    pub fn location(&self) -> BlockPos {
        self.location
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn schematic_name(&self) -> &'static str {
        self.kind.schematic_name()
    }

    pub fn is_matching_trigger(&self, registry: &TypeRegistry, trigger: &TriggerKey) -> bool {
        registry.matches_trigger(self.kind, trigger)
    }

    // -----------------------------------------------------------------------
    // Dirty tracking and plain state
    // -----------------------------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Flag the building as changed and tell the colony.
    pub fn mark_dirty(&mut self, ctx: &mut BuildingContext<'_>) {
        self.dirty = true;
        ctx.dirty.mark_building(self.location);
    }

    /// Reset the local flag only.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Returns false (and changes nothing) if `level` exceeds the max level.
    pub fn set_level(&mut self, level: u32, ctx: &mut BuildingContext<'_>) -> bool {
        if level > self.max_level {
            tracing::debug!(
                building = %self.location,
                level,
                max = self.max_level,
                "ignoring level above max"
            );
            return false;
        }
        self.level = level;
        self.mark_dirty(ctx);
        true
    }

    pub fn set_rotation(&mut self, rotation: u8, ctx: &mut BuildingContext<'_>) -> bool {
        if rotation > MAX_ROTATION {
            return false;
        }
        self.rotation = rotation;
        self.mark_dirty(ctx);
        true
    }

    /// An empty style falls back to [`DEFAULT_STYLE`].
    pub fn set_style(&mut self, style: &str, ctx: &mut BuildingContext<'_>) {
        self.style = normalize_style(style, self.location);
        self.mark_dirty(ctx);
    }

    /// Copy of the secondary container locations, in order.
    pub fn containers(&self) -> Vec<BlockPos> {
        self.containers.clone()
    }

    /// Register a chest as secondary storage. Returns false if already listed.
    pub fn add_container(&mut self, pos: BlockPos, ctx: &mut BuildingContext<'_>) -> bool {
        if self.containers.contains(&pos) {
            return false;
        }
        self.containers.push(pos);
        self.mark_dirty(ctx);
        true
    }

    pub fn remove_container(&mut self, pos: BlockPos, ctx: &mut BuildingContext<'_>) -> bool {
        let before = self.containers.len();
        self.containers.retain(|&c| c != pos);
        if self.containers.len() == before {
            return false;
        }
        self.mark_dirty(ctx);
        true
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Decode `data` and apply it. On a decode error the record is unchanged.
    pub fn hydrate_from_persisted(&mut self, data: &[u8]) -> Result<(), HydrateError> {
        let record = PersistedBuilding::decode(data)?;
        self.apply_persisted(&record);
        Ok(())
    }

    /// Apply a persisted record.
    ///
    /// Out-of-range values are repaired rather than rejected: the level is
    /// clamped into `0..=max_level` and the rotation is wrapped into `0..=3`,
    /// each with a warning. Containers are appended in encoded order.
    pub fn apply_persisted(&mut self, record: &PersistedBuilding) {
        let level = u32::try_from(record.level).unwrap_or(0);
        if level > self.max_level {
            tracing::warn!(
                building = %self.location,
                kind = %self.kind,
                level = record.level,
                max = self.max_level,
                "persisted level above max, clamping"
            );
        }
        self.level = level.min(self.max_level);

        let rotation = record.rotation.rem_euclid(i32::from(MAX_ROTATION) + 1);
        if rotation != record.rotation {
            tracing::warn!(
                building = %self.location,
                rotation = record.rotation,
                "persisted rotation out of range, wrapping"
            );
        }
        self.rotation = u8::try_from(rotation).unwrap_or(0);

        self.style = normalize_style(&record.style, self.location);
        self.containers.extend_from_slice(&record.containers);
    }

    pub fn to_persisted(&self, registry: &TypeRegistry) -> Result<PersistedBuilding, SerializeError> {
        let type_name = registry
            .name_of(self.kind)
            .ok_or(SerializeError::UnregisteredKind(self.kind))?;
        Ok(PersistedBuilding {
            type_name: type_name.to_string(),
            location: self.location,
            level: i32::try_from(self.level).unwrap_or(i32::MAX),
            rotation: i32::from(self.rotation),
            style: self.style.clone(),
            containers: self.containers.clone(),
        })
    }

    pub fn serialize_to_persisted(&self, registry: &TypeRegistry) -> Result<Vec<u8>, SerializeError> {
        self.to_persisted(registry)?.encode()
    }

    /// Encode the client view: serialized id, level, max level, work-order level.
    pub fn serialize_to_view(
        &self,
        registry: &TypeRegistry,
        work_orders: &WorkManager,
    ) -> Result<ViewFrame, SerializeError> {
        let id = registry
            .serialized_id_of(self.kind)
            .ok_or(SerializeError::UnregisteredKind(self.kind))?;
        Ok(ViewFrame::new(
            id,
            self.level,
            self.max_level,
            self.current_work_order_level(work_orders),
        ))
    }

    // -----------------------------------------------------------------------
    // Work orders
    // -----------------------------------------------------------------------

    pub fn current_work_order_level(&self, work_orders: &WorkManager) -> u32 {
        work_orders.level_for(self.location)
    }

    pub fn has_work_order(&self, work_orders: &WorkManager) -> bool {
        work_orders.order_for(self.location).is_some()
    }

    pub fn work_order_state(&self, work_orders: &WorkManager) -> WorkOrderState {
        WorkOrderState::from_levels(self.level, self.current_work_order_level(work_orders))
    }

    /// Schedule an upgrade to `level + 1`. Ignored at max level or while an
    /// order is already open.
    pub fn request_upgrade(&mut self, ctx: &mut BuildingContext<'_>) -> Option<WorkOrderId> {
        if self.level >= self.max_level {
            return None;
        }
        self.request_work_order(self.level + 1, ctx)
    }

    /// Schedule a rebuild of the current level. Ignored at level 0 or while
    /// an order is already open.
    pub fn request_repair(&mut self, ctx: &mut BuildingContext<'_>) -> Option<WorkOrderId> {
        if self.level == 0 {
            return None;
        }
        self.request_work_order(self.level, ctx)
    }

    fn request_work_order(
        &mut self,
        target_level: u32,
        ctx: &mut BuildingContext<'_>,
    ) -> Option<WorkOrderId> {
        if ctx.work_manager.order_for(self.location).is_some() {
            return None;
        }
        let id = ctx.work_manager.add(self.location, target_level);
        ctx.events.emit(Event::WorkOrderAdded {
            building: self.location,
            target_level,
        });
        self.mark_dirty(ctx);
        Some(id)
    }

    /// Cancel the open order, if any. Returns whether one was removed.
    pub fn remove_work_order(&mut self, ctx: &mut BuildingContext<'_>) -> bool {
        let Some((id, _)) = ctx.work_manager.order_for(self.location) else {
            return false;
        };
        ctx.work_manager.remove(id);
        ctx.events.emit(Event::WorkOrderRemoved {
            building: self.location,
        });
        self.mark_dirty(ctx);
        true
    }

    /// Called after an upgrade finished and the level was set.
    pub fn on_upgrade_complete(&mut self, new_level: u32, ctx: &mut BuildingContext<'_>) {
        tracing::debug!(building = %self.location, kind = %self.kind, new_level, "upgrade complete");
        ctx.events.emit(Event::UpgradeCompleted {
            building: self.location,
            level: new_level,
        });
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Tear the building down: run [`on_destroyed`](Self::on_destroyed), drop
    /// the hut contents into the world, then detach from the colony. Returns
    /// the number of stacks dropped.
    pub fn destroy(mut self, ctx: &mut BuildingContext<'_>) -> usize {
        self.on_destroyed(ctx);
        let dropped = self.inventory_bridge().drop_primary_contents(ctx.world);
        if dropped > 0 {
            ctx.events.emit(Event::ItemsDropped {
                building: self.location,
                stacks: dropped,
            });
        }
        ctx.dirty.forget(self.location);
        ctx.dirty.mark_roster();
        ctx.events.emit(Event::BuildingRemoved {
            building: self.location,
            kind: self.kind,
        });
        dropped
    }

    /// Teardown hook: withdraw open requests from the manager and cancel the
    /// open work order.
    pub fn on_destroyed(&mut self, ctx: &mut BuildingContext<'_>) {
        for token in self.requests.clear() {
            ctx.requests.remove(token);
        }
        self.remove_work_order(ctx);
    }

    // -----------------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------------

    pub fn requests(&self) -> &RequestIndex {
        &self.requests
    }

    /// Submit a worker's need to the colony and track the returned token.
    pub fn create_request(
        &mut self,
        worker: CitizenId,
        payload: Requestable,
        ctx: &mut BuildingContext<'_>,
    ) -> RequestToken {
        let kind = payload.kind();
        let token = ctx.requests.create_and_assign(self.location, worker, payload);
        self.requests.insert(kind, token, worker);
        token
    }

    /// The manager fulfilled or cancelled `token`. Returns whether it was tracked.
    pub fn on_request_resolved(&mut self, token: RequestToken) -> bool {
        self.requests.remove(token).is_some()
    }

    /// A worker left the building: withdraw their requests from the index and
    /// the manager.
    pub fn remove_citizen(&mut self, worker: CitizenId, ctx: &mut BuildingContext<'_>) -> usize {
        let tokens = self.requests.remove_worker(worker);
        for &token in &tokens {
            ctx.requests.remove(token);
        }
        tokens.len()
    }

    /// True iff the worker has no tracked requests. See
    /// [`RequestIndex::has_worker_open_requests`].
    pub fn has_worker_open_requests(&self, worker: CitizenId) -> bool {
        self.requests.has_worker_open_requests(worker)
    }

    /// First delivered but unpicked stack for `worker`.
    pub fn first_unpicked_delivery(
        &self,
        worker: CitizenId,
        requests: &RequestManager,
    ) -> Option<ItemStack> {
        if !self.has_worker_open_requests(worker) {
            return None;
        }
        self.requests
            .tokens_of_worker(worker)
            .iter()
            .filter_map(|&token| requests.get(token))
            .filter(|r| r.state == RequestState::Completed)
            .find_map(|r| r.stack().cloned())
    }

    pub fn needs_anything(&self) -> bool {
        !self.requests.is_empty()
    }

    pub fn are_items_needed(&self) -> bool {
        self.requests.has_kind(RequestKind::Stack)
    }

    /// The first open tool request of `class`.
    pub fn requested_tool(&self, class: ToolClass, requests: &RequestManager) -> Option<ToolRequest> {
        self.requests
            .tokens_of_kind(RequestKind::Tool)
            .iter()
            .filter_map(|&token| requests.get(token))
            .filter_map(|r| r.tool())
            .find(|tool| tool.class == class)
            .copied()
    }

    pub fn requires_tool(&self, class: ToolClass, requests: &RequestManager) -> bool {
        self.requested_tool(class, requests).is_some()
    }

    /// The most urgent tool class with an open request.
    pub fn required_tool(&self, requests: &RequestManager) -> Option<ToolClass> {
        ToolClass::PRIORITY
            .into_iter()
            .find(|&class| self.requires_tool(class, requests))
    }

    pub fn needs_hoe(&self, requests: &RequestManager) -> bool {
        self.requires_tool(ToolClass::Hoe, requests)
    }

    pub fn needs_axe(&self, requests: &RequestManager) -> bool {
        self.requires_tool(ToolClass::Axe, requests)
    }

    pub fn needs_pickaxe(&self, requests: &RequestManager) -> bool {
        self.requires_tool(ToolClass::Pickaxe, requests)
    }

    pub fn needs_shovel(&self, requests: &RequestManager) -> bool {
        self.requires_tool(ToolClass::Shovel, requests)
    }

    pub fn needs_weapon(&self, requests: &RequestManager) -> bool {
        self.requires_tool(ToolClass::Weapon, requests)
    }

    /// Minimum level of the open pickaxe request, if there is one.
    pub fn needed_pickaxe_level(&self, requests: &RequestManager) -> Option<u32> {
        self.requested_tool(ToolClass::Pickaxe, requests)
            .map(|tool| tool.min_level)
    }

    // -----------------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------------

    pub fn inventory_bridge(&self) -> InventoryBridge<'_> {
        InventoryBridge::new(self.location, &self.containers)
    }

    pub fn transfer_stack(&self, stack: &mut ItemStack, world: &mut dyn World) -> bool {
        self.inventory_bridge().transfer_stack(stack, world)
    }

    pub fn force_transfer_stack(&self, stack: ItemStack, world: &mut dyn World) -> ForcedTransfer {
        self.inventory_bridge().force_transfer_stack(stack, world)
    }
}

fn normalize_style(style: &str, location: BlockPos) -> String {
    if style.is_empty() {
        tracing::warn!(building = %location, "empty style, using '{}'", DEFAULT_STYLE);
        DEFAULT_STYLE.to_string()
    } else {
        style.to_string()
    }
}
