//! Building construction from persisted data, trigger placements and view frames.
//!
//! Every entry point returns `None` on failure and logs why. Nothing here
//! panics on bad input.

use crate::building::BuildingRecord;
use crate::id::{BlockPos, ColonyId, SerializedTypeId, TriggerKey};
use crate::registry::TypeRegistry;
use crate::serialize::PersistedBuilding;
use crate::view::{BuildingView, WireReader};

/// A trigger block placed in the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPlacement {
    pub trigger: TriggerKey,
    pub location: BlockPos,
}

impl TriggerPlacement {
    pub fn new(trigger: TriggerKey, location: BlockPos) -> Self {
        Self { trigger, location }
    }
}

/// Resolves building kinds through a [`TypeRegistry`] and constructs them.
#[derive(Debug, Clone, Copy)]
pub struct BuildingFactory<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> BuildingFactory<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Rebuild a building from its persisted bytes.
    pub fn create_from_persisted(&self, colony: ColonyId, data: &[u8]) -> Option<BuildingRecord> {
        let record = match PersistedBuilding::decode(data) {
            Ok(record) => record,
            Err(err) => {
                tracing::error!(colony = colony.0, error = %err, "unreadable persisted building");
                return None;
            }
        };
        self.create_from_record(colony, &record)
    }

    /// Rebuild a building from an already decoded record.
    pub fn create_from_record(
        &self,
        colony: ColonyId,
        record: &PersistedBuilding,
    ) -> Option<BuildingRecord> {
        let Some(kind) = self.registry.resolve_by_name(&record.type_name) else {
            tracing::warn!(
                type_name = %record.type_name,
                location = %record.location,
                "unknown building type in save, skipping"
            );
            return None;
        };
        let mut building = kind.construct(colony, record.location);
        building.apply_persisted(record);
        Some(building)
    }

    /// A fresh level-0 building for a placed trigger block.
    pub fn create_from_trigger(
        &self,
        colony: ColonyId,
        placement: &TriggerPlacement,
    ) -> Option<BuildingRecord> {
        let Some(kind) = self.registry.resolve_by_trigger(&placement.trigger) else {
            tracing::error!(
                trigger = %placement.trigger,
                location = %placement.location,
                "no building type registered for trigger"
            );
            return None;
        };
        Some(kind.construct(colony, placement.location))
    }

    /// Build a client view from a received view frame.
    pub fn create_view(
        &self,
        colony: ColonyId,
        location: BlockPos,
        wire: &[u8],
    ) -> Option<BuildingView> {
        let mut reader = WireReader::new(wire);
        let id = match reader.read_i32() {
            Ok(id) => SerializedTypeId(id),
            Err(err) => {
                tracing::error!(location = %location, error = %err, "view frame too short");
                return None;
            }
        };
        let Some(kind) = self.registry.resolve_by_serialized_id(id) else {
            tracing::warn!(id = id.0, location = %location, "unknown building view id");
            return None;
        };
        let mut view = kind.construct_view(colony, location);
        match view.deserialize_from_view(&mut reader) {
            Ok(()) => Some(view),
            Err(err) => {
                tracing::error!(
                    kind = %kind,
                    location = %location,
                    error = %err,
                    "failed to read building view"
                );
                None
            }
        }
    }
}
