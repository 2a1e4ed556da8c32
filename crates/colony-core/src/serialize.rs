//! Persisted building records and colony saves.
//!
//! A building is persisted as a [`PersistedBuilding`] encoded with `bitcode`.
//! A colony save wraps a versioned header plus one blob per building, so a
//! building that fails to decode is skipped without spoiling its siblings.

use crate::id::{BlockPos, ColonyId};
use crate::kind::BuildingKind;
use crate::work_order::WorkOrder;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a colony save.
pub const COLONY_SAVE_MAGIC: u32 = 0xC010_0001;

/// Current save format version. Increment when breaking the layout.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    /// A building's kind has no registry entry. Aborts the whole save.
    #[error("building kind {0:?} is not registered")]
    UnregisteredKind(BuildingKind),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", COLONY_SAVE_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("save from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Persisted building
// ---------------------------------------------------------------------------

/// The save-file form of a building.
///
/// `level` and `rotation` are signed so that out-of-range values written by
/// older or foreign saves survive decoding and can be rejected (or clamped)
/// during hydration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedBuilding {
    /// Registry name of the building kind.
    pub type_name: String,
    pub location: BlockPos,
    pub level: i32,
    pub rotation: i32,
    pub style: String,
    /// Secondary container locations, in order.
    pub containers: Vec<BlockPos>,
}

impl PersistedBuilding {
    pub fn encode(&self) -> Result<Vec<u8>, SerializeError> {
        bitcode::serialize(self).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    pub fn decode(data: &[u8]) -> Result<Self, DeserializeError> {
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Colony save
// ---------------------------------------------------------------------------

/// Header at the front of every colony save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonySaveHeader {
    pub magic: u32,
    pub version: u32,
    pub colony: ColonyId,
}

impl ColonySaveHeader {
    pub fn new(colony: ColonyId) -> Self {
        Self {
            magic: COLONY_SAVE_MAGIC,
            version: FORMAT_VERSION,
            colony,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != COLONY_SAVE_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// A whole colony as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedColony {
    pub header: ColonySaveHeader,
    /// One encoded [`PersistedBuilding`] per building.
    pub buildings: Vec<Vec<u8>>,
    /// Open work orders. Ids are reassigned on load.
    pub work_orders: Vec<WorkOrder>,
}

impl PersistedColony {
    pub fn encode(&self) -> Result<Vec<u8>, SerializeError> {
        bitcode::serialize(self).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Decode and validate the header.
    pub fn decode(data: &[u8]) -> Result<Self, DeserializeError> {
        let colony: PersistedColony =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        colony.header.validate()?;
        Ok(colony)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersistedBuilding {
        PersistedBuilding {
            type_name: "Baker".to_string(),
            location: BlockPos::new(10, 64, -4),
            level: 2,
            rotation: 3,
            style: "birch".to_string(),
            containers: vec![BlockPos::new(11, 64, -4), BlockPos::new(9, 64, -4)],
        }
    }

    #[test]
    fn persisted_building_decodes_what_it_encodes() {
        let record = sample();
        let bytes = record.encode().unwrap();
        assert_eq!(PersistedBuilding::decode(&bytes).unwrap(), record);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = PersistedBuilding::decode(&[]).unwrap_err();
        assert!(matches!(err, DeserializeError::Decode(_)));
    }

    #[test]
    fn header_validation() {
        let ok = ColonySaveHeader::new(ColonyId(1));
        assert!(ok.validate().is_ok());

        let mut bad_magic = ok.clone();
        bad_magic.magic = 0xDEAD_BEEF;
        assert_eq!(
            bad_magic.validate(),
            Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))
        );

        let mut future = ok.clone();
        future.version = FORMAT_VERSION + 1;
        assert_eq!(
            future.validate(),
            Err(DeserializeError::FutureVersion(FORMAT_VERSION + 1))
        );

        let mut past = ok;
        past.version = 0;
        assert_eq!(past.validate(), Err(DeserializeError::UnsupportedVersion(0)));
    }

    #[test]
    fn colony_decode_rejects_bad_header() {
        let mut colony = PersistedColony {
            header: ColonySaveHeader::new(ColonyId(3)),
            buildings: vec![sample().encode().unwrap()],
            work_orders: Vec::new(),
        };
        colony.header.magic = 0;
        let bytes = colony.encode().unwrap();
        assert_eq!(
            PersistedColony::decode(&bytes),
            Err(DeserializeError::InvalidMagic(0))
        );
    }

    #[test]
    fn colony_keeps_building_blobs_opaque() {
        let colony = PersistedColony {
            header: ColonySaveHeader::new(ColonyId(3)),
            buildings: vec![sample().encode().unwrap(), Vec::new()],
            work_orders: vec![WorkOrder {
                building: BlockPos::new(10, 64, -4),
                target_level: 3,
            }],
        };
        let decoded = PersistedColony::decode(&colony.encode().unwrap()).unwrap();
        assert_eq!(decoded.buildings.len(), 2);
        assert_eq!(PersistedBuilding::decode(&decoded.buildings[0]).unwrap(), sample());
        assert!(PersistedBuilding::decode(&decoded.buildings[1]).is_err());
        assert_eq!(decoded.work_orders.len(), 1);
    }
}
