//! Client-side building views and the fixed view frame.
//!
//! The server replicates each building as a 16-byte frame of four big-endian
//! `i32`s: serialized type id, level, max level, work-order level. There is no
//! length or version prefix; the id alone selects the view kind.

use crate::id::{BlockPos, ColonyId, SerializedTypeId};
use crate::kind::BuildingKind;
use crate::work_order::NO_WORK_ORDER;

/// Size of a view frame in bytes.
pub const VIEW_FRAME_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("view frame truncated: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("negative {field} ({value}) in view frame")]
    Negative { field: &'static str, value: i32 },
}

/// One encoded building view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFrame([u8; VIEW_FRAME_LEN]);

impl ViewFrame {
    pub fn new(
        serialized_id: SerializedTypeId,
        level: u32,
        max_level: u32,
        work_order_level: u32,
    ) -> Self {
        let mut bytes = [0u8; VIEW_FRAME_LEN];
        let fields = [
            serialized_id.0,
            to_wire(level),
            to_wire(max_level),
            to_wire(work_order_level),
        ];
        for (chunk, value) in bytes.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; VIEW_FRAME_LEN] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; VIEW_FRAME_LEN] {
        self.0
    }

    pub fn serialized_id(&self) -> SerializedTypeId {
        SerializedTypeId(i32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]))
    }
}

fn to_wire(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Cursor over received bytes.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        let rest = &self.bytes[self.pos..];
        let Some(chunk) = rest.first_chunk::<4>() else {
            return Err(WireError::Truncated {
                needed: 4,
                available: rest.len(),
            });
        };
        self.pos += 4;
        Ok(i32::from_be_bytes(*chunk))
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }
}

/// Reduced, client-visible projection of a building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingView {
    kind: BuildingKind,
    colony: ColonyId,
    location: BlockPos,
    level: u32,
    max_level: u32,
    work_order_level: u32,
}

impl BuildingView {
    pub fn new(kind: BuildingKind, colony: ColonyId, location: BlockPos) -> Self {
        Self {
            kind,
            colony,
            location,
            level: 0,
            max_level: kind.max_level(),
            work_order_level: NO_WORK_ORDER,
        }
    }

    /// Read level, max level and work-order level, in that order. On error the
    /// view is left unchanged.
    pub fn deserialize_from_view(&mut self, reader: &mut WireReader<'_>) -> Result<(), WireError> {
        let level = non_negative("level", reader.read_i32()?)?;
        let max_level = non_negative("max level", reader.read_i32()?)?;
        let work_order_level = non_negative("work order level", reader.read_i32()?)?;
        self.level = level;
        self.max_level = max_level;
        self.work_order_level = work_order_level;
        Ok(())
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn colony(&self) -> ColonyId {
        self.colony
    }

    pub fn location(&self) -> BlockPos {
        self.location
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    /// [`NO_WORK_ORDER`] when nothing is scheduled.
    pub fn work_order_level(&self) -> u32 {
        self.work_order_level
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    pub fn has_work_order(&self) -> bool {
        self.work_order_level != NO_WORK_ORDER
    }

    /// An upgrade is scheduled.
    pub fn is_building(&self) -> bool {
        self.has_work_order() && self.work_order_level > self.level
    }

    /// A repair of the current level is scheduled.
    pub fn is_repairing(&self) -> bool {
        self.has_work_order() && self.work_order_level == self.level
    }
}

fn non_negative(field: &'static str, value: i32) -> Result<u32, WireError> {
    u32::try_from(value).map_err(|_| WireError::Negative { field, value })
}
