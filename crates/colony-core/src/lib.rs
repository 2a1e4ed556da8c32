//! Colony Core -- building registry and lifecycle for colony simulations.
//!
//! This crate maps building type names, concrete kinds, wire ids and trigger
//! blocks to one another, rebuilds buildings from save data and network
//! frames, and tracks each building's open requests, work orders and
//! storage containers.
//!
//! # Lifecycle
//!
//! 1. **Startup** -- Build a [`registry::TypeRegistry`] once and share it by
//!    reference.
//! 2. **Load** -- [`colony::Colony::load`] restores buildings through a
//!    [`factory::BuildingFactory`]; a building that fails to restore is
//!    logged and skipped.
//! 3. **Play** -- Trigger placements create fresh buildings; buildings submit
//!    requests, schedule work orders and move items into their containers.
//! 4. **Replicate** -- Each building encodes a fixed 16-byte
//!    [`view::ViewFrame`] for clients.
//! 5. **Save** -- [`colony::Colony::save`] writes a versioned save with one
//!    blob per building.
//!
//! ```rust,ignore
//! let registry = TypeRegistry::standard()?;
//! let factory = BuildingFactory::new(&registry);
//! let mut colony = Colony::new(ColonyId(1), world);
//! let hut = colony.place(&factory, &placement)?;
//! colony.with_building(hut, |b, ctx| b.request_upgrade(ctx));
//! let bytes = colony.save(&registry)?;
//! ```
//!
//! # Key Types
//!
//! - [`kind::BuildingKind`] -- Closed set of building kinds.
//! - [`registry::TypeRegistry`] -- Immutable name/kind/id/trigger tables.
//! - [`building::BuildingRecord`] -- One placed building.
//! - [`request_index::RequestIndex`] -- A building's open requests, indexed
//!   by kind, token and worker.
//! - [`inventory::InventoryBridge`] -- Primary/secondary container routing.
//! - [`view::BuildingView`] -- Client-side projection.

pub mod building;
pub mod colony;
pub mod dirty;
pub mod event;
pub mod factory;
pub mod id;
pub mod inventory;
pub mod item;
pub mod kind;
pub mod registry;
pub mod request;
pub mod request_index;
pub mod serialize;
pub mod view;
pub mod work_order;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
