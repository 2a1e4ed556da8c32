//! Data-driven building type definitions for colony-core.
//!
//! Building types can be declared in a `buildings.ron`, `buildings.json` or
//! `buildings.toml` file instead of being registered in code.
//! [`load_registry`] finds the file, parses it and returns a frozen
//! [`colony_core::registry::TypeRegistry`].

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, Format, load_registry, registry_from_str};
