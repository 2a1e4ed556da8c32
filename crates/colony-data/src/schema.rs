//! Serde data file structs for building type definitions.
//!
//! A `buildings.{ron,json,toml}` file lists one entry per building type.
//! Entries are resolved into a [`colony_core::registry::TypeRegistry`] by the
//! loader.

use serde::Deserialize;

/// One building type definition in a data file.
///
/// ```ron
/// (name: "Home", kind: "Home", trigger: Some("blockHutCitizen"))
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildingTypeData {
    /// Registry name, written into saves.
    pub name: String,
    /// Variant name of the building kind, e.g. `"Warehouse"`.
    pub kind: String,
    /// Trigger block. Defaults to the kind's stock trigger.
    #[serde(default)]
    pub trigger: Option<String>,
    /// Wire tag. Defaults to the kind's stable id.
    #[serde(default)]
    pub serialized_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default_to_none() {
        let entry: BuildingTypeData =
            ron::from_str(r#"(name: "Baker", kind: "Baker")"#).unwrap();
        assert_eq!(entry.trigger, None);
        assert_eq!(entry.serialized_id, None);
    }

    #[test]
    fn json_entry_with_overrides() {
        let entry: BuildingTypeData = serde_json::from_str(
            r#"{"name": "Bakery", "kind": "Baker", "trigger": "blockBakery", "serialized_id": 900}"#,
        )
        .unwrap();
        assert_eq!(entry.name, "Bakery");
        assert_eq!(entry.trigger.as_deref(), Some("blockBakery"));
        assert_eq!(entry.serialized_id, Some(900));
    }
}
