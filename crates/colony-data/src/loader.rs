//! Reads building type data files and builds the type registry.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus the pipeline that turns a `buildings` file
//! into a frozen [`TypeRegistry`].

use crate::schema::BuildingTypeData;
use colony_core::id::{SerializedTypeId, TriggerKey};
use colony_core::kind::BuildingKind;
use colony_core::registry::{RegistryError, TypeRegistry, TypeRegistryBuilder};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Base name of the building definitions file.
pub const BUILDINGS_FILE: &str = "buildings";

/// Top-level key holding the entry array in TOML files.
pub const BUILDINGS_TOML_KEY: &str = "buildings";

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// An entry names a building kind that does not exist.
    #[error("unresolved building kind '{name}' in {file}")]
    UnresolvedKind { file: PathBuf, name: String },

    /// The registry rejected an entry (duplicate name, trigger, ...).
    #[error("invalid building definition in {file}: {source}")]
    Registry {
        file: PathBuf,
        #[source]
        source: RegistryError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `{base_name}.ron`, `.toml` or `.json` in `dir`.
///
/// Returns `Ok(None)` if none exists and `ConflictingFormats` if more than
/// one does.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// Like [`find_data_file`], but a missing file is an error.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Parse a list of entries. RON and JSON hold the list directly; TOML holds
/// it under `toml_key` in a top-level table.
///
/// `file` is only used for error messages.
pub fn parse_list<T: DeserializeOwned>(
    content: &str,
    format: Format,
    toml_key: &str,
    file: &Path,
) -> Result<Vec<T>, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => {
            let mut table: toml::Table =
                toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            let array = table
                .remove(toml_key)
                .ok_or_else(|| parse_err(format!("missing key '{toml_key}' in TOML file")))?;
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_err(e.to_string()))
        }
    }
}

/// Read a file and parse a list from it, detecting the format from the
/// extension.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_list(&content, format, toml_key, path)
}

// ===========================================================================
// Registry pipeline
// ===========================================================================

/// Register every entry, in file order. The first bad entry aborts.
pub fn build_registry(
    entries: &[BuildingTypeData],
    file: &Path,
) -> Result<TypeRegistry, DataLoadError> {
    let mut builder = TypeRegistryBuilder::new();
    for entry in entries {
        let kind = BuildingKind::from_variant_name(&entry.kind).ok_or_else(|| {
            DataLoadError::UnresolvedKind {
                file: file.to_path_buf(),
                name: entry.kind.clone(),
            }
        })?;
        let trigger = entry
            .trigger
            .as_deref()
            .map(TriggerKey::new)
            .unwrap_or_else(|| kind.default_trigger());
        let id = entry
            .serialized_id
            .map(SerializedTypeId)
            .unwrap_or_else(|| kind.stable_id());
        builder
            .register_with_id(&entry.name, kind, trigger, id)
            .map_err(|source| DataLoadError::Registry {
                file: file.to_path_buf(),
                source,
            })?;
    }
    if builder.len() < BuildingKind::ALL.len() {
        tracing::debug!(
            file = %file.display(),
            registered = builder.len(),
            "building data registers a subset of kinds"
        );
    }
    Ok(builder.build())
}

/// Parse building definitions from a string.
pub fn registry_from_str(content: &str, format: Format) -> Result<TypeRegistry, DataLoadError> {
    let origin = Path::new("<inline>");
    let entries: Vec<BuildingTypeData> = parse_list(content, format, BUILDINGS_TOML_KEY, origin)?;
    build_registry(&entries, origin)
}

/// Load `buildings.{ron,toml,json}` from `dir` and build the registry.
pub fn load_registry(dir: &Path) -> Result<TypeRegistry, DataLoadError> {
    let path = require_data_file(dir, BUILDINGS_FILE)?;
    let entries: Vec<BuildingTypeData> = deserialize_list(&path, BUILDINGS_TOML_KEY)?;
    let registry = build_registry(&entries, &path)?;
    tracing::info!(file = %path.display(), types = registry.len(), "building types loaded");
    Ok(registry)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temporary directory with a unique name for test isolation.
    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "colony_data_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    const TWO_RON: &str = r#"[
        (name: "Baker", kind: "Baker"),
        (name: "Home", kind: "Home", trigger: Some("blockHutCitizen")),
    ]"#;

    // -----------------------------------------------------------------------
    // detect_format / find_data_file
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("buildings.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("buildings.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("buildings.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("buildings.yaml")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            detect_format(Path::new("buildings")),
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn find_data_file_missing_and_conflict() {
        let dir = make_test_dir("find");
        assert_eq!(find_data_file(&dir, BUILDINGS_FILE).unwrap(), None);
        assert!(matches!(
            require_data_file(&dir, BUILDINGS_FILE),
            Err(DataLoadError::MissingRequired { .. })
        ));

        fs::write(dir.join("buildings.ron"), "[]").unwrap();
        assert_eq!(
            find_data_file(&dir, BUILDINGS_FILE).unwrap(),
            Some(dir.join("buildings.ron"))
        );

        fs::write(dir.join("buildings.json"), "[]").unwrap();
        assert!(matches!(
            find_data_file(&dir, BUILDINGS_FILE),
            Err(DataLoadError::ConflictingFormats { .. })
        ));

        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn ron_registry() {
        let registry = registry_from_str(TWO_RON, Format::Ron).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve_by_name("Home"), Some(BuildingKind::Home));
        assert_eq!(
            registry.resolve_by_trigger(&TriggerKey::new("blockHutBaker")),
            Some(BuildingKind::Baker)
        );
    }

    #[test]
    fn json_registry_with_explicit_id() {
        let json = r#"[{"name": "Bakery", "kind": "Baker", "serialized_id": 4242}]"#;
        let registry = registry_from_str(json, Format::Json).unwrap();
        assert_eq!(
            registry.resolve_by_serialized_id(SerializedTypeId(4242)),
            Some(BuildingKind::Baker)
        );
        assert_eq!(registry.name_of(BuildingKind::Baker), Some("Bakery"));
    }

    #[test]
    fn toml_registry() {
        let toml = r#"
            [[buildings]]
            name = "Miner"
            kind = "Miner"

            [[buildings]]
            name = "WareHouse"
            kind = "Warehouse"
            trigger = "blockHutWareHouse"
        "#;
        let registry = registry_from_str(toml, Format::Toml).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve_by_name("WareHouse"), Some(BuildingKind::Warehouse));
    }

    #[test]
    fn toml_missing_key() {
        let err = registry_from_str("other = 1", Format::Toml).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let err = registry_from_str(r#"[(name: "Castle", kind: "Castle")]"#, Format::Ron)
            .unwrap_err();
        assert!(matches!(err, DataLoadError::UnresolvedKind { ref name, .. } if name == "Castle"));
    }

    #[test]
    fn duplicate_trigger_is_an_error() {
        let ron = r#"[
            (name: "Baker", kind: "Baker", trigger: Some("blockShared")),
            (name: "Miner", kind: "Miner", trigger: Some("blockShared")),
        ]"#;
        let err = registry_from_str(ron, Format::Ron).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::Registry {
                source: RegistryError::DuplicateTrigger { .. },
                ..
            }
        ));
    }

    #[test]
    fn malformed_ron_is_parse_error() {
        let err = registry_from_str("[(name: ", Format::Ron).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
    }

    // -----------------------------------------------------------------------
    // load_registry
    // -----------------------------------------------------------------------

    #[test]
    fn load_registry_from_dir() {
        let dir = make_test_dir("load");
        fs::write(dir.join("buildings.ron"), TWO_RON).unwrap();
        let registry = load_registry(&dir).unwrap();
        assert_eq!(registry.len(), 2);
        cleanup(&dir);
    }

    #[test]
    fn parse_error_names_the_file() {
        let dir = make_test_dir("parse_file");
        fs::write(dir.join("buildings.json"), "{not json").unwrap();
        let err = load_registry(&dir).unwrap_err();
        assert!(err.to_string().contains("buildings.json"));
        cleanup(&dir);
    }
}
