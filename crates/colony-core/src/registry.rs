use crate::id::{SerializedTypeId, TriggerKey};
use crate::kind::BuildingKind;
use std::collections::HashMap;

/// Static description of one registered building kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingTypeDescriptor {
    /// Human-readable name written into persisted records.
    pub name: String,
    pub kind: BuildingKind,
    /// Tag written at the front of view frames.
    pub serialized_id: SerializedTypeId,
    /// Block whose placement creates a building of this kind.
    pub trigger: TriggerKey,
}

/// Builder for constructing an immutable [`TypeRegistry`].
///
/// Every registration is validated against all four lookup tables before
/// anything is inserted, so a rejected registration leaves the builder
/// exactly as it was.
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    descriptors: Vec<BuildingTypeDescriptor>,
    name_to_index: HashMap<String, usize>,
    kind_to_index: HashMap<BuildingKind, usize>,
    trigger_to_index: HashMap<TriggerKey, usize>,
    id_to_index: HashMap<SerializedTypeId, usize>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind under `name`, using the kind's stable wire tag.
    pub fn register(
        &mut self,
        name: &str,
        kind: BuildingKind,
        trigger: TriggerKey,
    ) -> Result<(), RegistryError> {
        self.register_with_id(name, kind, trigger, kind.stable_id())
    }

    /// Register a kind with an explicit wire tag.
    pub fn register_with_id(
        &mut self,
        name: &str,
        kind: BuildingKind,
        trigger: TriggerKey,
        serialized_id: SerializedTypeId,
    ) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.name_to_index.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        if let Some(&idx) = self.kind_to_index.get(&kind) {
            return Err(RegistryError::DuplicateKind {
                kind,
                existing: self.descriptors[idx].name.clone(),
            });
        }
        if let Some(&idx) = self.id_to_index.get(&serialized_id) {
            return Err(RegistryError::DuplicateSerializedId {
                name: name.to_string(),
                id: serialized_id,
                existing: self.descriptors[idx].kind,
            });
        }
        if let Some(&idx) = self.trigger_to_index.get(&trigger) {
            return Err(RegistryError::DuplicateTrigger {
                name: name.to_string(),
                trigger,
                existing: self.descriptors[idx].kind,
            });
        }

        let idx = self.descriptors.len();
        self.name_to_index.insert(name.to_string(), idx);
        self.kind_to_index.insert(kind, idx);
        self.id_to_index.insert(serialized_id, idx);
        self.trigger_to_index.insert(trigger.clone(), idx);
        self.descriptors.push(BuildingTypeDescriptor {
            name: name.to_string(),
            kind,
            serialized_id,
            trigger,
        });
        Ok(())
    }

    /// Register every stock kind under its default name and trigger.
    pub fn register_standard(&mut self) -> Result<(), RegistryError> {
        for kind in BuildingKind::ALL {
            self.register(kind.default_name(), kind, kind.default_trigger())?;
        }
        Ok(())
    }

    /// Number of registered descriptors so far.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Freeze the builder.
    pub fn build(self) -> TypeRegistry {
        tracing::debug!(count = self.descriptors.len(), "building type registry frozen");
        TypeRegistry {
            descriptors: self.descriptors,
            name_to_index: self.name_to_index,
            kind_to_index: self.kind_to_index,
            trigger_to_index: self.trigger_to_index,
            id_to_index: self.id_to_index,
        }
    }
}

/// Immutable building type registry. Constructed once at startup and passed
/// by reference to everything that resolves building types.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    descriptors: Vec<BuildingTypeDescriptor>,
    name_to_index: HashMap<String, usize>,
    kind_to_index: HashMap<BuildingKind, usize>,
    trigger_to_index: HashMap<TriggerKey, usize>,
    id_to_index: HashMap<SerializedTypeId, usize>,
}

impl TypeRegistry {
    /// Registry with all stock kinds.
    pub fn standard() -> Result<TypeRegistry, RegistryError> {
        let mut builder = TypeRegistryBuilder::new();
        builder.register_standard()?;
        Ok(builder.build())
    }

    pub fn resolve_by_name(&self, name: &str) -> Option<BuildingKind> {
        self.name_to_index
            .get(name)
            .map(|&idx| self.descriptors[idx].kind)
    }

    pub fn resolve_by_trigger(&self, trigger: &TriggerKey) -> Option<BuildingKind> {
        self.trigger_to_index
            .get(trigger)
            .map(|&idx| self.descriptors[idx].kind)
    }

    /// Resolve a wire tag to the kind of view it describes.
    pub fn resolve_by_serialized_id(&self, id: SerializedTypeId) -> Option<BuildingKind> {
        self.id_to_index
            .get(&id)
            .map(|&idx| self.descriptors[idx].kind)
    }

    pub fn descriptor(&self, kind: BuildingKind) -> Option<&BuildingTypeDescriptor> {
        self.kind_to_index
            .get(&kind)
            .map(|&idx| &self.descriptors[idx])
    }

    pub fn name_of(&self, kind: BuildingKind) -> Option<&str> {
        self.descriptor(kind).map(|d| d.name.as_str())
    }

    pub fn serialized_id_of(&self, kind: BuildingKind) -> Option<SerializedTypeId> {
        self.descriptor(kind).map(|d| d.serialized_id)
    }

    /// Whether placing `trigger` creates a building of `kind`.
    pub fn matches_trigger(&self, kind: BuildingKind, trigger: &TriggerKey) -> bool {
        self.resolve_by_trigger(trigger) == Some(kind)
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &BuildingTypeDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("building type name must not be empty")]
    EmptyName,
    #[error("duplicate building type name '{0}'")]
    DuplicateName(String),
    #[error("building kind {kind:?} is already registered as '{existing}'")]
    DuplicateKind { kind: BuildingKind, existing: String },
    #[error("building type '{name}' uses serialized id {id:?} which is already bound to {existing:?}")]
    DuplicateSerializedId {
        name: String,
        id: SerializedTypeId,
        existing: BuildingKind,
    },
    #[error("building type '{name}' uses trigger '{trigger}' which is already bound to {existing:?}")]
    DuplicateTrigger {
        name: String,
        trigger: TriggerKey,
        existing: BuildingKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_builder() -> TypeRegistryBuilder {
        let mut b = TypeRegistryBuilder::new();
        b.register("Baker", BuildingKind::Baker, TriggerKey::new("blockHutBaker"))
            .unwrap();
        b.register("Miner", BuildingKind::Miner, TriggerKey::new("blockHutMiner"))
            .unwrap();
        b
    }

    #[test]
    fn register_and_build() {
        let reg = setup_builder().build();
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.resolve_by_name("Baker"), Some(BuildingKind::Baker));
        assert_eq!(
            reg.resolve_by_trigger(&TriggerKey::new("blockHutMiner")),
            Some(BuildingKind::Miner)
        );
        assert_eq!(
            reg.resolve_by_serialized_id(BuildingKind::Baker.stable_id()),
            Some(BuildingKind::Baker)
        );
    }

    #[test]
    fn standard_registry_resolves_every_descriptor() {
        let reg = TypeRegistry::standard().unwrap();
        assert_eq!(reg.len(), BuildingKind::ALL.len());
        for d in reg.descriptors() {
            assert_eq!(reg.resolve_by_name(&d.name), Some(d.kind));
            assert_eq!(reg.resolve_by_trigger(&d.trigger), Some(d.kind));
            assert_eq!(reg.resolve_by_serialized_id(d.serialized_id), Some(d.kind));
            assert_eq!(reg.name_of(d.kind), Some(d.name.as_str()));
        }
    }

    #[test]
    fn lookup_misses_return_none() {
        let reg = setup_builder().build();
        assert!(reg.resolve_by_name("Smeltery").is_none());
        assert!(reg.resolve_by_trigger(&TriggerKey::new("blockStone")).is_none());
        assert!(reg.resolve_by_serialized_id(SerializedTypeId(-1)).is_none());
        assert!(reg.name_of(BuildingKind::Warehouse).is_none());
        assert!(reg.serialized_id_of(BuildingKind::Warehouse).is_none());
    }

    #[test]
    fn duplicate_name_rejected_and_builder_unchanged() {
        let mut b = setup_builder();
        let result = b.register("Baker", BuildingKind::Farmer, TriggerKey::new("blockHutFarmer"));
        assert_eq!(result, Err(RegistryError::DuplicateName("Baker".into())));
        assert_eq!(b.len(), 2);
        let reg = b.build();
        assert!(reg.resolve_by_trigger(&TriggerKey::new("blockHutFarmer")).is_none());
        assert!(reg.descriptor(BuildingKind::Farmer).is_none());
    }

    #[test]
    fn duplicate_trigger_rejected_and_builder_unchanged() {
        let mut b = setup_builder();
        let result = b.register("Farmer", BuildingKind::Farmer, TriggerKey::new("blockHutBaker"));
        match result {
            Err(RegistryError::DuplicateTrigger { existing, .. }) => {
                assert_eq!(existing, BuildingKind::Baker);
            }
            other => panic!("expected DuplicateTrigger, got: {other:?}"),
        }
        let reg = b.build();
        assert!(reg.resolve_by_name("Farmer").is_none());
        assert_eq!(
            reg.resolve_by_trigger(&TriggerKey::new("blockHutBaker")),
            Some(BuildingKind::Baker)
        );
    }

    #[test]
    fn duplicate_serialized_id_rejected() {
        let mut b = setup_builder();
        let result = b.register_with_id(
            "Farmer",
            BuildingKind::Farmer,
            TriggerKey::new("blockHutFarmer"),
            BuildingKind::Miner.stable_id(),
        );
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateSerializedId {
                existing: BuildingKind::Miner,
                ..
            })
        ));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn duplicate_kind_rejected() {
        let mut b = setup_builder();
        let result = b.register("Bakery", BuildingKind::Baker, TriggerKey::new("blockBakery"));
        match result {
            Err(RegistryError::DuplicateKind { kind, existing }) => {
                assert_eq!(kind, BuildingKind::Baker);
                assert_eq!(existing, "Baker");
                let msg = RegistryError::DuplicateKind { kind, existing }.to_string();
                assert!(msg.contains("already registered"), "got: {msg}");
            }
            other => panic!("expected DuplicateKind, got: {other:?}"),
        }
    }

    #[test]
    fn empty_name_rejected() {
        let mut b = TypeRegistryBuilder::new();
        assert_eq!(
            b.register("", BuildingKind::Baker, TriggerKey::new("x")),
            Err(RegistryError::EmptyName)
        );
        assert!(b.is_empty());
    }

    #[test]
    fn register_standard_twice_fails() {
        let mut b = TypeRegistryBuilder::new();
        b.register_standard().unwrap();
        assert!(b.register_standard().is_err());
        assert_eq!(b.len(), BuildingKind::ALL.len());
    }

    #[test]
    fn matches_trigger() {
        let reg = setup_builder().build();
        assert!(reg.matches_trigger(BuildingKind::Baker, &TriggerKey::new("blockHutBaker")));
        assert!(!reg.matches_trigger(BuildingKind::Miner, &TriggerKey::new("blockHutBaker")));
        assert!(!reg.matches_trigger(BuildingKind::Miner, &TriggerKey::new("unknown")));
    }

    #[test]
    fn empty_registry_builds_successfully() {
        let reg = TypeRegistryBuilder::new().build();
        assert!(reg.is_empty());
        assert!(reg.resolve_by_name("Baker").is_none());
    }
}
