use std::collections::HashMap;

use indexmap::IndexMap;

use crate::error::ModelMapError;
use crate::protocol::openai::ModelObject;

/// Creation timestamp reported for every model
pub const MODEL_CREATED: u64 = 1_677_610_602;

/// Owner reported for every model
pub const MODEL_OWNER: &str = "anthropic";

/// Bidirectional table between external and internal model names
///
/// Both directions are unique, so lookups are unambiguous and
/// `to_external(to_internal(name)) == name` for every configured name.
#[derive(Debug, Clone)]
pub struct ModelMapper {
    forward: IndexMap<String, String>,
    reverse: HashMap<String, String>,
}

impl ModelMapper {
    /// Build the table from `(external, internal)` pairs
    ///
    /// Fails on the first duplicate in either direction.
    pub fn new<I, E, N>(mapping: I) -> Result<Self, ModelMapError>
    where
        I: IntoIterator<Item = (E, N)>,
        E: Into<String>,
        N: Into<String>,
    {
        let mut forward = IndexMap::new();
        let mut reverse: HashMap<String, String> = HashMap::new();

        for (external, internal) in mapping {
            let external = external.into();
            let internal = internal.into();

            if forward.contains_key(&external) {
                return Err(ModelMapError::DuplicateExternal(external));
            }
            if let Some(first) = reverse.get(&internal) {
                return Err(ModelMapError::DuplicateInternal {
                    first: first.clone(),
                    second: external,
                    internal,
                });
            }

            reverse.insert(internal.clone(), external.clone());
            forward.insert(external, internal);
        }

        Ok(Self { forward, reverse })
    }

    pub fn to_internal(&self, external: &str) -> Result<&str, ModelMapError> {
        self.forward
            .get(external)
            .map(String::as_str)
            .ok_or_else(|| ModelMapError::UnknownModel(external.to_owned()))
    }

    pub fn to_external(&self, internal: &str) -> Result<&str, ModelMapError> {
        self.reverse
            .get(internal)
            .map(String::as_str)
            .ok_or_else(|| ModelMapError::UnknownModel(internal.to_owned()))
    }

    /// Descriptors for every external model, in configuration order
    pub fn list_models(&self) -> Vec<ModelObject> {
        self.forward.keys().map(String::as_str).map(describe).collect()
    }

    /// Descriptor for one external model
    pub fn model(&self, external: &str) -> Option<ModelObject> {
        self.forward.contains_key(external).then(|| describe(external))
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

fn describe(id: &str) -> ModelObject {
    ModelObject {
        id: id.to_owned(),
        object: "model".to_owned(),
        created: MODEL_CREATED,
        owned_by: MODEL_OWNER.to_owned(),
    }
}
