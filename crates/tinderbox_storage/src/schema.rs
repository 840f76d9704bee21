//! Schema definitions for declared fact types.

use std::collections::HashMap;

use tinderbox_foundation::{Error, ErrorKind, FieldType, Result, TypeTag};

/// Schema of a declared fact type: a fixed, ordered set of typed fields.
#[derive(Clone, Debug, PartialEq)]
pub struct FactSchema {
    /// Dense tag assigned at registration.
    pub tag: TypeTag,
    /// Fact type name.
    pub name: String,
    /// Ordered field schemas; field index is the host storage slot.
    pub fields: Vec<FieldSchema>,
}

impl FactSchema {
    /// Returns the index of a field by name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the schema of a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Schema of a single fact field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSchema {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: FieldType,
}

impl FieldSchema {
    /// Creates a field schema.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Registry of the fact types declared by one contract.
///
/// Tags are assigned densely in registration (declaration) order.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    types: Vec<FactSchema>,
    by_name: HashMap<String, TypeTag>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fact type, assigning it the next tag.
    ///
    /// # Errors
    /// Returns an error if a type with the same name is already
    /// registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        fields: Vec<FieldSchema>,
    ) -> Result<TypeTag> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::new(ErrorKind::DuplicateFactType(name)));
        }

        let tag = TypeTag::new(u32::try_from(self.types.len()).expect("too many fact types"));
        self.by_name.insert(name.clone(), tag);
        self.types.push(FactSchema { tag, name, fields });
        Ok(tag)
    }

    /// Resolves a fact type name to its tag.
    ///
    /// # Errors
    /// Returns an error if the name is not registered.
    pub fn resolve(&self, name: &str) -> Result<TypeTag> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::unknown_fact_type(name))
    }

    /// Returns the schema for a tag.
    ///
    /// # Panics
    /// Panics if the tag was not produced by this registry.
    #[must_use]
    pub fn get(&self, tag: TypeTag) -> &FactSchema {
        &self.types[tag.index() as usize]
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates all registered schemas in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &FactSchema> {
        self.types.iter()
    }
}
