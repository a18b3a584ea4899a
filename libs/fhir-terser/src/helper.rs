//! Builder-style wrapper pairing a record with the engine that types it

use crate::engine::Terser;
use crate::error::Result;
use std::sync::Arc;
use terser_models::{Element, Resource, TypeDescriptor};

/// Record under construction, populated through dotted paths and literals.
///
/// ```ignore
/// let mut helper = ResourceHelper::new(&terser, "Patient")?;
/// helper
///     .set_field("identifier.system", "http://org.com/sys")?
///     .set_field("identifier.value", "123")?;
/// let patient = helper.into_resource();
/// ```
#[derive(Debug)]
pub struct ResourceHelper<'t> {
    terser: &'t Terser,
    resource: Resource,
}

impl<'t> ResourceHelper<'t> {
    /// Helper over a fresh, empty record of `resource_type`.
    pub fn new(terser: &'t Terser, resource_type: &str) -> Result<Self> {
        let resource = terser.new_resource(resource_type, None)?;
        Ok(Self { terser, resource })
    }

    pub fn from_resource(terser: &'t Terser, resource: Resource) -> Self {
        Self { terser, resource }
    }

    /// Set a field from a literal parsed as the field's declared type.
    pub fn set_field(&mut self, path: &str, literal: &str) -> Result<&mut Self> {
        self.terser.set_literal(&mut self.resource, path, literal)?;
        Ok(self)
    }

    /// Set a field from a literal of an explicit type.
    pub fn set_field_typed(
        &mut self,
        path: &str,
        type_name: &str,
        literal: &str,
    ) -> Result<&mut Self> {
        self.terser
            .set_typed_literal(&mut self.resource, path, type_name, literal)?;
        Ok(self)
    }

    pub fn field_values(&self, path: &str) -> Option<Vec<&Element>> {
        self.terser.get_values(&self.resource, path)
    }

    /// First value at `path`, `None` when unset or undeclared.
    pub fn field_value(&self, path: &str) -> Option<&Element> {
        self.terser.get_first(&self.resource, path)
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }

    pub fn into_resource(self) -> Resource {
        self.resource
    }

    pub fn type_descriptor(&self) -> Result<Arc<TypeDescriptor>> {
        self.terser.type_descriptor(self.resource.resource_type())
    }
}
