//! Building values and records from type names and literals

use crate::engine::Terser;
use crate::error::{Error, Result};
use terser_models::{
    CompositeValue, Element, FieldDefinition, PrimitiveData, PrimitiveValue, Resource,
};

impl Terser {
    /// Primitive of `type_name`, empty when `literal` is `None`.
    pub fn new_primitive(&self, type_name: &str, literal: Option<&str>) -> Result<Element> {
        if let Some(descriptor) = self.model().get_type(type_name) {
            if !descriptor.is_primitive() {
                return Err(Error::TypeMismatch {
                    field: type_name.to_string(),
                    expected: "primitive type".to_string(),
                    found: type_name.to_string(),
                });
            }
        }
        let scalar = self
            .model()
            .scalar_kind(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;

        let value = match literal {
            None => PrimitiveValue::empty(type_name),
            Some(literal) => {
                PrimitiveValue::new(type_name, PrimitiveData::parse(type_name, scalar, literal)?)
            }
        };
        Ok(value.into())
    }

    /// Element of any declared type: primitives parse `literal`, composites
    /// come back empty and ignore it.
    pub fn new_element(&self, type_name: &str, literal: Option<&str>) -> Result<Element> {
        match self.model().get_type(type_name) {
            Some(descriptor) if !descriptor.is_primitive() => {
                Ok(CompositeValue::new(type_name).into())
            }
            _ => self.new_primitive(type_name, literal),
        }
    }

    /// Empty record of a resource type. The literal is accepted and unused.
    pub fn new_resource(&self, type_name: &str, _literal: Option<&str>) -> Result<Resource> {
        let descriptor = self.type_descriptor(type_name)?;
        if !descriptor.is_resource() {
            return Err(Error::TypeMismatch {
                field: type_name.to_string(),
                expected: "resource type".to_string(),
                found: type_name.to_string(),
            });
        }
        Ok(Resource::new(type_name))
    }

    /// Value for a field built from a literal, honoring its required code set.
    pub(crate) fn literal_for_field(
        &self,
        field: &FieldDefinition,
        literal: &str,
    ) -> Result<Element> {
        if !field.primitive {
            return Err(Error::InvalidLiteral {
                type_name: field.type_name.clone(),
                literal: literal.to_string(),
                reason: "composite types cannot be built from a literal".to_string(),
            });
        }
        if !field.accepts_code(literal) {
            return Err(Error::InvalidLiteral {
                type_name: field.type_name.clone(),
                literal: literal.to_string(),
                reason: format!("not one of the codes allowed for '{}'", field.name),
            });
        }
        self.new_primitive(&field.type_name, Some(literal))
    }
}
