//! Type descriptors
//!
//! Plain-data description of a declared type: its kind, its scalar kind when
//! primitive, and its ordered child fields. Descriptors are produced by a type
//! model and consumed by the engine; nothing here performs lookups.

use crate::common::structure_definition::StructureDefinitionKind;
use crate::primitive::ScalarKind;
use serde::{Deserialize, Serialize};

/// How many values a field may hold at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Repeated,
}

impl Cardinality {
    /// Cardinality from an ElementDefinition `max` (`"1"`, `"0"`, `"*"`, `"5"`, ...)
    pub fn from_max(max: Option<&str>) -> Self {
        match max {
            Some("*") => Cardinality::Repeated,
            Some(n) => match n.parse::<u32>() {
                Ok(limit) if limit > 1 => Cardinality::Repeated,
                _ => Cardinality::Single,
            },
            None => Cardinality::Single,
        }
    }
}

/// Metadata for one named field of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,

    /// Declared element type (e.g. `string`, `HumanName`, `Patient.contact`)
    pub type_name: String,

    pub cardinality: Cardinality,

    /// Whether the element type is a primitive leaf
    pub primitive: bool,

    /// Closed code set for coded-enum fields (required bindings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_codes: Option<Vec<String>>,
}

impl FieldDefinition {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        cardinality: Cardinality,
        primitive: bool,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            cardinality,
            primitive,
            required_codes: None,
        }
    }

    /// Field whose primitive-ness is derived from the FHIR type name.
    pub fn of_type(name: impl Into<String>, type_name: &str, cardinality: Cardinality) -> Self {
        let primitive = ScalarKind::for_type(type_name).is_some();
        Self::new(name, type_name, cardinality, primitive)
    }

    pub fn with_required_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_codes = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_single(&self) -> bool {
        self.cardinality == Cardinality::Single
    }

    /// Check a code against the field's required code set (open fields accept anything).
    pub fn accepts_code(&self, code: &str) -> bool {
        match &self.required_codes {
            Some(codes) => codes.iter().any(|c| c == code),
            None => true,
        }
    }
}

/// Kind of declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeKind {
    PrimitiveType,
    ComplexType,
    Resource,
}

impl From<&StructureDefinitionKind> for TypeKind {
    fn from(kind: &StructureDefinitionKind) -> Self {
        match kind {
            StructureDefinitionKind::PrimitiveType => TypeKind::PrimitiveType,
            StructureDefinitionKind::Resource => TypeKind::Resource,
            StructureDefinitionKind::ComplexType | StructureDefinitionKind::Logical => {
                TypeKind::ComplexType
            }
        }
    }
}

/// Descriptor table for one declared type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub name: String,
    pub kind: TypeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ScalarKind>,

    /// Declared fields in definition order
    #[serde(default)]
    fields: Vec<FieldDefinition>,
}

impl TypeDescriptor {
    pub fn primitive(name: impl Into<String>, scalar: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::PrimitiveType,
            scalar: Some(scalar),
            fields: Vec::new(),
        }
    }

    pub fn complex(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::ComplexType,
            scalar: None,
            fields: Vec::new(),
        }
    }

    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Resource,
            scalar: None,
            fields: Vec::new(),
        }
    }

    /// Append a field; a later field with the same name replaces the earlier one in place.
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.push_field(field);
        self
    }

    pub fn push_field(&mut self, field: FieldDefinition) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn is_primitive(&self) -> bool {
        self.kind == TypeKind::PrimitiveType
    }

    pub fn is_resource(&self) -> bool {
        self.kind == TypeKind::Resource
    }
}
