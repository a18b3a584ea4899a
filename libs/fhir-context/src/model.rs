//! Type model: the metadata source behind every path lookup
//!
//! A [`TypeModel`] answers "what fields does this type declare", and the engine
//! asks nothing else of it. [`InMemoryTypeModel`] is the concrete registry,
//! filled by hand with [`TypeDescriptor`]s or derived from StructureDefinition
//! snapshots.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use terser_models::{
    ElementDefinition, FieldDefinition, ScalarKind, StructureDefinition,
    StructureDefinitionKind, TypeDescriptor, TypeKind,
};
use tracing::{debug, warn};

/// Field metadata lookups by type name
pub trait TypeModel: Send + Sync {
    /// Descriptor table for a declared type
    fn get_type(&self, type_name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Declared child field of a type.
    ///
    /// Fails with [`Error::UnknownType`] when the type is not registered and
    /// [`Error::UnknownField`] when it does not declare `field_name`.
    fn child_field(&self, type_name: &str, field_name: &str) -> Result<FieldDefinition> {
        let descriptor = self
            .get_type(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
        descriptor
            .field(field_name)
            .cloned()
            .ok_or_else(|| Error::UnknownField {
                type_name: type_name.to_string(),
                field: field_name.to_string(),
            })
    }

    /// Child field of the element type a field holds.
    fn child_field_of(
        &self,
        parent: &FieldDefinition,
        field_name: &str,
    ) -> Result<FieldDefinition> {
        self.child_field(&parent.type_name, field_name)
    }

    fn has_type(&self, type_name: &str) -> bool {
        self.get_type(type_name).is_some()
    }

    /// Scalar kind of a primitive type
    fn scalar_kind(&self, type_name: &str) -> Option<ScalarKind> {
        self.get_type(type_name)
            .and_then(|descriptor| descriptor.scalar)
            .or_else(|| ScalarKind::for_type(type_name))
    }
}

impl<M: TypeModel + ?Sized> TypeModel for Arc<M> {
    fn get_type(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        (**self).get_type(type_name)
    }

    fn child_field(&self, type_name: &str, field_name: &str) -> Result<FieldDefinition> {
        (**self).child_field(type_name, field_name)
    }
}

/// Registry of type descriptors keyed by type name
#[derive(Debug, Clone, Default)]
pub struct InMemoryTypeModel {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl InMemoryTypeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration. A descriptor replaces any earlier one of the same name.
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.add_type(descriptor);
        self
    }

    pub fn add_type(&mut self, descriptor: TypeDescriptor) {
        self.types
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Register a descriptor for every FHIR primitive type name.
    pub fn with_primitives(mut self) -> Self {
        for name in PRIMITIVE_TYPES {
            if let Some(scalar) = ScalarKind::for_type(name) {
                self.add_type(TypeDescriptor::primitive(*name, scalar));
            }
        }
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Build a model from StructureDefinitions (snapshots required for non-primitive types).
    pub fn from_structure_definitions<I>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = StructureDefinition>,
    {
        let mut model = Self::new();
        for sd in definitions {
            model.add_structure_definition(&sd)?;
        }
        Ok(model)
    }

    /// Build a model from raw StructureDefinition JSON.
    pub fn from_json_values(values: &[Value]) -> Result<Self> {
        let definitions = values
            .iter()
            .map(StructureDefinition::from_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Self::from_structure_definitions(definitions)
    }

    /// Derive descriptors from one StructureDefinition.
    ///
    /// Only direct children of each element become fields. Inline backbone
    /// elements get a synthetic type named after their path (`Patient.contact`),
    /// choice elements expand into one field per allowed type (`valueString`),
    /// and `extension`/`modifierExtension` are left out because extensions live
    /// beside the field slots. Profiles are skipped so they never shadow the
    /// base type.
    pub fn add_structure_definition(&mut self, sd: &StructureDefinition) -> Result<()> {
        if sd.is_profile() {
            debug!("Skipping profile {} (constrains {})", sd.url, sd.type_);
            return Ok(());
        }

        if sd.kind == StructureDefinitionKind::PrimitiveType {
            let scalar = ScalarKind::for_type(&sd.type_).unwrap_or_else(|| {
                warn!(
                    "Primitive type '{}' has no known scalar kind, treating as string",
                    sd.type_
                );
                ScalarKind::String
            });
            self.add_type(TypeDescriptor::primitive(sd.type_.clone(), scalar));
            return Ok(());
        }

        let elements = sd
            .elements()
            .ok_or_else(|| Error::InvalidStructureDefinition {
                url: sd.url.clone(),
                message: "missing snapshot".to_string(),
            })?;

        let root = sd.type_.clone();
        let root_descriptor = match TypeKind::from(&sd.kind) {
            TypeKind::Resource => TypeDescriptor::resource(root.clone()),
            _ => TypeDescriptor::complex(root.clone()),
        };
        let mut order = vec![root.clone()];
        let mut descriptors: HashMap<String, TypeDescriptor> = HashMap::new();
        descriptors.insert(root.clone(), root_descriptor);

        for element in elements.iter().skip(1) {
            if element.is_prohibited() {
                continue;
            }
            let Some(parent_path) = element.parent_path() else {
                continue;
            };
            let name = element.name();
            if name == "extension" || name == "modifierExtension" {
                continue;
            }
            if !descriptors.contains_key(parent_path) {
                debug!(
                    "Skipping {} in {}: parent {} is not a declared type",
                    element.path, sd.url, parent_path
                );
                continue;
            }

            let fields = fields_for_element(element)?;
            if element.has_required_binding() {
                debug!(
                    "{}: required binding is not expanded, field accepts any code",
                    element.path
                );
            }

            if is_backbone(element) {
                descriptors.insert(
                    element.path.clone(),
                    TypeDescriptor::complex(element.path.clone()),
                );
                order.push(element.path.clone());
            }

            if let Some(parent) = descriptors.get_mut(parent_path) {
                for field in fields {
                    parent.push_field(field);
                }
            }
        }

        for name in order {
            if let Some(descriptor) = descriptors.remove(&name) {
                debug!(
                    "Registered type {} with {} fields",
                    descriptor.name,
                    descriptor.fields().len()
                );
                self.add_type(descriptor);
            }
        }
        Ok(())
    }
}

impl TypeModel for InMemoryTypeModel {
    fn get_type(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(type_name).cloned()
    }
}

const PRIMITIVE_TYPES: &[&str] = &[
    "base64Binary",
    "boolean",
    "canonical",
    "code",
    "date",
    "dateTime",
    "decimal",
    "id",
    "instant",
    "integer",
    "integer64",
    "markdown",
    "oid",
    "positiveInt",
    "string",
    "time",
    "unsignedInt",
    "uri",
    "url",
    "uuid",
];

fn is_backbone(element: &ElementDefinition) -> bool {
    element.content_reference.is_none()
        && matches!(element.type_codes().as_slice(), ["BackboneElement"] | ["Element"])
}

fn fields_for_element(element: &ElementDefinition) -> Result<Vec<FieldDefinition>> {
    let cardinality = element.cardinality();
    let name = element.name();

    if let Some(reference) = &element.content_reference {
        let target = reference.rsplit('#').next().unwrap_or(reference);
        return Ok(vec![FieldDefinition::new(name, target, cardinality, false)]);
    }

    if is_backbone(element) {
        return Ok(vec![FieldDefinition::new(
            name,
            element.path.clone(),
            cardinality,
            false,
        )]);
    }

    let codes = element.type_codes();
    if element.is_choice_type() {
        let base = name.trim_end_matches("[x]");
        return Ok(codes
            .iter()
            .map(|code| {
                let type_name = normalize_type_code(code);
                let field_name = format!("{}{}", base, capitalize(&type_name));
                FieldDefinition::of_type(field_name, &type_name, cardinality)
            })
            .collect());
    }

    match codes.as_slice() {
        [] => Err(Error::InvalidStructureDefinition {
            url: element.path.clone(),
            message: "element has neither a type nor a contentReference".to_string(),
        }),
        [code, ..] => {
            let type_name = normalize_type_code(code);
            Ok(vec![FieldDefinition::of_type(name, &type_name, cardinality)])
        }
    }
}

/// Normalize type code (remove namespace prefixes)
fn normalize_type_code(code: &str) -> String {
    if let Some(system) = code.strip_prefix("http://hl7.org/fhirpath/System.") {
        return match system {
            "DateTime" => "dateTime".to_string(),
            other => other.to_lowercase(),
        };
    }
    if let Some(name) = code.strip_prefix("http://hl7.org/fhir/StructureDefinition/") {
        return name.to_string();
    }
    code.to_string()
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
