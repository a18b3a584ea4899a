//! Element tree
//!
//! Every value in a record is an [`Element`]: either a primitive leaf carrying an
//! optional scalar, or a composite node carrying named child slots. Both carry a
//! list of attached [`Extension`]s. A [`Resource`] is a root composite whose type
//! is a resource type.
//!
//! Elements own their children outright, so cloning an element is always a deep
//! copy and two records never share mutable state.

use crate::primitive::PrimitiveData;
use std::collections::HashMap;

/// Key-tagged metadata attached to an element
#[derive(Debug, Clone)]
pub struct Extension {
    pub url: String,
    pub value: Option<Box<Element>>,
}

impl Extension {
    pub fn new(url: impl Into<String>, value: Option<Element>) -> Self {
        Self {
            url: url.into(),
            value: value.map(Box::new),
        }
    }

    pub fn value(&self) -> Option<&Element> {
        self.value.as_deref()
    }
}

/// Primitive leaf: a type name, an optional scalar and its extensions
#[derive(Debug, Clone)]
pub struct PrimitiveValue {
    type_name: String,
    data: Option<PrimitiveData>,
    extensions: Vec<Extension>,
}

impl PrimitiveValue {
    /// Primitive with no scalar set
    pub fn empty(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            data: None,
            extensions: Vec::new(),
        }
    }

    pub fn new(type_name: impl Into<String>, data: PrimitiveData) -> Self {
        Self {
            type_name: type_name.into(),
            data: Some(data),
            extensions: Vec::new(),
        }
    }

    pub fn string(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(type_name, PrimitiveData::String(value.into()))
    }

    pub fn boolean(value: bool) -> Self {
        Self::new("boolean", PrimitiveData::Boolean(value))
    }

    pub fn integer(value: i64) -> Self {
        Self::new("integer", PrimitiveData::Integer(value))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn data(&self) -> Option<&PrimitiveData> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: Option<PrimitiveData>) {
        self.data = data;
    }

    pub fn has_value(&self) -> bool {
        self.data.is_some()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.data.as_ref().and_then(PrimitiveData::as_str)
    }

    /// FHIR literal form of the scalar, `None` when unset
    pub fn to_literal(&self) -> Option<String> {
        self.data.as_ref().map(PrimitiveData::to_literal)
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }
}

/// Composite node: named child slots, each an ordered sequence of elements
#[derive(Debug, Clone)]
pub struct CompositeValue {
    type_name: String,
    fields: HashMap<String, Vec<Element>>,
    extensions: Vec<Extension>,
}

impl CompositeValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: HashMap::new(),
            extensions: Vec::new(),
        }
    }

    /// Builder-style append into a child slot.
    pub fn with(mut self, field: &str, value: impl Into<Element>) -> Self {
        self.push(field, value.into());
        self
    }

    /// Builder-style extension attachment.
    pub fn with_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Values held in a child slot; empty when the slot was never populated.
    pub fn values(&self, field: &str) -> &[Element] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable slot, created empty on first access.
    pub fn values_mut(&mut self, field: &str) -> &mut Vec<Element> {
        self.fields.entry(field.to_string()).or_default()
    }

    /// Mutable slot without creating it.
    pub fn existing_values_mut(&mut self, field: &str) -> Option<&mut Vec<Element>> {
        self.fields.get_mut(field)
    }

    pub fn push(&mut self, field: &str, value: Element) {
        self.values_mut(field).push(value);
    }

    /// Remove all values of a slot, keeping the slot itself.
    pub fn clear(&mut self, field: &str) {
        if let Some(values) = self.fields.get_mut(field) {
            values.clear();
        }
    }

    pub fn has_values(&self, field: &str) -> bool {
        !self.values(field).is_empty()
    }

    /// Names of slots currently holding at least one value
    pub fn populated_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, _)| name.as_str())
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub(crate) fn slots(&self) -> &HashMap<String, Vec<Element>> {
        &self.fields
    }
}

/// Tagged value: primitive leaf or composite node
#[derive(Debug, Clone)]
pub enum Element {
    Primitive(PrimitiveValue),
    Composite(CompositeValue),
}

impl Element {
    pub fn type_name(&self) -> &str {
        match self {
            Element::Primitive(p) => p.type_name(),
            Element::Composite(c) => c.type_name(),
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Element::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Element::Primitive(p) => Some(p),
            Element::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeValue> {
        match self {
            Element::Composite(c) => Some(c),
            Element::Primitive(_) => None,
        }
    }

    pub fn as_composite_mut(&mut self) -> Option<&mut CompositeValue> {
        match self {
            Element::Composite(c) => Some(c),
            Element::Primitive(_) => None,
        }
    }

    /// Scalar of a primitive element
    pub fn data(&self) -> Option<&PrimitiveData> {
        self.as_primitive().and_then(PrimitiveValue::data)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.data().and_then(PrimitiveData::as_str)
    }

    pub fn extensions(&self) -> &[Extension] {
        match self {
            Element::Primitive(p) => &p.extensions,
            Element::Composite(c) => &c.extensions,
        }
    }

    pub fn extensions_mut(&mut self) -> &mut Vec<Extension> {
        match self {
            Element::Primitive(p) => &mut p.extensions,
            Element::Composite(c) => &mut c.extensions,
        }
    }

    pub fn add_extension(&mut self, extension: Extension) {
        self.extensions_mut().push(extension);
    }

    pub fn has_extension(&self) -> bool {
        !self.extensions().is_empty()
    }

    /// True when the element carries no scalar, no populated child and no extension.
    pub fn is_empty(&self) -> bool {
        if self.has_extension() {
            return false;
        }
        match self {
            Element::Primitive(p) => !p.has_value(),
            Element::Composite(c) => c.fields.values().flatten().all(Element::is_empty),
        }
    }
}

impl From<PrimitiveValue> for Element {
    fn from(value: PrimitiveValue) -> Self {
        Element::Primitive(value)
    }
}

impl From<CompositeValue> for Element {
    fn from(value: CompositeValue) -> Self {
        Element::Composite(value)
    }
}

/// Root record of a resource type
#[derive(Debug, Clone)]
pub struct Resource {
    root: CompositeValue,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            root: CompositeValue::new(resource_type),
        }
    }

    pub fn from_root(root: CompositeValue) -> Self {
        Self { root }
    }

    pub fn resource_type(&self) -> &str {
        self.root.type_name()
    }

    pub fn root(&self) -> &CompositeValue {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut CompositeValue {
        &mut self.root
    }

    pub fn into_root(self) -> CompositeValue {
        self.root
    }

    /// Logical id, when the `id` field holds a value
    pub fn id(&self) -> Option<&str> {
        self.root.values("id").first().and_then(Element::as_str)
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.root.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Vec<Extension> {
        &mut self.root.extensions
    }
}
