//! StructureDefinition, reduced to what a type model is derived from
//!
//! Identity (`url`, `type`), classification (`kind`, `derivation`) and the
//! snapshot element list. Unmodeled keys are kept in `other` so a definition
//! survives a serde round-trip.

use super::element_definition::{Differential, ElementDefinition, Snapshot};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructureDefinition {
    #[serde(default = "structure_definition_tag")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub url: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub status: PublicationStatus,

    pub kind: StructureDefinitionKind,

    #[serde(rename = "abstract", default)]
    pub is_abstract: bool,

    /// Type the definition describes; a profile names the type it constrains
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_definition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<TypeDerivationRule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential: Option<Differential>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    Draft,
    Active,
    Retired,
    Unknown,
}

fn structure_definition_tag() -> String {
    String::from("StructureDefinition")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureDefinitionKind {
    PrimitiveType,
    ComplexType,
    Resource,
    Logical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeDerivationRule {
    Specialization,
    Constraint,
}

impl StructureDefinition {
    /// Bare core definition of `type_name` with an empty snapshot.
    pub fn for_type(kind: StructureDefinitionKind, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            resource_type: structure_definition_tag(),
            id: Some(type_name.clone()),
            url: format!("http://hl7.org/fhir/StructureDefinition/{type_name}"),
            name: type_name.clone(),
            status: PublicationStatus::Active,
            kind,
            is_abstract: false,
            type_: type_name,
            base_definition: None,
            derivation: Some(TypeDerivationRule::Specialization),
            snapshot: Some(Snapshot::default()),
            differential: None,
            other: Map::new(),
        }
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self::deserialize(value)?)
    }

    /// Snapshot elements in definition order, root element first
    pub fn elements(&self) -> Option<&[ElementDefinition]> {
        self.snapshot.as_ref().map(|s| s.element.as_slice())
    }

    pub fn element(&self, path: &str) -> Option<&ElementDefinition> {
        self.snapshot.as_ref()?.get_element(path)
    }

    /// Append an element to the snapshot, creating it when missing.
    pub fn push_element(&mut self, element: ElementDefinition) {
        self.snapshot
            .get_or_insert_with(Snapshot::default)
            .element
            .push(element);
    }

    /// Profiles constrain an existing type rather than declaring one.
    pub fn is_profile(&self) -> bool {
        matches!(self.derivation, Some(TypeDerivationRule::Constraint))
    }
}
