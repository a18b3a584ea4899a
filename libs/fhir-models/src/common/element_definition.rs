//! ElementDefinition model (the subset needed to derive field descriptors)

use crate::definition::Cardinality;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Dotted element path (e.g. `Patient.name.given`)
    pub path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    /// `"*"` or a number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub types: Option<Vec<ElementDefinitionType>>,

    /// `#Type.path` reference to an element whose content is reused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<ElementDefinitionBinding>,

    /// Everything else on the element
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionType {
    /// Type code (e.g. `string`, `HumanName`, `http://hl7.org/fhirpath/System.String`)
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_profile: Option<Vec<String>>,
}

/// Strength of a value-set binding; only `required` closes a code set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingStrength {
    Required,
    Extensible,
    Preferred,
    Example,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ElementDefinitionBinding {
    pub strength: BindingStrength,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_set: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ElementDefinition {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: None,
            path: path.into(),
            short: None,
            min: None,
            max: None,
            types: None,
            content_reference: None,
            binding: None,
            extensions: HashMap::new(),
        }
    }

    /// Last path segment (e.g. `given` for `Patient.name.given`)
    pub fn name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Path of the owning element (`Patient.name` for `Patient.name.given`)
    pub fn parent_path(&self) -> Option<&str> {
        self.path.rsplit_once('.').map(|(parent, _)| parent)
    }

    pub fn is_choice_type(&self) -> bool {
        self.path.ends_with("[x]")
    }

    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_max(self.max.as_deref())
    }

    /// Prohibited elements (`max = "0"`) carry no field.
    pub fn is_prohibited(&self) -> bool {
        self.max.as_deref() == Some("0")
    }

    /// Whether the element's codes are closed by a required binding
    pub fn has_required_binding(&self) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| b.strength == BindingStrength::Required)
    }

    pub fn type_codes(&self) -> Vec<&str> {
        self.types
            .iter()
            .flatten()
            .map(|t| t.code.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

impl Snapshot {
    pub fn get_element(&self, path: &str) -> Option<&ElementDefinition> {
        self.element.iter().find(|e| e.path == path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Differential {
    pub element: Vec<ElementDefinition>,
}
