//! Conformance resource models (StructureDefinition and its ElementDefinitions)

pub mod element_definition;
pub mod structure_definition;
