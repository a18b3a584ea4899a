//! Typed element tree and type metadata for the terser engine.
//!
//! - [`Element`] is the tagged value variant (primitive leaf or composite node)
//! - [`Resource`] is a root record of a resource type
//! - [`TypeDescriptor`] / [`FieldDefinition`] describe declared types
//! - [`StructureDefinition`] is the serde model the type descriptors can be built from
//!
//! Structural equality lives in [`equality`] and backs the `PartialEq` impls of
//! every element type.

pub mod common;
pub mod definition;
pub mod element;
pub mod equality;
pub mod error;
pub mod primitive;

pub use common::element_definition::{
    BindingStrength, Differential, ElementDefinition, ElementDefinitionBinding,
    ElementDefinitionType, Snapshot,
};
pub use common::structure_definition::{
    PublicationStatus, StructureDefinition, StructureDefinitionKind, TypeDerivationRule,
};
pub use definition::{Cardinality, FieldDefinition, TypeDescriptor, TypeKind};
pub use element::{CompositeValue, Element, Extension, PrimitiveValue, Resource};
pub use error::{Error, Result};
pub use primitive::{DatePrecision, DateTimePrecision, PrimitiveData, ScalarKind, TimePrecision};
