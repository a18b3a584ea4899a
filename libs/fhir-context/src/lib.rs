//! Type model for the terser engine
//!
//! Provides a trait-based interface for field metadata lookups, an in-memory
//! registry of [`TypeDescriptor`] tables (built by hand or from
//! StructureDefinition snapshots), an LRU-cached wrapper and a bundled subset of
//! the FHIR R4 core types.
//!
//! [`TypeDescriptor`]: terser_models::TypeDescriptor

pub mod cache;
pub mod error;
pub mod model;
pub mod r4;

pub use cache::CachingTypeModel;
pub use error::{Error, Result};
pub use model::{InMemoryTypeModel, TypeModel};
