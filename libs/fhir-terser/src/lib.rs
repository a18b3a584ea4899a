//! Field-path navigation, deep comparison and merge over typed FHIR records.
//!
//! A [`Terser`] pairs a [`TypeModel`] with [`TerserOptions`] and exposes
//! generic operations driven purely by runtime field metadata:
//!
//! - reading and writing through dotted paths ([`Terser::get_values`], [`Terser::set`], ...)
//! - building primitives, composites and empty resources by type name
//! - cloning, merging and replacing fields between two resources of the same type
//!
//! ```ignore
//! let terser = Terser::new(Arc::new(r4::core_model()));
//! let mut patient = terser.new_resource("Patient", None)?;
//! terser.set_literal(&mut patient, "identifier.system", "http://org.com/sys")?;
//! terser.set_literal(&mut patient, "identifier.value", "123")?;
//! assert_eq!(terser.get_values(&patient, "identifier").map(|v| v.len()), Some(1));
//! ```

mod accessor;
mod engine;
pub mod error;
mod factory;
pub mod helper;
mod merge;
pub mod options;
pub mod path;
pub mod predicate;

pub use engine::Terser;
pub use error::{Error, Result};
pub use helper::ResourceHelper;
pub use merge::{equals, equals_records};
pub use options::{SingleValuePolicy, TerserOptions};
pub use path::{resolve, FieldPath, ResolvedPath};
pub use predicate::{
    FieldPredicate, EXCLUDE_EMPTY, EXCLUDE_IDS_AND_META, EXCLUDE_IDS_META_AND_EMPTY, INCLUDE_ALL,
};

pub use terser_context::{r4, CachingTypeModel, InMemoryTypeModel, TypeModel};
pub use terser_models::{
    Cardinality, CompositeValue, Element, Extension, FieldDefinition, PrimitiveData,
    PrimitiveValue, Resource, TypeDescriptor,
};
