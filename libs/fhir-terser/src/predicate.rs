//! Field predicates for [`Terser::replace_fields_by_predicate`]
//!
//! A predicate sees the target field's definition and whether the source holds
//! a value for it, and answers whether the field should be replaced. The
//! identity-aware predicates use the default identity fields `id` and `meta`.
//!
//! [`Terser::replace_fields_by_predicate`]: crate::Terser::replace_fields_by_predicate

use terser_models::FieldDefinition;

pub type FieldPredicate = fn(&FieldDefinition, bool) -> bool;

pub const IDENTITY_FIELDS: [&str; 2] = ["id", "meta"];

pub const INCLUDE_ALL: FieldPredicate = include_all;
pub const EXCLUDE_IDS_AND_META: FieldPredicate = exclude_ids_and_meta;
pub const EXCLUDE_EMPTY: FieldPredicate = exclude_empty;
pub const EXCLUDE_IDS_META_AND_EMPTY: FieldPredicate = exclude_ids_meta_and_empty;

fn include_all(_field: &FieldDefinition, _source_has_value: bool) -> bool {
    true
}

fn exclude_ids_and_meta(field: &FieldDefinition, _source_has_value: bool) -> bool {
    !IDENTITY_FIELDS.contains(&field.name.as_str())
}

fn exclude_empty(_field: &FieldDefinition, source_has_value: bool) -> bool {
    source_has_value
}

fn exclude_ids_meta_and_empty(field: &FieldDefinition, source_has_value: bool) -> bool {
    exclude_ids_and_meta(field, source_has_value) && exclude_empty(field, source_has_value)
}
