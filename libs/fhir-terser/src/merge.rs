//! Clone, merge and replace between records of the same type
//!
//! Repeated fields merge by appending source entries that have no deep-equal
//! counterpart in the target; any structural difference (a changed postal code,
//! an extra extension) makes an entry distinct. Single fields take the source
//! value when it is populated and differs. Nested paths pair source and target
//! containers by position, so `name.family` merges each name into its
//! counterpart.

use crate::accessor::{check_value_type, clear_values, collect_values, WriteMode};
use crate::engine::Terser;
use crate::error::{Error, Result};
use crate::path::ResolvedPath;
use terser_models::equality::{contains_equal, elements_equal, extension_equal, resources_equal};
use terser_models::{CompositeValue, Element, Extension, FieldDefinition, Resource};
use tracing::debug;

/// Deep equality of two values
pub fn equals(a: &Element, b: &Element) -> bool {
    elements_equal(a, b)
}

/// Deep equality of two records
pub fn equals_records(a: &Resource, b: &Resource) -> bool {
    resources_equal(a, b)
}

fn ensure_same_type(source: &Resource, target: &Resource) -> Result<()> {
    if source.resource_type() == target.resource_type() {
        Ok(())
    } else {
        Err(Error::ResourceTypeMismatch {
            source_type: source.resource_type().to_string(),
            target_type: target.resource_type().to_string(),
        })
    }
}

impl Terser {
    /// Deep copy of a record, built field by field through the type model.
    pub fn clone_resource(&self, source: &Resource) -> Result<Resource> {
        let mut target = self.new_resource(source.resource_type(), None)?;
        let descriptor = self.type_descriptor(source.resource_type())?;
        for field in descriptor.fields() {
            let resolved = ResolvedPath::for_field(source.resource_type(), field);
            self.replace_resolved(&resolved, source, &mut target)?;
        }
        target
            .extensions_mut()
            .extend(source.extensions().iter().cloned());
        Ok(target)
    }

    /// Merge the values at `path` from `source` into `target`.
    pub fn merge_field(&self, path: &str, source: &Resource, target: &mut Resource) -> Result<()> {
        ensure_same_type(source, target)?;
        let resolved = self.resolve(target.resource_type(), path)?;
        self.merge_resolved(&resolved, source, target)
    }

    /// Append a deep copy of `value` at `path` unless an equal value is already
    /// there. Returns whether the value was added.
    pub fn merge_value(&self, target: &mut Resource, path: &str, value: &Element) -> Result<bool> {
        let resolved = self.resolve(target.resource_type(), path)?;
        check_value_type(&resolved, value)?;

        let present = collect_values(target.root(), resolved.fields())
            .into_iter()
            .any(|existing| elements_equal(existing, value));
        if present {
            return Ok(false);
        }
        let mode = if resolved.terminal().is_repeated() {
            WriteMode::Policy
        } else {
            WriteMode::Overwrite
        };
        self.write(target.root_mut(), &resolved, value.clone(), mode)?;
        Ok(true)
    }

    /// Copy an identifier into the target's `identifier` field unless it is already present.
    pub fn clone_identifier_into(
        &self,
        identifier: &Element,
        target: &mut Resource,
    ) -> Result<bool> {
        self.merge_value(target, "identifier", identifier)
    }

    /// Clear the values at `path` in `target` and copy in everything `source` holds there.
    pub fn replace_field(
        &self,
        path: &str,
        source: &Resource,
        target: &mut Resource,
    ) -> Result<()> {
        ensure_same_type(source, target)?;
        let resolved = self.resolve(target.resource_type(), path)?;
        self.replace_resolved(&resolved, source, target)
    }

    /// Merge every declared field, identity fields included, and the root extensions.
    pub fn merge_all_fields(&self, source: &Resource, target: &mut Resource) -> Result<()> {
        self.merge_fields(source, target, |_| true)
    }

    /// Merge every declared field except the configured identity fields.
    pub fn merge_fields_except_id_and_meta(
        &self,
        source: &Resource,
        target: &mut Resource,
    ) -> Result<()> {
        self.merge_fields(source, target, |name| !self.options().is_identity_field(name))
    }

    /// Merge the declared fields whose name passes `include`, plus the root extensions.
    pub fn merge_fields<P>(
        &self,
        source: &Resource,
        target: &mut Resource,
        include: P,
    ) -> Result<()>
    where
        P: Fn(&str) -> bool,
    {
        ensure_same_type(source, target)?;
        let descriptor = self.type_descriptor(target.resource_type())?;
        for field in descriptor.fields().iter().filter(|f| include(f.name.as_str())) {
            let resolved = ResolvedPath::for_field(target.resource_type(), field);
            self.merge_resolved(&resolved, source, target)?;
        }
        merge_extensions(source.extensions(), target.extensions_mut());
        Ok(())
    }

    /// Replace the declared fields whose name passes `include`.
    pub fn replace_fields<P>(
        &self,
        source: &Resource,
        target: &mut Resource,
        include: P,
    ) -> Result<()>
    where
        P: Fn(&str) -> bool,
    {
        self.replace_fields_by_predicate(source, target, |field, _| include(field.name.as_str()))
    }

    /// Replace every declared field for which `predicate(field, source_has_value)` holds.
    pub fn replace_fields_by_predicate<P>(
        &self,
        source: &Resource,
        target: &mut Resource,
        predicate: P,
    ) -> Result<()>
    where
        P: Fn(&FieldDefinition, bool) -> bool,
    {
        ensure_same_type(source, target)?;
        let descriptor = self.type_descriptor(target.resource_type())?;
        for field in descriptor.fields() {
            let resolved = ResolvedPath::for_field(target.resource_type(), field);
            let source_has_value = !collect_values(source.root(), resolved.fields()).is_empty();
            if predicate(field, source_has_value) {
                self.replace_resolved(&resolved, source, target)?;
            }
        }
        Ok(())
    }

    fn merge_resolved(
        &self,
        resolved: &ResolvedPath,
        source: &Resource,
        target: &mut Resource,
    ) -> Result<()> {
        validate_incoming(resolved, source)?;
        let written = combine(
            Combine::Merge,
            source.root(),
            target.root_mut(),
            resolved.fields(),
        )?;
        debug!("Merged {}: {} value(s) written", resolved.path(), written);
        Ok(())
    }

    fn replace_resolved(
        &self,
        resolved: &ResolvedPath,
        source: &Resource,
        target: &mut Resource,
    ) -> Result<()> {
        validate_incoming(resolved, source)?;
        let written = combine(
            Combine::Replace,
            source.root(),
            target.root_mut(),
            resolved.fields(),
        )?;
        debug!("Replaced {}: {} value(s) written", resolved.path(), written);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combine {
    Merge,
    Replace,
}

/// Every source value at the path must fit the terminal field before anything is written.
fn validate_incoming(resolved: &ResolvedPath, source: &Resource) -> Result<()> {
    for value in collect_values(source.root(), resolved.fields()) {
        check_value_type(resolved, value)?;
    }
    Ok(())
}

/// Apply `mode` along `fields`, pairing the i-th source entry of each
/// intermediate with the i-th target entry. Target entries are created only
/// where the source has something to contribute. Returns the number of values
/// written.
fn combine(
    mode: Combine,
    source: &CompositeValue,
    target: &mut CompositeValue,
    fields: &[FieldDefinition],
) -> Result<usize> {
    let Some((field, rest)) = fields.split_first() else {
        return Ok(0);
    };
    if rest.is_empty() {
        return Ok(combine_terminal(mode, field, source.values(&field.name), target));
    }

    let entries = source.values(&field.name);
    let existing = target.values(&field.name).len();
    let mut written = 0;
    for index in 0..entries.len().max(existing) {
        let from = entries.get(index).and_then(Element::as_composite);
        let contributes = from.is_some_and(|c| !collect_values(c, rest).is_empty());

        if index >= existing && !contributes {
            continue;
        }
        let into = target_entry(target, field, index)?;
        match from {
            Some(from) => written += combine(mode, from, into, rest)?,
            None if mode == Combine::Replace => clear_values(into, rest),
            None => {}
        }
    }
    Ok(written)
}

fn combine_terminal(
    mode: Combine,
    field: &FieldDefinition,
    incoming: &[Element],
    target: &mut CompositeValue,
) -> usize {
    match mode {
        Combine::Replace => {
            target.clear(&field.name);
            if !incoming.is_empty() {
                target.values_mut(&field.name).extend(incoming.iter().cloned());
            }
            incoming.len()
        }
        Combine::Merge if field.is_repeated() => {
            let mut appended = 0;
            for value in incoming {
                if !contains_equal(target.values(&field.name), value) {
                    target.push(&field.name, value.clone());
                    appended += 1;
                }
            }
            appended
        }
        Combine::Merge => {
            let Some(value) = incoming.iter().find(|v| !v.is_empty()) else {
                return 0;
            };
            let unchanged = target
                .values(&field.name)
                .first()
                .is_some_and(|current| elements_equal(current, value));
            if unchanged {
                return 0;
            }
            let slot = target.values_mut(&field.name);
            slot.clear();
            slot.push(value.clone());
            1
        }
    }
}

/// The `index`-th entry of an intermediate slot, padding the slot with empty
/// containers up to it.
fn target_entry<'t>(
    target: &'t mut CompositeValue,
    field: &FieldDefinition,
    index: usize,
) -> Result<&'t mut CompositeValue> {
    let slot = target.values_mut(&field.name);
    while slot.len() <= index {
        slot.push(CompositeValue::new(field.type_name.clone()).into());
    }
    slot[index]
        .as_composite_mut()
        .ok_or_else(|| Error::TypeMismatch {
            field: field.name.clone(),
            expected: field.type_name.clone(),
            found: "primitive".to_string(),
        })
}

/// Append source extensions that have no equal counterpart in the target.
fn merge_extensions(source: &[Extension], target: &mut Vec<Extension>) {
    for extension in source {
        if !target.iter().any(|existing| extension_equal(existing, extension)) {
            target.push(extension.clone());
        }
    }
}
