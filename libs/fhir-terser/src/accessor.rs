//! Reading and writing values through resolved paths

use crate::engine::Terser;
use crate::error::{Error, Result};
use crate::options::SingleValuePolicy;
use crate::path::ResolvedPath;
use terser_models::{CompositeValue, Element, FieldDefinition, Resource};
use tracing::debug;

/// How a write treats a single-valued field that is already populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteMode {
    /// Follow the configured [`SingleValuePolicy`]
    Policy,
    /// Always replace, used by merge and replace
    Overwrite,
}

impl Terser {
    /// All values at `path`, flattened across repeated intermediates.
    ///
    /// `None` when the path is not declared on the resource type, `Some(empty)`
    /// when it is declared but holds nothing.
    pub fn get_values<'r>(&self, resource: &'r Resource, path: &str) -> Option<Vec<&'r Element>> {
        match self.resolve(resource.resource_type(), path) {
            Ok(resolved) => Some(collect_values(resource.root(), resolved.fields())),
            Err(err) => {
                debug!("get_values({}) on {}: {}", path, resource.resource_type(), err);
                None
            }
        }
    }

    /// First value at `path`
    pub fn get_first<'r>(&self, resource: &'r Resource, path: &str) -> Option<&'r Element> {
        self.get_values(resource, path)
            .and_then(|values| values.into_iter().next())
    }

    pub fn has_values(&self, resource: &Resource, path: &str) -> bool {
        self.get_values(resource, path)
            .is_some_and(|values| !values.is_empty())
    }

    /// Whether `path` is declared on the resource type, regardless of content.
    pub fn field_exists(&self, resource: &Resource, path: &str) -> bool {
        self.resolve(resource.resource_type(), path).is_ok()
    }

    /// Write `value` at `path`.
    ///
    /// Repeated fields get the value appended; single fields get it replaced
    /// (or rejected, depending on [`SingleValuePolicy`]). Missing intermediate
    /// containers are created, and an existing first entry is reused.
    pub fn set(
        &self,
        resource: &mut Resource,
        path: &str,
        value: impl Into<Element>,
    ) -> Result<()> {
        let resolved = self.resolve(resource.resource_type(), path)?;
        self.write(resource.root_mut(), &resolved, value.into(), WriteMode::Policy)
    }

    /// Parse `literal` as the declared type of the field at `path` and write it.
    pub fn set_literal(&self, resource: &mut Resource, path: &str, literal: &str) -> Result<()> {
        let resolved = self.resolve(resource.resource_type(), path)?;
        let value = self.literal_for_field(resolved.terminal(), literal)?;
        self.write(resource.root_mut(), &resolved, value, WriteMode::Policy)
    }

    /// Like [`Terser::set_literal`] with an explicit type, which must match the field.
    pub fn set_typed_literal(
        &self,
        resource: &mut Resource,
        path: &str,
        type_name: &str,
        literal: &str,
    ) -> Result<()> {
        let resolved = self.resolve(resource.resource_type(), path)?;
        let field = resolved.terminal();
        if field.type_name != type_name {
            return Err(Error::TypeMismatch {
                field: resolved.path().to_string(),
                expected: field.type_name.clone(),
                found: type_name.to_string(),
            });
        }
        let value = self.literal_for_field(field, literal)?;
        self.write(resource.root_mut(), &resolved, value, WriteMode::Policy)
    }

    /// Remove every value at `path` in every reachable container. Never creates containers.
    pub fn clear(&self, resource: &mut Resource, path: &str) -> Result<()> {
        let resolved = self.resolve(resource.resource_type(), path)?;
        clear_values(resource.root_mut(), resolved.fields());
        Ok(())
    }

    pub(crate) fn write(
        &self,
        root: &mut CompositeValue,
        resolved: &ResolvedPath,
        value: Element,
        mode: WriteMode,
    ) -> Result<()> {
        let field = resolved.terminal();
        check_value_type(resolved, &value)?;

        if field.is_single()
            && mode == WriteMode::Policy
            && self.options().single_value_policy == SingleValuePolicy::Reject
        {
            let occupied = first_container(root, resolved.intermediates())
                .is_some_and(|container| container.has_values(&field.name));
            if occupied {
                return Err(Error::CardinalityViolation {
                    field: resolved.path().to_string(),
                });
            }
        }

        let container = container_or_create(root, resolved)?;
        let slot = container.values_mut(&field.name);
        if field.is_single() && !slot.is_empty() {
            debug!("Overwriting single-valued field {}", resolved.path());
            slot.clear();
        }
        slot.push(value);
        Ok(())
    }
}

/// Values at the end of `fields`, walking every entry of each intermediate.
pub(crate) fn collect_values<'r>(
    container: &'r CompositeValue,
    fields: &[FieldDefinition],
) -> Vec<&'r Element> {
    let mut out = Vec::new();
    collect_into(container, fields, &mut out);
    out
}

fn collect_into<'r>(
    container: &'r CompositeValue,
    fields: &[FieldDefinition],
    out: &mut Vec<&'r Element>,
) {
    let Some((field, rest)) = fields.split_first() else {
        return;
    };
    let values = container.values(&field.name);
    if rest.is_empty() {
        out.extend(values);
        return;
    }
    for child in values.iter().filter_map(Element::as_composite) {
        collect_into(child, rest, out);
    }
}

pub(crate) fn clear_values(container: &mut CompositeValue, fields: &[FieldDefinition]) {
    let Some((field, rest)) = fields.split_first() else {
        return;
    };
    if rest.is_empty() {
        container.clear(&field.name);
        return;
    }
    if let Some(values) = container.existing_values_mut(&field.name) {
        for child in values.iter_mut().filter_map(Element::as_composite_mut) {
            clear_values(child, rest);
        }
    }
}

/// Container a write would land in, if it already exists
fn first_container<'r>(
    root: &'r CompositeValue,
    intermediates: &[FieldDefinition],
) -> Option<&'r CompositeValue> {
    let mut current = root;
    for field in intermediates {
        current = current.values(&field.name).first()?.as_composite()?;
    }
    Some(current)
}

fn container_or_create<'r>(
    root: &'r mut CompositeValue,
    resolved: &ResolvedPath,
) -> Result<&'r mut CompositeValue> {
    let mut current = root;
    for field in resolved.intermediates() {
        let slot = current.values_mut(&field.name);
        if slot.is_empty() {
            slot.push(CompositeValue::new(field.type_name.clone()).into());
        }
        current = slot
            .first_mut()
            .and_then(Element::as_composite_mut)
            .ok_or_else(|| Error::TypeMismatch {
                field: field.name.clone(),
                expected: field.type_name.clone(),
                found: "primitive".to_string(),
            })?;
    }
    Ok(current)
}

/// The value's tag and type name must match the terminal field.
pub(crate) fn check_value_type(resolved: &ResolvedPath, value: &Element) -> Result<()> {
    let field = resolved.terminal();
    if value.type_name() == field.type_name && value.is_primitive() == field.primitive {
        Ok(())
    } else {
        Err(Error::TypeMismatch {
            field: resolved.path().to_string(),
            expected: field.type_name.clone(),
            found: value.type_name().to_string(),
        })
    }
}
