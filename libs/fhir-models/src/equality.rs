//! Structural (deep) equality
//!
//! Two elements are equal when they have the same tag and type name, the same
//! scalar (primitives) or the same child sequences slot by slot (composites),
//! and the same extensions. Repeated children compare in order; extensions
//! compare as an unordered multiset. A slot that was never populated equals an
//! emptied one.

use crate::element::{CompositeValue, Element, Extension, PrimitiveValue, Resource};

pub fn elements_equal(a: &Element, b: &Element) -> bool {
    match (a, b) {
        (Element::Primitive(l), Element::Primitive(r)) => primitives_equal(l, r),
        (Element::Composite(l), Element::Composite(r)) => composites_equal(l, r),
        _ => false,
    }
}

pub fn primitives_equal(a: &PrimitiveValue, b: &PrimitiveValue) -> bool {
    a.type_name() == b.type_name()
        && a.data() == b.data()
        && extensions_equal(a.extensions(), b.extensions())
}

pub fn composites_equal(a: &CompositeValue, b: &CompositeValue) -> bool {
    if a.type_name() != b.type_name() {
        return false;
    }
    if !extensions_equal(a.extensions(), b.extensions()) {
        return false;
    }

    let slots_match = |left: &CompositeValue, right: &CompositeValue| {
        left.slots()
            .iter()
            .all(|(name, values)| sequences_equal(values, right.values(name)))
    };
    slots_match(a, b) && slots_match(b, a)
}

/// Ordered comparison of two value sequences
pub fn sequences_equal(a: &[Element], b: &[Element]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(l, r)| elements_equal(l, r))
}

pub fn extension_equal(a: &Extension, b: &Extension) -> bool {
    a.url == b.url
        && match (a.value(), b.value()) {
            (Some(l), Some(r)) => elements_equal(l, r),
            (None, None) => true,
            _ => false,
        }
}

/// Multiset comparison: every extension on one side pairs with a distinct equal one on the other.
pub fn extensions_equal(a: &[Extension], b: &[Extension]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut matched = vec![false; b.len()];
    a.iter().all(|left| {
        let found = b
            .iter()
            .enumerate()
            .find(|(i, right)| !matched[*i] && extension_equal(left, right));
        match found {
            Some((i, _)) => {
                matched[i] = true;
                true
            }
            None => false,
        }
    })
}

pub fn resources_equal(a: &Resource, b: &Resource) -> bool {
    composites_equal(a.root(), b.root())
}

/// True when `candidate` deep-equals any element of `values`.
pub fn contains_equal(values: &[Element], candidate: &Element) -> bool {
    values.iter().any(|v| elements_equal(v, candidate))
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        elements_equal(self, other)
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        primitives_equal(self, other)
    }
}

impl PartialEq for CompositeValue {
    fn eq(&self, other: &Self) -> bool {
        composites_equal(self, other)
    }
}

impl PartialEq for Extension {
    fn eq(&self, other: &Self) -> bool {
        extension_equal(self, other)
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        resources_equal(self, other)
    }
}
