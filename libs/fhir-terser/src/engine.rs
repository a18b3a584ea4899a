use crate::error::Result;
use crate::options::TerserOptions;
use crate::path::{self, ResolvedPath};
use std::fmt;
use std::sync::Arc;
use terser_context::TypeModel;
use terser_models::TypeDescriptor;

/// Path-driven access and merge engine.
///
/// Immutable once built and cheap to clone; every operation borrows the
/// records it works on.
#[derive(Clone)]
pub struct Terser {
    model: Arc<dyn TypeModel>,
    options: TerserOptions,
}

impl Terser {
    pub fn new(model: Arc<dyn TypeModel>) -> Self {
        Self {
            model,
            options: TerserOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TerserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &dyn TypeModel {
        self.model.as_ref()
    }

    pub fn options(&self) -> &TerserOptions {
        &self.options
    }

    /// Resolve a dotted path against a root type.
    pub fn resolve(&self, root_type: &str, path: &str) -> Result<ResolvedPath> {
        path::resolve(self.model.as_ref(), root_type, path)
    }

    /// Descriptor of a registered type
    pub fn type_descriptor(&self, type_name: &str) -> Result<Arc<TypeDescriptor>> {
        self.model
            .get_type(type_name)
            .ok_or_else(|| crate::Error::UnknownType(type_name.to_string()))
    }
}

impl fmt::Debug for Terser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terser")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
