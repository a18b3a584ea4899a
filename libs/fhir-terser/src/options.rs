use serde::{Deserialize, Serialize};

/// What `set` does when a single-valued field already holds a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SingleValuePolicy {
    /// Replace the held value
    #[default]
    Overwrite,
    /// Fail with `CardinalityViolation`
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerserOptions {
    #[serde(default)]
    pub single_value_policy: SingleValuePolicy,
    /// Fields skipped by `merge_fields_except_id_and_meta`
    #[serde(default = "default_identity_fields")]
    pub identity_fields: Vec<String>,
}

fn default_identity_fields() -> Vec<String> {
    vec!["id".to_string(), "meta".to_string()]
}

impl Default for TerserOptions {
    fn default() -> Self {
        Self {
            single_value_policy: SingleValuePolicy::Overwrite,
            identity_fields: default_identity_fields(),
        }
    }
}

impl TerserOptions {
    pub fn with_single_value_policy(mut self, policy: SingleValuePolicy) -> Self {
        self.single_value_policy = policy;
        self
    }

    pub fn with_identity_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identity_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_identity_field(&self, name: &str) -> bool {
        self.identity_fields.iter().any(|f| f == name)
    }
}
