//! Declarative resource schemas
//!
//! A [`Schema`] is the field table of a resource or data source type. It is
//! declared once per type and used to validate configuration, fill defaults and
//! compute which fields changed between two states.

use crate::error::{CloudError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Attribute values of a resource, keyed by field name
pub type Attributes = HashMap<String, serde_json::Value>;

/// Value type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    StringList,
    StringMap,
    /// List of nested objects with string or scalar members
    ObjectList,
}

impl FieldType {
    fn matches(&self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        match self {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            FieldType::StringMap => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
            FieldType::ObjectList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_object)),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::StringList => write!(f, "list(string)"),
            FieldType::StringMap => write!(f, "map(string)"),
            FieldType::ObjectList => write!(f, "list(object)"),
        }
    }
}

/// A single field of a schema
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Must be set in configuration
    pub required: bool,

    /// May be set in configuration
    pub optional: bool,

    /// Filled in from the remote side
    pub computed: bool,

    /// Changing this field requires replacing the resource
    pub force_new: bool,

    /// Hidden when state is displayed
    pub sensitive: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    pub description: String,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: String::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Int)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Bool)
    }

    pub fn string_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::StringList)
    }

    pub fn string_map(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::StringMap)
    }

    pub fn object_list(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::ObjectList)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the user can set this field in configuration
    pub fn is_settable(&self) -> bool {
        self.required || self.optional
    }
}

/// Field table of a resource or data source type
#[derive(Debug, Clone, Default, Serialize)]
pub struct Schema {
    pub description: String,
    pub fields: BTreeMap<String, Field>,
}

/// Settable fields that differ between two attribute sets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Changed fields marked `force_new`
    pub force_new: Vec<String>,
    /// Changed fields that can be updated in place
    pub in_place: Vec<String>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.force_new.is_empty() && self.in_place.is_empty()
    }

    pub fn requires_replace(&self) -> bool {
        !self.force_new.is_empty()
    }

    pub fn changed(&self) -> impl Iterator<Item = &String> {
        self.force_new.iter().chain(self.in_place.iter())
    }

    /// Whether `field` changed, in place or not
    pub fn contains(&self, field: &str) -> bool {
        self.changed().any(|f| f == field)
    }
}

fn present<'a>(attrs: &'a Attributes, name: &str) -> Option<&'a serde_json::Value> {
    attrs.get(name).filter(|v| !v.is_null())
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn settable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values().filter(|f| f.is_settable())
    }

    /// Check a configuration against the field table
    pub fn validate(&self, config: &Attributes) -> Result<()> {
        let mut keys: Vec<&String> = config.keys().collect();
        keys.sort();

        for key in keys {
            let value = &config[key];
            let field = self.fields.get(key).ok_or_else(|| {
                CloudError::InvalidConfig(format!("unsupported argument `{}`", key))
            })?;

            if !field.is_settable() {
                return Err(CloudError::InvalidConfig(format!(
                    "`{}` is computed and cannot be set",
                    key
                )));
            }

            if !value.is_null() && !field.field_type.matches(value) {
                return Err(CloudError::InvalidConfig(format!(
                    "`{}` must be of type {}",
                    key, field.field_type
                )));
            }
        }

        for field in self.fields.values().filter(|f| f.required) {
            if present(config, &field.name).is_none() {
                return Err(CloudError::InvalidConfig(format!(
                    "missing required argument `{}`",
                    field.name
                )));
            }
        }

        Ok(())
    }

    /// Fill declared defaults for absent optional fields
    pub fn apply_defaults(&self, config: &mut Attributes) {
        for field in self.fields.values() {
            if let Some(default) = &field.default {
                if present(config, &field.name).is_none() {
                    config.insert(field.name.clone(), default.clone());
                }
            }
        }
    }

    /// Compare the settable fields of a prior state with a new configuration
    ///
    /// A field left unset in `new` is unchanged when it is computed, since the
    /// remote side owns its value.
    pub fn diff(&self, old: &Attributes, new: &Attributes) -> Diff {
        let mut diff = Diff::default();

        for field in self.settable_fields() {
            let new_value = present(new, &field.name);
            if new_value.is_none() && field.computed {
                continue;
            }
            if present(old, &field.name) == new_value {
                continue;
            }
            if field.force_new {
                diff.force_new.push(field.name.clone());
            } else {
                diff.in_place.push(field.name.clone());
            }
        }

        diff
    }

    /// Copy of `attrs` with sensitive values masked
    pub fn redacted(&self, attrs: &Attributes) -> Attributes {
        attrs
            .iter()
            .map(|(k, v)| {
                let sensitive = self.fields.get(k).is_some_and(|f| f.sensitive);
                if sensitive && !v.is_null() {
                    (k.clone(), serde_json::json!("(sensitive)"))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }
}
