use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Addresses one schema instance. Relocatable schemas carry a path, fixed
/// schemas do not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope {
    schema: String,
    path: Option<String>,
}

impl Scope {
    pub fn schema(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            path: None,
        }
    }

    pub fn with_path(schema: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            path: Some(path.into()),
        }
    }

    pub fn schema_id(&self) -> &str {
        &self.schema
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub(super) fn storage_key(&self) -> String {
        match &self.path {
            Some(path) => format!("{}:{}", self.schema, path),
            None => self.schema.clone(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    String(String),
    StringList(Vec<String>),
    Int(i64),
    Bool(bool),
}

impl SettingValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::StringList(_) => "string list",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
        }
    }

    pub fn same_type(&self, other: &SettingValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn strv<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringList(items.into_iter().map(Into::into).collect())
    }
}

/// Declared keys and their defaults, keyed by schema id. Path-scoped
/// instances of one schema share its declarations.
#[derive(Debug, Clone, Default)]
pub struct SchemaDefaults {
    keys: HashMap<String, HashMap<String, SettingValue>>,
}

impl SchemaDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, schema: &str, key: &str, default: SettingValue) -> &mut Self {
        self.keys
            .entry(schema.to_string())
            .or_default()
            .insert(key.to_string(), default);
        self
    }

    pub fn default_for(&self, schema: &str, key: &str) -> Option<&SettingValue> {
        self.keys.get(schema).and_then(|keys| keys.get(key))
    }

    pub fn has_schema(&self, schema: &str) -> bool {
        self.keys.contains_key(schema)
    }

    pub fn merge(&mut self, other: SchemaDefaults) {
        for (schema, keys) in other.keys {
            self.keys.entry(schema).or_default().extend(keys);
        }
    }
}
