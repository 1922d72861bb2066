use super::binding::BindingKey;
use serde::Serialize;

pub const CUSTOM_CATEGORY: &str = "custom";
pub const SPICES_CATEGORY: &str = "spices";

/// Identifies the running component that owns a plugin binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginHint {
    pub uuid: String,
    pub instance_id: Option<String>,
    pub highlightable: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub label: String,
    pub parent_id: Option<String>,
    pub icon: Option<String>,
    #[serde(skip)]
    pub bindings: Vec<BindingKey>,
    pub origin: Option<OriginHint>,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>, parent_id: Option<&str>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent_id: parent_id.map(str::to_string),
            icon: None,
            bindings: Vec::new(),
            origin: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_origin(mut self, origin: OriginHint) -> Self {
        self.origin = Some(origin);
        self
    }
}
