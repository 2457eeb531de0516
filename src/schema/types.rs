use anyhow::Result;
use serde_json::{Map, Value};

/// A JSON object in a settings schema: setting key -> definition object.
///
/// `serde_json` is built with `preserve_order`, so declaration order in the
/// schema file is kept, which determines display order in the settings tree.
pub type SettingMap = Map<String, Value>;

/// Declared type of a setting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingType {
    Bool,
    Float,
}

impl SettingType {
    /// Parse the `type` field of a definition. Unknown types return `None`;
    /// their semantics belong to the host, not to this plugin.
    pub fn from_str(text: &str) -> Option<Self> {
        match text {
            "bool" => Some(SettingType::Bool),
            "float" => Some(SettingType::Float),
            _ => None,
        }
    }
}

/// A parsed settings schema.
///
/// Wraps the raw JSON `Map<String, Value>` rather than a typed struct per
/// field so that every field in the schema file survives a round-trip
/// unchanged; field semantics (enablement expressions, resolve expressions,
/// per-extruder flags) are interpreted solely by the host. Typed access for
/// the fields this plugin reads goes through [`SettingView`].
pub struct SettingsSchema {
    data: SettingMap,
}

impl SettingsSchema {
    /// Parse a schema from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: SettingMap = serde_json::from_str(json)?;
        Ok(Self { data })
    }

    /// Iterate over the root definitions in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub(crate) fn roots_mut(&mut self) -> impl Iterator<Item = (&String, &mut Value)> {
        self.data.iter_mut()
    }

    /// Number of root definitions.
    pub fn root_count(&self) -> usize {
        self.data.len()
    }

    /// Whether a setting key exists anywhere in the schema, including
    /// nested children.
    pub fn contains(&self, key: &str) -> bool {
        self.definition(key).is_some()
    }

    /// Find a setting definition by key, descending into nested children.
    pub fn definition<'a>(&'a self, key: &str) -> Option<SettingView<'a>> {
        find_definition(&self.data, key)
    }
}

fn find_definition<'a>(settings: &'a SettingMap, key: &str) -> Option<SettingView<'a>> {
    for (candidate, value) in settings {
        let Some(def) = value.as_object() else {
            continue;
        };
        if candidate == key {
            return Some(SettingView { key: candidate, def });
        }
        if let Some(children) = def.get("children").and_then(Value::as_object) {
            if let Some(found) = find_definition(children, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Typed read access to one setting definition.
#[derive(Clone, Copy)]
pub struct SettingView<'a> {
    key: &'a str,
    def: &'a SettingMap,
}

impl<'a> SettingView<'a> {
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn label(&self) -> Option<&'a str> {
        self.def.get("label")?.as_str()
    }

    pub fn description(&self) -> Option<&'a str> {
        self.def.get("description")?.as_str()
    }

    pub fn unit(&self) -> Option<&'a str> {
        self.def.get("unit")?.as_str()
    }

    pub fn setting_type(&self) -> Option<SettingType> {
        SettingType::from_str(self.def.get("type")?.as_str()?)
    }

    pub fn default_value(&self) -> Option<&'a Value> {
        self.def.get("default_value")
    }

    pub fn minimum_value(&self) -> Option<f64> {
        self.def.get("minimum_value")?.as_f64()
    }

    pub fn maximum_value_warning(&self) -> Option<f64> {
        self.def.get("maximum_value_warning")?.as_f64()
    }

    /// Enablement expression, passed through unevaluated; the host evaluates it.
    pub fn enabled_expr(&self) -> Option<&'a str> {
        self.def.get("enabled")?.as_str()
    }

    /// Value expression deriving the default from another setting.
    pub fn value_expr(&self) -> Option<&'a str> {
        self.def.get("value")?.as_str()
    }

    pub fn resolve_expr(&self) -> Option<&'a str> {
        self.def.get("resolve")?.as_str()
    }

    pub fn limit_to_extruder(&self) -> Option<&'a str> {
        self.def.get("limit_to_extruder")?.as_str()
    }

    pub fn settable_per_extruder(&self) -> bool {
        self.def
            .get("settable_per_extruder")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn settable_per_mesh(&self) -> bool {
        self.def
            .get("settable_per_mesh")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn children(&self) -> Option<&'a SettingMap> {
        self.def.get("children")?.as_object()
    }

    /// The raw definition object.
    pub fn raw(&self) -> &'a SettingMap {
        self.def
    }
}
