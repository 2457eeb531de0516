//! Host settings tree attachment.
//!
//! Models the host's in-memory settings container far enough to splice the
//! linear advance settings under its `material` category. Insertion goes
//! through an explicit insert-then-reindex operation rather than reaching
//! into internal child lists, and returns the list of newly inserted keys so
//! the host can handle presentation (re-expanding categories and so on)
//! itself.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::LinearAdvanceError;

use super::types::{SettingMap, SettingsSchema};

/// Key of the category the linear advance settings are attached under.
const MATERIAL_CATEGORY_KEY: &str = "material";

/// A settings container: ordered categories of nested setting definitions
/// plus a derived key -> path index.
pub struct SettingsContainer {
    id: String,
    container_type: Option<String>,
    categories: SettingMap,
    index: HashMap<String, Vec<String>>,
}

impl SettingsContainer {
    pub fn new(id: impl Into<String>, container_type: Option<String>) -> Self {
        Self {
            id: id.into(),
            container_type,
            categories: SettingMap::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Extruder definitions never receive the linear advance settings.
    pub fn is_extruder_definition(&self) -> bool {
        self.container_type.as_deref() == Some("extruder")
    }

    /// Add a top-level category definition.
    pub fn add_category(
        &mut self,
        key: impl Into<String>,
        definition: Value,
    ) -> Result<(), LinearAdvanceError> {
        let key = key.into();
        if self.index.contains_key(&key) {
            return Err(LinearAdvanceError::DuplicateSetting(key));
        }
        self.categories.insert(key, definition);
        self.rebuild_index();
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Look up a definition anywhere in the tree.
    pub fn find(&self, key: &str) -> Option<&SettingMap> {
        let path = self.index.get(key)?;
        let mut node: Option<&SettingMap> = None;
        let mut current = &self.categories;
        for step in path {
            let def = current.get(step)?.as_object()?;
            node = Some(def);
            match def.get("children").and_then(Value::as_object) {
                Some(children) => current = children,
                None => break,
            }
        }
        node
    }

    /// Insert a definition as a child of an existing setting, then rebuild
    /// the derived index. Inserting a key that is already present anywhere
    /// in the tree is an error; a prior run's settings are never overwritten.
    pub fn insert_child(
        &mut self,
        parent_key: &str,
        key: &str,
        definition: Value,
    ) -> Result<(), LinearAdvanceError> {
        if self.index.contains_key(key) {
            return Err(LinearAdvanceError::DuplicateSetting(key.to_string()));
        }
        let path = self
            .index
            .get(parent_key)
            .cloned()
            .ok_or_else(|| LinearAdvanceError::UnknownParent(parent_key.to_string()))?;

        let parent = self
            .node_mut(&path)
            .ok_or_else(|| LinearAdvanceError::UnknownParent(parent_key.to_string()))?;
        let children = parent
            .entry("children".to_string())
            .or_insert_with(|| Value::Object(SettingMap::new()));
        let children = children.as_object_mut().ok_or_else(|| {
            LinearAdvanceError::Schema(format!("children of '{}' is not an object", parent_key))
        })?;
        children.insert(key.to_string(), definition);

        self.rebuild_index();
        Ok(())
    }

    fn node_mut(&mut self, path: &[String]) -> Option<&mut SettingMap> {
        let mut current = &mut self.categories;
        for (depth, key) in path.iter().enumerate() {
            let def = current.get_mut(key)?.as_object_mut()?;
            if depth + 1 == path.len() {
                return Some(def);
            }
            current = def.get_mut("children")?.as_object_mut()?;
        }
        None
    }

    fn rebuild_index(&mut self) {
        let mut index = HashMap::new();
        index_level(&self.categories, &mut Vec::new(), &mut index);
        self.index = index;
    }
}

fn index_level(
    settings: &SettingMap,
    path: &mut Vec<String>,
    index: &mut HashMap<String, Vec<String>>,
) {
    for (key, value) in settings {
        path.push(key.clone());
        index.insert(key.clone(), path.clone());
        if let Some(children) = value
            .as_object()
            .and_then(|def| def.get("children"))
            .and_then(Value::as_object)
        {
            index_level(children, path, index);
        }
        path.pop();
    }
}

/// Attach a linear advance schema under the container's material category,
/// preserving the schema's nesting and skipping keys already present.
///
/// Returns the keys that were actually inserted. A container without a
/// material category is an error; the caller logs it and skips that
/// container, leaving others unaffected.
pub fn extend_with_linear_advance(
    container: &mut SettingsContainer,
    schema: &SettingsSchema,
) -> Result<Vec<String>, LinearAdvanceError> {
    if !container.contains(MATERIAL_CATEGORY_KEY) {
        return Err(LinearAdvanceError::MissingMaterialCategory(
            container.id.clone(),
        ));
    }

    let mut inserted = Vec::new();
    for (key, definition) in schema.roots() {
        insert_subtree(container, MATERIAL_CATEGORY_KEY, key, definition, &mut inserted)?;
    }
    Ok(inserted)
}

fn insert_subtree(
    container: &mut SettingsContainer,
    parent_key: &str,
    key: &str,
    definition: &Value,
    inserted: &mut Vec<String>,
) -> Result<(), LinearAdvanceError> {
    let def = definition.as_object().ok_or_else(|| {
        LinearAdvanceError::Schema(format!("definition for '{}' is not an object", key))
    })?;

    if container.contains(key) {
        debug!("Setting {} already present in {}, not overwriting", key, container.id);
    } else {
        debug!("Inserting {} . {}", parent_key, key);
        let mut flat = def.clone();
        flat.remove("children");
        container.insert_child(parent_key, key, Value::Object(flat))?;
        inserted.push(key.to_string());
    }

    // Children are inserted under this key, whether it was just inserted or
    // already existed from a prior run.
    if let Some(children) = def.get("children").and_then(Value::as_object) {
        for (child_key, child_def) in children {
            insert_subtree(container, key, child_key, child_def, inserted)?;
        }
    }
    Ok(())
}
