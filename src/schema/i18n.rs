//! Translation of user-facing schema text.
//!
//! Only `label` and `description` are rewritten; identifiers, defaults,
//! units and expressions pass through untouched. Strings without a catalog
//! entry keep their source text, so an empty catalog makes the pass a no-op
//! and the pass is idempotent as long as translated strings are not
//! themselves catalog keys.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use super::types::{SettingMap, SettingsSchema};

/// A flat catalog of source string -> translated string.
#[derive(Debug, Default)]
pub struct TranslationCatalog {
    entries: HashMap<String, String>,
}

impl TranslationCatalog {
    /// Parse a catalog from a JSON object of source -> translation pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Load a catalog from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read translation catalog {:?}", path))?;
        Self::from_json(&content)
    }

    pub fn from_entries(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrite every label and description in the schema, descending into
/// nested children exactly once per definition.
pub fn translate_schema(schema: &mut SettingsSchema, catalog: &TranslationCatalog) {
    if catalog.is_empty() {
        debug!("Translation catalog is empty, leaving schema text as-is");
        return;
    }
    for (_, value) in schema.roots_mut() {
        if let Some(def) = value.as_object_mut() {
            translate_definition(def, catalog);
        }
    }
}

fn translate_definition(def: &mut SettingMap, catalog: &TranslationCatalog) {
    for field in ["label", "description"] {
        if let Some(Value::String(text)) = def.get_mut(field) {
            if let Some(translated) = catalog.lookup(text) {
                *text = translated.to_string();
            }
        }
    }
    if let Some(children) = def.get_mut("children").and_then(Value::as_object_mut) {
        for (_, child) in children.iter_mut() {
            if let Some(child_def) = child.as_object_mut() {
                translate_definition(child_def, catalog);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::loader::{embedded_schema, SchemaVersion};

    fn catalog() -> TranslationCatalog {
        TranslationCatalog::from_json(
            r#"{
                "Infill Linear Advance Factor": "Infill-Linear-Advance-Faktor",
                "The Linear Advance Factor with which infill is printed.": "Der Linear-Advance-Faktor für das Drucken der Füllung."
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_translates_nested_label_and_description() {
        let mut schema = embedded_schema(SchemaVersion::Current);
        translate_schema(&mut schema, &catalog());

        let infill = schema.definition("linear_advance_factor_infill").unwrap();
        assert_eq!(infill.label(), Some("Infill-Linear-Advance-Faktor"));
        assert_eq!(
            infill.description(),
            Some("Der Linear-Advance-Faktor für das Drucken der Füllung.")
        );
    }

    #[test]
    fn test_untranslated_text_falls_back_to_source() {
        let mut schema = embedded_schema(SchemaVersion::Current);
        translate_schema(&mut schema, &catalog());

        let wall = schema.definition("linear_advance_factor_wall_0").unwrap();
        assert_eq!(wall.label(), Some("Outer Wall Linear Advance Factor"));
    }

    #[test]
    fn test_identifiers_and_expressions_untouched() {
        let mut schema = embedded_schema(SchemaVersion::Current);
        translate_schema(&mut schema, &catalog());

        let infill = schema.definition("linear_advance_factor_infill").unwrap();
        assert_eq!(infill.value_expr(), Some("linear_advance_factor_print"));
        assert_eq!(infill.unit(), Some("mm/mm⋅s"));
        assert_eq!(infill.limit_to_extruder(), Some("infill_extruder_nr"));
    }

    #[test]
    fn test_translation_is_idempotent() {
        let mut schema = embedded_schema(SchemaVersion::Current);
        let cat = catalog();
        translate_schema(&mut schema, &cat);
        let label_once = schema
            .definition("linear_advance_factor_infill")
            .unwrap()
            .label()
            .unwrap()
            .to_string();

        translate_schema(&mut schema, &cat);
        let label_twice = schema
            .definition("linear_advance_factor_infill")
            .unwrap()
            .label()
            .unwrap()
            .to_string();
        assert_eq!(label_once, label_twice);
    }

    #[test]
    fn test_empty_catalog_is_noop() {
        let mut schema = embedded_schema(SchemaVersion::Current);
        translate_schema(&mut schema, &TranslationCatalog::default());
        let view = schema.definition("linear_advance_factor_infill").unwrap();
        assert_eq!(view.label(), Some("Infill Linear Advance Factor"));
    }
}
