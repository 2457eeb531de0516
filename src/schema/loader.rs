//! Schema loading and host-version gating.
//!
//! Provides two loading methods:
//! - `embedded_schema(version)` - Loads the schema compiled into the binary
//! - `load_schema(path)` - Loads a schema file from a path
//!
//! Multiple schema tiers exist for different host API levels; the current
//! tier adds the initial-layer factor setting. Selection must fail closed:
//! if no schema file for the detected host version loads, the caller gets an
//! error and disables the settings extension, never a partial schema.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use super::types::SettingsSchema;

/// Current-tier schema embedded in the binary at compile time.
const CURRENT_SCHEMA: &str = include_str!("../../config/linear_advance.def.json");

/// Legacy-tier schema, for hosts predating the initial-layer setting.
const LEGACY_SCHEMA: &str = include_str!("../../config/linear_advance_legacy.def.json");

/// Lowest host API level that understands the current schema tier.
const CURRENT_TIER_MIN_API: u32 = 6;

/// Schema compatibility tier, selected from the host API level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    Legacy,
    Current,
}

impl SchemaVersion {
    pub fn for_api_version(api_version: u32) -> Self {
        if api_version >= CURRENT_TIER_MIN_API {
            SchemaVersion::Current
        } else {
            SchemaVersion::Legacy
        }
    }

    /// File names for this tier, most specific first. A tier may fall back
    /// to an older file when its own is absent.
    fn file_names(&self) -> &'static [&'static str] {
        match self {
            SchemaVersion::Current => {
                &["linear_advance.def.json", "linear_advance_legacy.def.json"]
            }
            SchemaVersion::Legacy => &["linear_advance_legacy.def.json"],
        }
    }
}

/// Load a schema from a JSON file at the given path.
pub fn load_schema(path: &Path) -> Result<SettingsSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file {:?}", path))?;
    let schema = SettingsSchema::from_json(&content)
        .with_context(|| format!("Failed to parse schema file {:?}", path))?;
    Ok(schema)
}

/// Load the schema for a host API level from a directory of schema files.
///
/// Tries the tier's file names in order and returns the first that parses.
/// Returns an error when none load; the caller must then disable the
/// settings extension entirely.
pub fn load_schema_for_api(dir: &Path, api_version: u32) -> Result<SettingsSchema> {
    let version = SchemaVersion::for_api_version(api_version);
    for name in version.file_names() {
        let path = dir.join(name);
        match load_schema(&path) {
            Ok(schema) => {
                info!("Loaded schema {:?} for host API level {}", path, api_version);
                return Ok(schema);
            }
            Err(e) => {
                warn!("Schema candidate {:?} not usable: {:#}", path, e);
            }
        }
    }
    Err(anyhow!(
        "No schema file loads for host API level {} in {:?}",
        api_version,
        dir
    ))
}

/// Get the schema embedded in the binary for the given tier.
///
/// # Panics
/// Panics if the embedded JSON is invalid (this would be a compile-time bug).
pub fn embedded_schema(version: SchemaVersion) -> SettingsSchema {
    let source = match version {
        SchemaVersion::Current => CURRENT_SCHEMA,
        SchemaVersion::Legacy => LEGACY_SCHEMA,
    };
    SettingsSchema::from_json(source).expect("embedded schema must be valid JSON")
}
