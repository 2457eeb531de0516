//! The compensation annotation pass.
//!
//! A single scan over each plate's body blocks that tracks the active layer
//! index and feature classification and inserts a firmware directive
//! whenever the resolved factor for an extruder changes. The pass is a pure
//! function of the store, the per-extruder factor tables and the options; it
//! holds no state between invocations and reports through its return value
//! whether anything was mutated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::dialect::Dialect;
use super::features::{
    resolve_setting_key, setting_key_for_feature, FACTOR_LAYER_0_KEY, LAYER_MARKER, TYPE_MARKER,
};
use super::store::{GcodeStore, Plate};

/// Resolved compensation factors for one extruder in use.
///
/// `factors` maps factor-setting keys (see [`crate::gcode::features`]) to
/// the values the host resolved for this extruder. The table is read-only
/// input; the annotator never writes back to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtruderFactors {
    /// Extruder index as used in the emitted directive.
    pub extruder: u32,
    /// Base factor, applied where no feature-specific factor deviates.
    pub base: f64,
    /// Feature-setting key -> resolved factor.
    #[serde(default)]
    pub factors: HashMap<String, f64>,
}

impl ExtruderFactors {
    pub fn new(extruder: u32, base: f64) -> Self {
        Self {
            extruder,
            base,
            factors: HashMap::new(),
        }
    }

    pub fn with_factor(mut self, key: impl Into<String>, value: f64) -> Self {
        self.factors.insert(key.into(), value);
        self
    }

    pub fn factor_for(&self, key: &str) -> Option<f64> {
        self.factors.get(key).copied()
    }

    /// Whether any feature-specific factor differs from the base. Extruders
    /// without deviation get exactly one directive and are skipped by the
    /// per-feature scan.
    pub fn has_deviation(&self) -> bool {
        self.factors.values().any(|v| *v != self.base)
    }

    pub fn has_initial_layer_factor(&self) -> bool {
        self.factors.contains_key(FACTOR_LAYER_0_KEY)
    }

    /// Whether any configured factor has an effect at all.
    pub fn any_factor_set(&self) -> bool {
        self.base != 0.0 || self.factors.values().any(|v| *v != 0.0)
    }
}

/// Options for one annotation run.
#[derive(Debug, Clone, Copy)]
pub struct AnnotateOptions {
    pub enabled: bool,
    pub dialect: Dialect,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            dialect: Dialect::Marlin,
        }
    }
}

/// Annotate every unprocessed plate in the store.
///
/// Returns `true` iff at least one plate was mutated; the caller should
/// only commit the store back when it did.
pub fn annotate(
    store: &mut GcodeStore,
    extruders: &[ExtruderFactors],
    options: &AnnotateOptions,
) -> bool {
    if !options.enabled {
        debug!("Linear advance control is disabled");
        return false;
    }
    if extruders.is_empty() {
        debug!("No extruders in use");
        return false;
    }
    if store.is_empty() {
        warn!("No G-code to process");
        return false;
    }
    if !extruders.iter().any(ExtruderFactors::any_factor_set) {
        debug!("No used extruder specifies a linear advance factor");
        return false;
    }

    // A user-supplied snippet in the start G-code means the factor is
    // already managed outside this pass.
    let snippet = format!("{} ", options.dialect.mnemonic());

    let mut changed = false;
    for plate in store.iter_mut() {
        if plate.blocks.len() < 2 {
            warn!("Plate {} does not contain any layers", plate.id);
            continue;
        }
        if plate.is_processed() {
            debug!("Plate {} has already been processed", plate.id);
            continue;
        }
        if plate.blocks[0].contains(&snippet) {
            debug!(
                "Plate {} start G-code already includes a linear advance snippet",
                plate.id
            );
            continue;
        }
        annotate_plate(plate, extruders, options.dialect);
        changed = true;
    }
    changed
}

fn annotate_plate(plate: &mut Plate, extruders: &[ExtruderFactors], dialect: Dialect) {
    let Plate { id, blocks } = plate;

    // Last factor emitted per extruder, seeded with the base factors.
    let mut last_emitted: HashMap<u32, f64> =
        extruders.iter().map(|e| (e.extruder, e.base)).collect();

    // One directive per extruder at the very start of the printable body,
    // so the firmware is in a known state even if no feature transition
    // ever changes the factor.
    let mut prelude = String::new();
    for e in extruders {
        prelude.push_str(&dialect.directive(e.base, e.extruder));
        prelude.push('\n');
    }
    blocks[1].insert_str(0, &prelude);

    let deviating: Vec<&ExtruderFactors> =
        extruders.iter().filter(|e| e.has_deviation()).collect();
    if deviating.is_empty() {
        debug!("Plate {}: base directives cover all extruders", id);
    } else {
        // Lines before the first layer marker count as the initial layer.
        let mut layer_index: i64 = 0;
        for block in blocks.iter_mut().skip(1) {
            scan_block(block, &deviating, dialect, &mut layer_index, &mut last_emitted);
        }
    }

    plate.mark_processed();
}

fn scan_block(
    block: &mut String,
    deviating: &[&ExtruderFactors],
    dialect: Dialect,
    layer_index: &mut i64,
    last_emitted: &mut HashMap<u32, f64>,
) {
    let mut lines: Vec<String> = block.split('\n').map(str::to_string).collect();
    let mut changed = false;

    let mut i = 0;
    while i < lines.len() {
        if let Some(rest) = lines[i].strip_prefix(LAYER_MARKER) {
            match rest.trim().parse::<i64>() {
                Ok(index) => *layer_index = index,
                Err(_) => warn!(
                    "Malformed layer marker {:?}, keeping layer index {}",
                    lines[i], layer_index
                ),
            }
        } else if let Some(token) = lines[i].strip_prefix(TYPE_MARKER) {
            let token = token.trim().to_string();
            if setting_key_for_feature(&token).is_none() {
                warn!("Unknown feature type {:?}, forcing neutral factor", token);
            }

            let mut insertions = Vec::new();
            for e in deviating {
                let key = resolve_setting_key(&token, *layer_index, e.has_initial_layer_factor());
                // An unclassified span is forced to neutral rather than
                // inheriting the previous feature's factor.
                let factor = key.and_then(|k| e.factor_for(k)).unwrap_or(0.0);
                let last = last_emitted.get(&e.extruder).copied().unwrap_or(e.base);
                if factor != last {
                    insertions.push(dialect.directive(factor, e.extruder));
                    last_emitted.insert(e.extruder, factor);
                }
            }

            if !insertions.is_empty() {
                changed = true;
                let count = insertions.len();
                for (offset, directive) in insertions.into_iter().enumerate() {
                    lines.insert(i + 1 + offset, directive);
                }
                i += count;
            }
        }
        i += 1;
    }

    if changed {
        *block = lines.join("\n");
    }
}
