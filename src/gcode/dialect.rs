//! Firmware dialect for the emitted compensation directive.

use serde::{Deserialize, Serialize};

/// Comment appended to every emitted directive.
const DIRECTIVE_TAG: &str = ";added by LinearAdvanceSettingPlugin";

/// Firmware command syntax for setting the compensation factor.
///
/// The two dialects differ only in mnemonic and argument naming: Marlin's
/// `M900` takes the factor as a K value keyed by filament compression
/// distance with a positional tool number, RepRap's `M572` takes a direct
/// pressure advance S value with the extruder as a named D argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Marlin-style `M900 K<factor> T<extruder>`.
    #[default]
    Marlin,
    /// RepRapFirmware-style `M572 S<factor> D<extruder>`.
    RepRap,
}

impl Dialect {
    /// Command word of the directive, used to detect a user-supplied
    /// snippet in a plate's start G-code.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Dialect::Marlin => "M900",
            Dialect::RepRap => "M572",
        }
    }

    /// Render the directive line for a factor and extruder index.
    pub fn directive(&self, factor: f64, extruder: u32) -> String {
        match self {
            Dialect::Marlin => {
                format!("M900 K{} T{} {}", format_factor(factor), extruder, DIRECTIVE_TAG)
            }
            Dialect::RepRap => {
                format!("M572 S{} D{} {}", format_factor(factor), extruder, DIRECTIVE_TAG)
            }
        }
    }
}

/// Fixed-point rendering of a factor value.
///
/// Firmware argument parsers do not accept exponential notation, so tiny
/// values are forced through a fixed six-decimal format and trimmed.
fn format_factor(value: f64) -> String {
    let text = format!("{}", value);
    if !text.contains(['e', 'E']) {
        return text;
    }
    let mut fixed = format!("{:.6}", value);
    while fixed.ends_with('0') {
        fixed.pop();
    }
    if fixed.ends_with('.') {
        fixed.pop();
    }
    fixed
}
