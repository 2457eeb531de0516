//! Classification of G-code feature markers.

/// Prefix of a feature-type marker line.
pub const TYPE_MARKER: &str = ";TYPE:";
/// Prefix of a layer-index marker line.
pub const LAYER_MARKER: &str = ";LAYER:";

/// Setting key of the global enable toggle.
pub const ENABLED_KEY: &str = "linear_advance_control_enabled";
/// Setting key of the base factor.
pub const FACTOR_BASE_KEY: &str = "linear_advance_factor_print";
/// Setting key of the initial-layer factor. Only present in the current
/// schema tier; its absence from a factor table disables the override.
pub const FACTOR_LAYER_0_KEY: &str = "linear_advance_factor_layer_0";

const SKIRT_TOKEN: &str = "SKIRT";

/// Map a feature-marker token to the setting key governing its factor.
///
/// The token set is closed; anything else returns `None`, which the
/// annotator treats as "force the neutral factor for this span" rather than
/// letting the previous feature's factor bleed into an unclassified region.
pub fn setting_key_for_feature(token: &str) -> Option<&'static str> {
    match token {
        "WALL-OUTER" => Some("linear_advance_factor_wall_0"),
        "WALL-INNER" => Some("linear_advance_factor_wall_x"),
        "SKIN" => Some("linear_advance_factor_topbottom"),
        "SUPPORT" => Some("linear_advance_factor_support"),
        "SUPPORT-INTERFACE" => Some("linear_advance_factor_support_interface"),
        SKIRT_TOKEN => Some("linear_advance_factor_skirt_brim"),
        "FILL" => Some("linear_advance_factor_infill"),
        "PRIME-TOWER" => Some("linear_advance_factor_prime_tower"),
        _ => None,
    }
}

/// Resolve the setting key for a feature span, applying the initial-layer
/// override: while the layer index is at or below zero, every feature except
/// skirt/brim uses the initial-layer factor when one exists.
pub fn resolve_setting_key(
    token: &str,
    layer_index: i64,
    has_initial_layer_factor: bool,
) -> Option<&'static str> {
    if layer_index <= 0 && has_initial_layer_factor && token != SKIRT_TOKEN {
        return Some(FACTOR_LAYER_0_KEY);
    }
    setting_key_for_feature(token)
}
