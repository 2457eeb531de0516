pub mod error;
pub mod gcode;
pub mod job;
pub mod schema;

pub use error::LinearAdvanceError;
pub use gcode::{annotate, split_into_blocks, AnnotateOptions, Dialect, ExtruderFactors, GcodeStore};
pub use schema::{SettingsContainer, SettingsSchema};
