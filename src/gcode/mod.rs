pub mod annotator;
pub mod dialect;
pub mod features;
pub mod store;

pub use annotator::{annotate, AnnotateOptions, ExtruderFactors};
pub use dialect::Dialect;
pub use store::{split_into_blocks, GcodeStore, Plate, PROCESSED_MARKER};
