//! Per-plate G-code storage.

use super::features::LAYER_MARKER;

/// Sentinel appended to a plate's header block once it has been annotated.
/// Its presence gates all further mutation of that plate.
pub const PROCESSED_MARKER: &str = ";LINEARADVANCEPROCESSED\n";

/// One plate's machine program: a header block followed by per-layer body
/// blocks. Blocks concatenate back to the full program text.
#[derive(Debug, Clone)]
pub struct Plate {
    pub id: String,
    pub blocks: Vec<String>,
}

impl Plate {
    pub fn new(id: impl Into<String>, blocks: Vec<String>) -> Self {
        Self { id: id.into(), blocks }
    }

    /// Whether this plate has already been annotated.
    pub fn is_processed(&self) -> bool {
        self.blocks
            .first()
            .is_some_and(|header| header.contains(PROCESSED_MARKER))
    }

    /// Record that this plate has been annotated.
    pub fn mark_processed(&mut self) {
        if let Some(header) = self.blocks.first_mut() {
            header.push_str(PROCESSED_MARKER);
        }
    }

    /// The full program text.
    pub fn to_text(&self) -> String {
        self.blocks.concat()
    }
}

/// G-code for a job, keyed by plate id in insertion order.
#[derive(Debug, Default)]
pub struct GcodeStore {
    plates: Vec<Plate>,
}

impl GcodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_plate(&mut self, id: impl Into<String>, blocks: Vec<String>) {
        self.plates.push(Plate::new(id, blocks));
    }

    pub fn get(&self, id: &str) -> Option<&Plate> {
        self.plates.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plate> {
        self.plates.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Plate> {
        self.plates.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }
}

/// Split a full G-code program into a header block plus one block per layer.
///
/// A new block starts at every layer-index marker; everything before the
/// first marker is the header. Newlines are kept with their lines so that
/// concatenating the blocks reproduces the input exactly.
pub fn split_into_blocks(gcode: &str) -> Vec<String> {
    let mut blocks = vec![String::new()];
    for line in gcode.split_inclusive('\n') {
        if line.starts_with(LAYER_MARKER) {
            blocks.push(String::new());
        }
        blocks.last_mut().expect("blocks is never empty").push_str(line);
    }
    blocks
}
