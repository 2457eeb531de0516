//! Job descriptions for the standalone post-processor binary.
//!
//! A job file is the file-based stand-in for the host slicer's write event:
//! it names the per-plate G-code files, the resolved per-extruder factor
//! tables, the dialect and the enable flag. The annotated files are written
//! back atomically so an interrupted run never leaves a partial file.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::gcode::{annotate, AnnotateOptions, Dialect, ExtruderFactors};
use crate::gcode::store::{split_into_blocks, GcodeStore, Plate};

/// One plate in a job: an identifier and the G-code file holding its
/// program. Output defaults to rewriting the input file.
#[derive(Debug, Deserialize)]
pub struct PlateSpec {
    pub id: String,
    pub gcode: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl PlateSpec {
    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.gcode)
    }
}

/// A post-processing job.
#[derive(Debug, Deserialize)]
pub struct Job {
    #[serde(default = "enabled_default")]
    pub enabled: bool,
    #[serde(default)]
    pub dialect: Dialect,
    pub extruders: Vec<ExtruderFactors>,
    pub plates: Vec<PlateSpec>,
}

fn enabled_default() -> bool {
    true
}

/// Load a job description from a JSON file.
pub fn load_job(path: &Path) -> Result<Job> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {:?}", path))?;
    let job: Job = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse job file {:?}", path))?;
    Ok(job)
}

/// Run a job: load each plate's G-code, annotate, and write back the plates
/// only when the pass changed anything.
pub fn run_job(job: &Job) -> Result<bool> {
    let mut store = GcodeStore::new();
    for plate in &job.plates {
        let text = std::fs::read_to_string(&plate.gcode)
            .with_context(|| format!("Failed to read G-code file {:?}", plate.gcode))?;
        store.insert_plate(plate.id.clone(), split_into_blocks(&text));
    }

    let options = AnnotateOptions {
        enabled: job.enabled,
        dialect: job.dialect,
    };
    let changed = annotate(&mut store, &job.extruders, &options);
    if !changed {
        info!("No plate required annotation, leaving files untouched");
        return Ok(false);
    }

    for spec in &job.plates {
        let plate = store
            .get(&spec.id)
            .ok_or_else(|| anyhow::anyhow!("Plate {} missing from store", spec.id))?;
        write_gcode_atomic(plate, spec.output_path())?;
    }
    Ok(true)
}

/// Write a plate's G-code to disk atomically: temp file in the target
/// directory, then rename.
pub fn write_gcode_atomic(plate: &Plate, target_path: &Path) -> Result<()> {
    let parent = target_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Target path has no parent directory: {:?}", target_path))?;
    std::fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(plate.to_text().as_bytes())?;
    temp.flush()?;
    temp.persist(target_path)?;

    info!("Wrote annotated G-code for plate {} to {:?}", plate.id, target_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_parses_with_defaults() {
        let job: Job = serde_json::from_str(
            r#"{
                "extruders": [{"extruder": 0, "base": 0.5}],
                "plates": [{"id": "plate_1", "gcode": "/tmp/plate_1.gcode"}]
            }"#,
        )
        .unwrap();
        assert!(job.enabled);
        assert_eq!(job.dialect, Dialect::Marlin);
        assert_eq!(job.extruders[0].base, 0.5);
        assert!(job.extruders[0].factors.is_empty());
        assert_eq!(job.plates[0].output_path(), Path::new("/tmp/plate_1.gcode"));
    }

    #[test]
    fn test_job_parses_factors_and_dialect() {
        let job: Job = serde_json::from_str(
            r#"{
                "dialect": "reprap",
                "extruders": [{
                    "extruder": 1,
                    "base": 0.4,
                    "factors": {"linear_advance_factor_infill": 0.6}
                }],
                "plates": [
                    {"id": "p", "gcode": "in.gcode", "output": "out.gcode"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(job.dialect, Dialect::RepRap);
        assert_eq!(
            job.extruders[0].factor_for("linear_advance_factor_infill"),
            Some(0.6)
        );
        assert_eq!(job.plates[0].output_path(), Path::new("out.gcode"));
    }

    #[test]
    fn test_load_job_missing_file() {
        assert!(load_job(Path::new("/nonexistent/job.json")).is_err());
    }
}
